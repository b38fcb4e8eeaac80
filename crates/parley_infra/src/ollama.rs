use std::time::Duration;

use anyhow::Context as _;
use futures::StreamExt;
use parley_config::Settings;
use parley_domain::{GenerationRequest, InferenceClient, InferenceError, ModelId, ResultStream};
use reqwest::{Client, StatusCode, Url};
use tokio::time::Instant;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tokio_util::io::StreamReader;

use crate::dto::{GenerateRequest, TagsResponse, TextAccumulator};

/// Client of an Ollama-compatible server.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: Url,
    default_model: ModelId,
    health_timeout: Duration,
    generate_timeout: Duration,
}

impl OllamaClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.ollama_url.clone(),
            default_model: ModelId::new(settings.default_model.clone()),
            health_timeout: settings.health_timeout(),
            generate_timeout: settings.generate_timeout(),
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        if path.contains("://") || path.contains("..") {
            anyhow::bail!("Invalid path: Contains forbidden patterns");
        }

        let path = path.trim_start_matches('/');

        self.base_url
            .join(path)
            .with_context(|| format!("Failed to append {} to base URL: {}", path, self.base_url))
    }

    async fn fetch_tags(&self) -> anyhow::Result<TagsResponse> {
        let response = self
            .client
            .get(self.url("api/tags")?)
            .timeout(self.health_timeout)
            .send()
            .await?
            .error_for_status()
            .context("Failed because of a non 200 status code")?;

        Ok(response.json::<TagsResponse>().await?)
    }

    async fn generate(
        self,
        request: GenerationRequest,
    ) -> ResultStream<String, InferenceError> {
        let deadline = Instant::now() + self.generate_timeout;

        let url = match self.url("api/generate") {
            Ok(url) => url,
            Err(err) => return single(InferenceError::Transport(err.to_string())),
        };

        tracing::debug!(model = %request.model, "Opening generation stream");
        let body = GenerateRequest::from(request);
        let send = self.client.post(url).json(&body).send();

        let response = match tokio::time::timeout_at(deadline, send).await {
            Err(_) => return single(InferenceError::Timeout),
            Ok(Err(err)) => return single(classify(&err)),
            Ok(Ok(response)) => response,
        };

        if response.status() != StatusCode::OK {
            tracing::warn!(status = %response.status(), "Generation request rejected");
            return single(InferenceError::Status(response.status().as_u16()));
        }

        let reader = StreamReader::new(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(std::io::Error::other)),
        );
        let mut lines = FramedRead::new(reader, AnyDelimiterCodec::new(b"\n".to_vec(), Vec::new()));

        Box::pin(async_stream::stream! {
            let mut accumulator = TextAccumulator::default();
            loop {
                let line = match tokio::time::timeout_at(deadline, lines.next()).await {
                    Err(_) => {
                        yield Err(InferenceError::Timeout);
                        break;
                    }
                    Ok(None) => break,
                    Ok(Some(Err(err))) => {
                        yield Err(classify_read(err));
                        break;
                    }
                    Ok(Some(Ok(line))) => line,
                };

                let Some(update) = accumulator.apply(&line) else {
                    continue;
                };
                if let Some(text) = update.text {
                    yield Ok(text);
                }
                if update.done {
                    break;
                }
            }
        })
    }
}

fn single(error: InferenceError) -> ResultStream<String, InferenceError> {
    Box::pin(futures::stream::once(async move { Err(error) }))
}

fn classify(err: &reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout
    } else if err.is_connect() {
        InferenceError::Connection
    } else {
        InferenceError::Transport(err.to_string())
    }
}

fn classify_read(err: AnyDelimiterCodecError) -> InferenceError {
    match err {
        AnyDelimiterCodecError::Io(io) => match io
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
        {
            Some(err) => classify(err),
            None => InferenceError::Transport(io.to_string()),
        },
        other => InferenceError::Transport(other.to_string()),
    }
}

#[async_trait::async_trait]
impl InferenceClient for OllamaClient {
    async fn list_models(&self) -> Vec<ModelId> {
        match self.fetch_tags().await {
            Ok(tags) => tags.models.into_iter().map(|model| ModelId::new(model.name)).collect(),
            Err(err) => {
                tracing::warn!(error = %err, "Falling back to the default model");
                vec![self.default_model.clone()]
            }
        }
    }

    async fn check_health(&self) -> bool {
        let url = match self.url("api/tags") {
            Ok(url) => url,
            Err(_) => return false,
        };

        match self.client.get(url).timeout(self.health_timeout).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(err) => {
                tracing::debug!(error = %err, "Health probe failed");
                false
            }
        }
    }

    fn stream_generate(&self, request: GenerationRequest) -> ResultStream<String, InferenceError> {
        let client = self.clone();
        Box::pin(
            async_stream::stream! {
                if !client.check_health().await {
                    yield Err(InferenceError::Unavailable);
                    return;
                }
                let mut stream = client.generate(request).await;
                while let Some(item) = stream.next().await {
                    yield item;
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use parley_domain::GenerationParams;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    fn settings(base_url: &str) -> Settings {
        Settings {
            ollama_url: Url::parse(base_url).unwrap(),
            default_model: "codellama:7b".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            health_timeout_secs: 5,
            generate_timeout_secs: 300,
            gpu_probe_timeout_secs: 5,
            cpu_sample_interval_ms: 1000,
            export_dir: ".".into(),
            host: "127.0.0.1".to_string(),
            port: 7860,
        }
    }

    fn client(server: &mockito::ServerGuard) -> OllamaClient {
        OllamaClient::new(&settings(&format!("{}/", server.url()))).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("llama3", "User: hi\nAssistant:", GenerationParams::default())
    }

    async fn collect(client: &OllamaClient) -> Vec<Result<String, InferenceError>> {
        client.stream_generate(request()).collect().await
    }

    #[tokio::test]
    async fn test_list_models() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models": [{"name": "llama3:8b", "size": 1}, {"name": "mistral:7b"}]}"#)
            .create_async()
            .await;

        let actual = client(&server).list_models().await;
        let expected = vec![ModelId::new("llama3:8b"), ModelId::new("mistral:7b")];

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_list_models_falls_back_on_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let actual = client(&server).list_models().await;
        let expected = vec![ModelId::new("codellama:7b")];

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_list_models_falls_back_when_unreachable() {
        let fixture = OllamaClient::new(&settings("http://127.0.0.1:1/")).unwrap();

        let actual = fixture.list_models().await;
        let expected = vec![ModelId::new("codellama:7b")];

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_check_health() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models": []}"#)
            .create_async()
            .await;

        assert!(client(&server).check_health().await);
    }

    #[tokio::test]
    async fn test_check_health_non_200() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/api/tags").with_status(503).create_async().await;

        assert!(!client(&server).check_health().await);
    }

    #[tokio::test]
    async fn test_stream_generate_yields_cumulative_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models": []}"#)
            .create_async()
            .await;
        let generate = server
            .mock("POST", "/api/generate")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "llama3",
                "stream": true
            })))
            .with_status(200)
            .with_header("content-type", "application/x-ndjson")
            .with_body("{\"response\":\"He\"}\n{\"response\":\"llo\"}\n{\"done\":true}\n{\"response\":\"ignored\"}\n")
            .create_async()
            .await;

        let actual = collect(&client(&server)).await;
        let expected = vec![Ok("He".to_string()), Ok("Hello".to_string())];

        assert_eq!(actual, expected);
        generate.assert_async().await;
    }

    #[tokio::test]
    async fn test_stream_generate_skips_malformed_lines() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models": []}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body("{\"response\":\"A\"}\ngarbage\n\n{\"response\":\"B\"}")
            .create_async()
            .await;

        let actual = collect(&client(&server)).await;
        let expected = vec![Ok("A".to_string()), Ok("AB".to_string())];

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_stream_generate_non_200() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models": []}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model not found"}"#)
            .create_async()
            .await;

        let actual = collect(&client(&server)).await;
        let expected = vec![Err(InferenceError::Status(404))];

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_stream_generate_unhealthy_server_skips_post() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/api/tags").with_status(500).create_async().await;
        let generate = server
            .mock("POST", "/api/generate")
            .expect(0)
            .create_async()
            .await;

        let actual = collect(&client(&server)).await;
        let expected = vec![Err(InferenceError::Unavailable)];

        assert_eq!(actual, expected);
        generate.assert_async().await;
    }

    #[tokio::test]
    async fn test_stream_generate_unreachable_server() {
        let fixture = OllamaClient::new(&settings("http://127.0.0.1:1/")).unwrap();

        assert!(!fixture.check_health().await);

        let actual = collect(&fixture).await;
        let expected = vec![Err(InferenceError::Unavailable)];

        assert_eq!(actual, expected);
    }

    /// How the hand-written server answers `POST /api/generate`. Health
    /// checks always succeed.
    #[derive(Clone, Copy)]
    enum GenerateReply {
        Silent,
        FirstLineThenStall,
        HangUpAfterHeaders,
    }

    const CHUNKED_HEAD: &str = "HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nTransfer-Encoding: chunked\r\n\r\n";

    async fn raw_server(reply: GenerateReply) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, reply));
            }
        });
        format!("http://{address}/")
    }

    async fn serve(mut socket: TcpStream, reply: GenerateReply) {
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|window| window == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }

        if head.starts_with(b"GET") {
            let body = r#"{"models": []}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            return;
        }

        match reply {
            GenerateReply::Silent => std::future::pending::<()>().await,
            GenerateReply::FirstLineThenStall => {
                let line = "{\"response\":\"He\",\"done\":false}\n";
                let chunk = format!("{CHUNKED_HEAD}{:x}\r\n{line}\r\n", line.len());
                let _ = socket.write_all(chunk.as_bytes()).await;
                std::future::pending::<()>().await
            }
            GenerateReply::HangUpAfterHeaders => {
                let _ = socket.write_all(CHUNKED_HEAD.as_bytes()).await;
                let _ = socket.flush().await;
            }
        }
    }

    async fn raw_client(reply: GenerateReply) -> OllamaClient {
        let base_url = raw_server(reply).await;
        OllamaClient::new(&settings(&base_url).generate_timeout_secs(1u64)).unwrap()
    }

    #[tokio::test]
    async fn test_stream_generate_times_out_waiting_for_headers() {
        let fixture = raw_client(GenerateReply::Silent).await;

        let actual = collect(&fixture).await;
        let expected = vec![Err(InferenceError::Timeout)];

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_stream_generate_times_out_mid_body() {
        let fixture = raw_client(GenerateReply::FirstLineThenStall).await;

        let actual = collect(&fixture).await;
        let expected = vec![Ok("He".to_string()), Err(InferenceError::Timeout)];

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_stream_generate_connection_dropped_mid_body() {
        let fixture = raw_client(GenerateReply::HangUpAfterHeaders).await;

        let actual = collect(&fixture).await;

        assert_eq!(actual.len(), 1, "{actual:?}");
        assert!(
            matches!(
                actual[0],
                Err(InferenceError::Connection | InferenceError::Transport(_))
            ),
            "{actual:?}"
        );
    }

    #[test]
    fn test_url_rejects_traversal() {
        let fixture = OllamaClient::new(&settings("http://localhost:11434/")).unwrap();

        assert_eq!(
            fixture.url("/api/tags").unwrap().as_str(),
            "http://localhost:11434/api/tags"
        );
        assert!(fixture.url("../etc").is_err());
        assert!(fixture.url("https://elsewhere").is_err());
    }
}
