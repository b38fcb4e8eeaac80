use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use chrono::Local;
use parley_config::Settings;
use parley_domain::{Error, GPU_NOT_DETECTED, ResourceProbe, ResourceSnapshot};
use sysinfo::System;
use tokio::process::Command;

const NVIDIA_SMI: &str = "/usr/bin/nvidia-smi";
const APPLE_SILICON: &str = "Apple Silicon (M1/M2/M3)";

/// Samples CPU, memory and GPU information of the host.
pub struct SystemResources {
    cpu_interval: Duration,
    gpu_timeout: Duration,
}

impl SystemResources {
    pub fn new(settings: &Settings) -> Self {
        Self {
            cpu_interval: settings.cpu_sample_interval().max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            gpu_timeout: settings.gpu_probe_timeout(),
        }
    }

    async fn gpu_description(&self) -> String {
        match tokio::time::timeout(self.gpu_timeout, probe_gpu()).await {
            Ok(Some(description)) => description,
            Ok(None) => GPU_NOT_DETECTED.to_string(),
            Err(_) => {
                tracing::debug!("GPU probe timed out");
                GPU_NOT_DETECTED.to_string()
            }
        }
    }
}

async fn probe_gpu() -> Option<String> {
    if Path::new(NVIDIA_SMI).exists() {
        let stdout = run_tool(
            "nvidia-smi",
            &["--query-gpu=name", "--format=csv,noheader,nounits"],
        )
        .await?;
        Some(stdout.trim().to_string()).filter(|name| !name.is_empty())
    } else {
        let stdout = run_tool("system_profiler", &["SPDisplaysDataType"]).await?;
        describe_displays(&stdout)
    }
}

fn describe_displays(profile: &str) -> Option<String> {
    profile
        .contains("Apple Silicon")
        .then(|| APPLE_SILICON.to_string())
}

async fn run_tool(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .inspect_err(|err| tracing::debug!(program, error = %err, "GPU tool unavailable"))
        .ok()?;

    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait::async_trait]
impl ResourceProbe for SystemResources {
    async fn sample(&self) -> parley_domain::Result<ResourceSnapshot> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(Error::ResourceProbeUnavailable);
        }

        let mut system = System::new();
        system.refresh_cpu_usage();
        tokio::time::sleep(self.cpu_interval).await;
        system.refresh_cpu_usage();
        system.refresh_memory();

        if system.total_memory() == 0 {
            return Err(Error::ResourceProbeUnavailable);
        }

        Ok(ResourceSnapshot {
            cpu_percent: system.global_cpu_usage(),
            memory_used: system.used_memory(),
            memory_total: system.total_memory(),
            gpu_description: self.gpu_description().await,
            timestamp: Local::now(),
        })
    }
}
