use derive_more::Display;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        ModelId(value)
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        ModelId(value.to_string())
    }
}

/// Sampling parameters of a generation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Setters)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationParams {
    pub const DEFAULT_TEMPERATURE: f64 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;
    pub const TEMPERATURE_RANGE: (f64, f64) = (0.1, 2.0);
    pub const MAX_TOKENS_RANGE: (u32, u32) = (100, 4096);

    pub fn new(temperature: f64, max_tokens: u32) -> Self {
        Self { temperature, max_tokens }
    }

    /// Returns a copy with both values forced into their slider ranges.
    pub fn clamped(self) -> Self {
        let (t_min, t_max) = Self::TEMPERATURE_RANGE;
        let (n_min, n_max) = Self::MAX_TOKENS_RANGE;
        let temperature = if self.temperature.is_nan() {
            Self::DEFAULT_TEMPERATURE
        } else {
            self.temperature.clamp(t_min, t_max)
        };
        Self { temperature, max_tokens: self.max_tokens.clamp(n_min, n_max) }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { temperature: Self::DEFAULT_TEMPERATURE, max_tokens: Self::DEFAULT_MAX_TOKENS }
    }
}

/// What the active session generates with. Passed explicitly to every
/// operation that needs a model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Setters)]
#[setters(into)]
pub struct SessionContext {
    pub model: ModelId,
    pub params: GenerationParams,
}

impl SessionContext {
    pub fn new(model: impl Into<ModelId>, params: GenerationParams) -> Self {
        Self { model: model.into(), params: params.clamped() }
    }
}
