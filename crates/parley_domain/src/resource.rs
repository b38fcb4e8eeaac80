use chrono::{DateTime, Local};
use serde::Serialize;

pub const GPU_NOT_DETECTED: &str = "Not detected";
pub const NOT_AVAILABLE: &str = "N/A";

const GIB: f64 = (1u64 << 30) as f64;

/// Host resource usage at one point in time. Recomputed on every request.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceSnapshot {
    pub cpu_percent: f32,
    /// Bytes in use.
    pub memory_used: u64,
    /// Bytes installed.
    pub memory_total: u64,
    pub gpu_description: String,
    pub timestamp: DateTime<Local>,
}

/// Display strings for the resource panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub cpu: String,
    pub memory: String,
    pub gpu: String,
}

impl ResourceReport {
    pub fn unavailable() -> Self {
        Self {
            cpu: NOT_AVAILABLE.to_string(),
            memory: NOT_AVAILABLE.to_string(),
            gpu: NOT_AVAILABLE.to_string(),
        }
    }
}

impl From<&ResourceSnapshot> for ResourceReport {
    fn from(snapshot: &ResourceSnapshot) -> Self {
        Self {
            cpu: format!("{:.1}%", snapshot.cpu_percent),
            memory: format!(
                "{:.1}/{:.1} GB",
                snapshot.memory_used as f64 / GIB,
                snapshot.memory_total as f64 / GIB
            ),
            gpu: snapshot.gpu_description.clone(),
        }
    }
}
