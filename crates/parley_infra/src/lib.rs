mod dto;
mod fs;
mod ollama;
mod parley_infra;
mod resources;

pub use fs::*;
pub use ollama::*;
pub use parley_infra::*;
pub use resources::*;
