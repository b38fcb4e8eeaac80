mod error;
mod infra;
mod message;
mod model;
mod prompt;
mod request;
mod resource;
mod transcript;

pub use error::*;
pub use infra::*;
pub use message::*;
pub use model::*;
pub use prompt::*;
pub use request::*;
pub use resource::*;
pub use transcript::*;
