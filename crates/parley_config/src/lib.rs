mod error;
mod recommended;
mod settings;

pub use error::*;
pub use recommended::*;
pub use settings::*;
