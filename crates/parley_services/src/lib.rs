mod comparator;
mod monitor;
mod parley_services;
mod relay;
mod transcript;

#[cfg(test)]
mod mock;

pub use comparator::*;
pub use monitor::*;
pub use parley_services::*;
pub use relay::*;
pub use transcript::*;
