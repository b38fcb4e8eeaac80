mod action;
mod dispatcher;
mod routes;

#[cfg(test)]
mod test_infra;

pub use action::*;
pub use dispatcher::*;
pub use routes::*;
