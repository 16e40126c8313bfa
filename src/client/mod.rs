pub mod backoff;
pub mod error;
pub mod http;
pub mod poll;

pub use backoff::BackoffConfig;
pub use error::ClientError;
pub use http::JobClient;
pub use poll::{Poller, Sleeper, StatusSource};
