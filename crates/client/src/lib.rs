//! Client side of the two query-service operations the analytics view
//! depends on: ask-a-question and execute-aggregate-query.

pub mod backend;
pub mod error;
pub mod http;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use backend::{QueryAnswer, QueryBackend};
pub use error::RemoteError;
pub use http::HttpBackend;
