//! # trial-testing
//!
//! Test-side collaborators for `trial-http`: a disposable server bound to an
//! ephemeral port and a per-test [`TestContext`] exposing the helper as
//! `ctx.http`.

mod context;
mod server;

use thiserror::Error;

pub use context::TestContext;
pub use server::{Payload, TestRequest, TestServer, echo, listen, listen_sync, send};

/// Result type for test harness operations
pub type TestingResult<T> = Result<T, TestingError>;

/// Errors raised while setting up a test
#[derive(Error, Debug)]
pub enum TestingError {
    /// The server could not bind its port
    #[error("Failed to bind test server: {0}")]
    Bind(#[source] std::io::Error),

    /// The HTTP helper failed
    #[error(transparent)]
    Http(#[from] trial_http::HttpError),

    /// A request body was not the JSON the handler expected
    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}
