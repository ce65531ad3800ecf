//! # trial-http
//!
//! GET/POST/PUT/DELETE helpers for tests, layered over `reqwest`.
//!
//! Each verb merges the caller's [`RequestOptions`] over [`DEFAULTS`]
//! (`GET`, JSON on), forces its own method, and hands the result to a
//! [`Transport`]. Bare verbs resolve with the [`Body`]; the `*_response`
//! variants resolve with a [`FullResponse`]. Any non-2xx status fails with
//! [`HttpError::Status`].
//!
//! ```no_run
//! # async fn run() -> trial_http::HttpResult<()> {
//! use trial_http::RequestOptions;
//!
//! let body = trial_http::get("http://127.0.0.1:3000/", RequestOptions::new().with_query("q", "1")).await?;
//! let created = trial_http::post_response(
//!     "http://127.0.0.1:3000/items",
//!     RequestOptions::new().with_body(serde_json::json!({ "a": 1 })),
//! )
//! .await?;
//! # let _ = (body, created);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod descriptor;
mod error;
mod method;
mod options;
mod response;
mod transport;

pub use client::{
    Http, del, del_response, get, get_response, post, post_response, put, put_response,
};
pub use config::{DEFAULT_MAX_REDIRECTS, TransportConfig};
pub use descriptor::{DEFAULTS, Defaults, RequestDescriptor};
pub use error::{HttpError, HttpResult, StatusError};
pub use method::Method;
pub use options::{Form, Headers, Query, RequestOptions};
pub use response::{Body, FullResponse, Reply, StatusCategory, is_json_content_type};
pub use transport::{ReqwestTransport, Transport};
