use thiserror::Error;

use crate::response::FullResponse;

/// Result type for HTTP helper calls
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors that can occur when issuing a request through the helper
#[derive(Error, Debug)]
pub enum HttpError {
    /// The request URI is empty or cannot be parsed
    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Network-level failure reported by the transport
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status outside 2xx
    #[error(transparent)]
    Status(#[from] StatusError),

    /// The response claimed to be JSON but the body did not parse
    #[error("Malformed JSON in {status_code} response: {source}")]
    MalformedJson {
        status_code: u16,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport could not be constructed
    #[error("Build error: {0}")]
    Build(String),
}

impl HttpError {
    /// Status code of the response that caused the failure, when there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(err) => Some(err.status_code),
            Self::MalformedJson { status_code, .. } => Some(*status_code),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The full response attached to a status failure
    pub fn response(&self) -> Option<&FullResponse> {
        match self {
            Self::Status(err) => Some(&err.response),
            _ => None,
        }
    }

    /// Whether this is a non-2xx status failure
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status(_))
    }
}

/// A non-2xx response, carried with everything the server sent back
#[derive(Error, Debug, Clone)]
#[error("{status_code} - {}", response.body)]
pub struct StatusError {
    /// HTTP status code
    pub status_code: u16,
    /// The response, body decoded with the same rules as a successful call
    pub response: FullResponse,
}

impl StatusError {
    pub fn new(response: FullResponse) -> Self {
        Self {
            status_code: response.status_code,
            response,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn response(&self) -> &FullResponse {
        &self.response
    }
}
