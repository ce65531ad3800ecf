use serde::{Deserialize, Serialize};

use crate::Headers;

/// Default redirect limit, matching reqwest's own policy
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Settings for [`ReqwestTransport`](crate::ReqwestTransport).
///
/// Applies to the client as a whole; per-call behavior lives in
/// [`RequestOptions`](crate::RequestOptions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// `User-Agent` sent with every request
    pub user_agent: String,

    /// Follow 3xx responses to GET requests; other verbs never follow
    pub follow_redirects: bool,

    pub max_redirects: usize,

    /// Headers sent with every request; per-call headers override them
    pub default_headers: Headers,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("trial-http/", env!("CARGO_PKG_VERSION")).to_string(),
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            default_headers: Headers::new(),
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}
