use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Form, Headers, Method, Query, RequestOptions};

/// Library defaults merged under every call's options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub method: Method,
    pub json: bool,
}

/// `{ method: GET, json: true }`
pub const DEFAULTS: Defaults = Defaults {
    method: Method::Get,
    json: true,
};

/// A fully-specified request, ready for a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub uri: String,
    pub method: Method,
    pub json: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qs: Option<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<Form>,
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    pub resolve_with_full_response: bool,
}

impl RequestDescriptor {
    /// Merges `DEFAULTS` ← `options` ← `uri` ← `forced`.
    ///
    /// The caller's `json` overrides the default, but nothing in `options`
    /// can replace `uri` or a forced method.
    pub fn merge(uri: impl Into<String>, options: RequestOptions, forced: Option<Method>) -> Self {
        let method = forced
            .or(options.method)
            .unwrap_or(DEFAULTS.method);

        Self {
            uri: uri.into(),
            method,
            json: options.json.unwrap_or(DEFAULTS.json),
            qs: options.qs,
            body: options.body,
            form: options.form,
            headers: options.headers,
            resolve_with_full_response: options.resolve_with_full_response.unwrap_or(false),
        }
    }

    /// Merges options without forcing a method, so `options.method` is honored
    pub fn from_options(uri: impl Into<String>, options: RequestOptions) -> Self {
        Self::merge(uri, options, None)
    }

    /// Looks up a request header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
