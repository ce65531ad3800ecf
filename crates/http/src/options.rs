use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{HttpResult, Method};

/// Query-string pairs, kept in insertion order
pub type Query = IndexMap<String, String>;

/// URL-encoded form fields, kept in insertion order
pub type Form = IndexMap<String, String>;

/// Extra request headers
pub type Headers = IndexMap<String, String>;

/// Per-call options accepted by every helper verb.
///
/// Every field is optional; anything left unset falls back to [`DEFAULTS`]
/// when the options are merged into a [`RequestDescriptor`]. Field names
/// serialize in camelCase so an options bag can be written as a JSON fixture.
///
/// [`DEFAULTS`]: crate::DEFAULTS
/// [`RequestDescriptor`]: crate::RequestDescriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestOptions {
    /// Overwritten by every verb; only [`Http::request`](crate::Http::request) reads it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,

    /// Send and parse JSON (default `true`); `false` returns the body as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub qs: Option<Query>,

    /// Alias for `qs`, consumed by `get` only when `qs` is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Query>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// URL-encoded request body; takes precedence over `body`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<Form>,

    #[serde(skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_with_full_response: Option<bool>,
}

impl RequestOptions {
    /// Creates empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method; ignored by the verb helpers
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Toggles JSON encoding and decoding
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    /// Replaces the query string
    pub fn with_qs(
        mut self,
        qs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.qs = Some(collect_pairs(qs));
        self
    }

    /// Adds a single query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.qs
            .get_or_insert_with(Query::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the `params` alias
    pub fn with_params(
        mut self,
        params: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.params = Some(collect_pairs(params));
        self
    }

    /// Sets the raw body
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `body` and sets it as the request body
    pub fn try_with_body<T: Serialize + ?Sized>(mut self, body: &T) -> HttpResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Replaces the form body
    pub fn with_form(
        mut self,
        form: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.form = Some(collect_pairs(form));
        self
    }

    /// Adds a single form field
    pub fn with_form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(Form::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds a header to the request
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets whether the call resolves with the full response
    pub fn resolve_with_full_response(mut self, full: bool) -> Self {
        self.resolve_with_full_response = Some(full);
        self
    }

    /// Shorthand for `resolve_with_full_response(true)`
    pub fn full_response(self) -> Self {
        self.resolve_with_full_response(true)
    }

    /// Installs `qs`, falling back to `params`, then to an empty query.
    pub(crate) fn promote_params(&mut self) {
        let qs = self.qs.take().or_else(|| self.params.take());
        self.qs = Some(qs.unwrap_or_default());
    }
}

fn collect_pairs(
    pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
) -> IndexMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
