use core::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{Headers, HttpResult};

/// Response body, decoded according to the request's `json` flag
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// The server sent no body
    #[default]
    Empty,
    /// Raw text, either because `json` was off or the body was not JSON
    Text(String),
    /// Parsed JSON
    Json(Value),
}

impl Body {
    /// Decodes raw response bytes.
    ///
    /// With `json` off the body is always text. With `json` on, the body is
    /// parsed; a parse failure is an error only when `content_type` declares
    /// JSON, otherwise the text is kept.
    pub fn decode(
        bytes: &[u8],
        json: bool,
        content_type: Option<&str>,
    ) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::Empty);
        }

        if json {
            match serde_json::from_slice::<Value>(bytes) {
                Ok(value) => return Ok(Self::Json(value)),
                Err(e) if content_type.is_some_and(is_json_content_type) => return Err(e),
                Err(_) => {}
            }
        }

        Ok(Self::Text(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// Like [`Body::decode`], but keeps unparseable JSON as text
    pub fn decode_lossy(bytes: &[u8], json: bool) -> Self {
        Self::decode(bytes, json, None).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The parsed JSON value, if the body was JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if the body was kept as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Deserializes the body into `T`. Text bodies are parsed as JSON first.
    pub fn json<T: DeserializeOwned>(&self) -> HttpResult<T> {
        let value = match self {
            Self::Json(value) => serde_json::from_value(value.clone())?,
            Self::Text(text) => serde_json::from_str(text)?,
            Self::Empty => serde_json::from_value(Value::Null)?,
        };
        Ok(value)
    }

    /// Converts into a JSON value; text becomes a JSON string, no body is `null`
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
            Self::Empty => Value::Null,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

impl PartialEq<str> for Body {
    fn eq(&self, other: &str) -> bool {
        match self {
            Self::Text(text) => text == other,
            Self::Json(Value::String(text)) => text == other,
            _ => false,
        }
    }
}

impl PartialEq<&str> for Body {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<String> for Body {
    fn eq(&self, other: &String) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<Value> for Body {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Json(value), other) => value == other,
            (Self::Text(text), Value::String(other)) => text == other,
            (Self::Empty, Value::Null) => true,
            _ => false,
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Whether a `Content-Type` value declares a JSON payload
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Response status category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusCategory {
    /// 1xx status codes - Informational
    Informational,
    /// 2xx status codes - Success
    Success,
    /// 3xx status codes - Redirection
    Redirection,
    /// 4xx status codes - Client Error
    ClientError,
    /// 5xx status codes - Server Error
    ServerError,
    /// Any other status code
    Unknown,
}

/// Status code, headers and body of a completed round trip
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullResponse {
    /// HTTP status code
    pub status_code: u16,

    /// Response headers, names lower-cased. Repeated values are joined with
    /// `", "`, `set-cookie` values with `\n`.
    pub headers: Headers,

    pub body: Body,
}

impl FullResponse {
    /// Creates a response with no headers and no body
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Checks if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Checks if the response status is a redirection (3xx)
    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    /// Checks if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Checks if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    pub fn status_category(&self) -> StatusCategory {
        match self.status_code {
            100..=199 => StatusCategory::Informational,
            200..=299 => StatusCategory::Success,
            300..=399 => StatusCategory::Redirection,
            400..=499 => StatusCategory::ClientError,
            500..=599 => StatusCategory::ServerError,
            _ => StatusCategory::Unknown,
        }
    }

    /// Gets a header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Deserializes the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> HttpResult<T> {
        self.body.json()
    }

    pub fn into_body(self) -> Body {
        self.body
    }
}

/// Outcome of [`Http::request`](crate::Http::request), shaped by the
/// descriptor's `resolve_with_full_response` flag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Body(Body),
    Full(FullResponse),
}

impl Reply {
    /// Shapes a response: the full descriptor when `full` is set, else the body
    pub fn shape(response: FullResponse, full: bool) -> Self {
        if full {
            Self::Full(response)
        } else {
            Self::Body(response.body)
        }
    }

    pub fn into_body(self) -> Body {
        match self {
            Self::Body(body) => body,
            Self::Full(response) => response.body,
        }
    }

    pub fn into_full(self) -> Option<FullResponse> {
        match self {
            Self::Full(response) => Some(response),
            Self::Body(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Full(response) => Some(response.status_code),
            Self::Body(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn text_body_survives_json_mode() {
        let body = Body::decode(b"ava-http", true, Some("text/plain")).unwrap();
        assert_eq!(body, "ava-http");
    }

    #[test]
    fn json_body_is_parsed() {
        let body = Body::decode(br#"{"a":123}"#, true, Some("application/json")).unwrap();
        assert_eq!(body, json!({ "a": 123 }));
    }

    #[test]
    fn json_off_keeps_literal_text() {
        let body = Body::decode(br#"{"a":123}"#, false, Some("application/json")).unwrap();
        assert_eq!(body, Body::Text(r#"{"a":123}"#.to_string()));
    }

    #[test]
    fn declared_json_that_does_not_parse_is_an_error() {
        assert!(Body::decode(b"{nope", true, Some("application/json; charset=utf-8")).is_err());
        assert_eq!(Body::decode_lossy(b"{nope", true), Body::Text("{nope".into()));
    }

    #[test]
    fn empty_bytes_are_empty_body() {
        assert!(Body::decode(b"", true, Some("application/json")).unwrap().is_empty());
        assert!(Body::decode(b"", false, None).unwrap().is_empty());
    }

    #[test]
    fn json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/plain"));
    }

    #[test]
    fn typed_json_from_text_body() {
        let body = Body::Text(r#"{"a":1}"#.into());
        let value: std::collections::HashMap<String, i32> = body.json().unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn status_categories() {
        assert_eq!(FullResponse::new(204).status_category(), StatusCategory::Success);
        assert_eq!(FullResponse::new(301).status_category(), StatusCategory::Redirection);
        assert!(FullResponse::new(404).is_client_error());
        assert!(FullResponse::new(503).is_server_error());
    }

    #[test]
    fn reply_shape_follows_flag() {
        let response = FullResponse::new(200).with_body("ok");
        assert_eq!(Reply::shape(response.clone(), false), Reply::Body(Body::from("ok")));
        assert_eq!(Reply::shape(response, true).status_code(), Some(200));
    }

    #[test]
    fn display_matches_wire_text() {
        assert_eq!(Body::Json(json!({ "a": "b" })).to_string(), r#"{"a":"b"}"#);
        assert_eq!(Body::Empty.to_string(), "");
    }
}
