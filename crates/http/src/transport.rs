use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, SET_COOKIE};
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

use crate::{
    Body, FullResponse, Headers, HttpError, HttpResult, RequestDescriptor, StatusError,
    TransportConfig,
};

/// Performs the actual round trip for a merged request.
///
/// Implementations open the connection, encode the body, decode the response
/// per the descriptor's `json` flag and turn non-2xx statuses into
/// [`HttpError::Status`]. The helper never retries or recovers from what a
/// transport returns.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> HttpResult<FullResponse>;
}

/// [`Transport`] backed by `reqwest` clients.
///
/// GET goes through a client that follows redirects per the config; the
/// other verbs use one that never does, so a 3xx surfaces as a status error
/// instead of a GET to the redirect target.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    no_redirect: reqwest::Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Creates a transport with default settings
    pub fn new() -> HttpResult<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Creates a transport with custom settings
    pub fn with_config(config: TransportConfig) -> HttpResult<Self> {
        let redirect = if config.follow_redirects {
            Policy::limited(config.max_redirects)
        } else {
            Policy::none()
        };

        let client = build_client(&config, redirect)?;
        let no_redirect = build_client(&config, Policy::none())?;

        Ok(Self {
            client,
            no_redirect,
            config,
        })
    }

    /// Wraps an existing client for GET requests; `config` then only supplies
    /// default headers and the user agent of the non-following client.
    pub fn from_client(client: reqwest::Client, config: TransportConfig) -> HttpResult<Self> {
        let no_redirect = build_client(&config, Policy::none())?;
        Ok(Self {
            client,
            no_redirect,
            config,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn build_request(&self, request: &RequestDescriptor) -> HttpResult<reqwest::RequestBuilder> {
        let url = request_url(request)?;
        let client = if request.method.follows_redirects() {
            &self.client
        } else {
            &self.no_redirect
        };
        let mut builder = client.request(request.method.into(), url);

        for (key, value) in &self.config.default_headers {
            if request.header(key).is_none() {
                builder = builder.header(key, value);
            }
        }

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if request.json && request.header("accept").is_none() {
            builder = builder.header(ACCEPT, "application/json");
        }

        if let Some(form) = &request.form {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(form)
                .finish();
            builder = builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encoded);
        } else if let Some(body) = &request.body {
            builder = match (request.json, body) {
                (true, body) => builder.json(body),
                (false, Value::String(text)) => builder.body(text.clone()),
                (false, other) => builder.body(other.to_string()),
            };
        }

        Ok(builder)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestDescriptor) -> HttpResult<FullResponse> {
        let builder = self.build_request(&request)?;

        tracing::debug!(method = %request.method, uri = %request.uri, "sending request");
        let start_time = Instant::now();

        let response = builder.send().await?;
        let status_code = response.status().as_u16();

        let headers = collect_headers(response.headers());

        let bytes = response.bytes().await?;
        let success = (200..300).contains(&status_code);

        let content_type = headers.get("content-type").map(String::as_str);
        let body = match Body::decode(&bytes, request.json, content_type) {
            Ok(body) => body,
            Err(source) if success => {
                return Err(HttpError::MalformedJson {
                    status_code,
                    source,
                });
            }
            // A status failure is more useful than a parse failure
            Err(_) => Body::decode_lossy(&bytes, request.json),
        };

        tracing::debug!(
            status = status_code,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "received response"
        );

        let response = FullResponse {
            status_code,
            headers,
            body,
        };

        if !success {
            return Err(StatusError::new(response).into());
        }

        Ok(response)
    }
}

fn build_client(config: &TransportConfig, redirect: Policy) -> HttpResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .redirect(redirect)
        .build()
        .map_err(|e| HttpError::Build(format!("Failed to build client: {e}")))
}

/// Flattens response headers into one entry per name. Repeated values are
/// joined with `", "`, except `set-cookie`, whose values may contain commas
/// and are joined with `'\n'`. Non-UTF-8 bytes are replaced.
fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        let separator = if *name == SET_COOKIE { "\n" } else { ", " };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|joined: &mut String| {
                joined.push_str(separator);
                joined.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    headers
}

/// Parses the request URI and appends the query string
fn request_url(request: &RequestDescriptor) -> HttpResult<Url> {
    if request.uri.trim().is_empty() {
        return Err(HttpError::InvalidUri {
            uri: request.uri.clone(),
            reason: "URI is empty".to_string(),
        });
    }

    let mut url = Url::parse(&request.uri).map_err(|e| HttpError::InvalidUri {
        uri: request.uri.clone(),
        reason: e.to_string(),
    })?;

    if let Some(qs) = request.qs.as_ref().filter(|qs| !qs.is_empty()) {
        url.query_pairs_mut().extend_pairs(qs);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Method, Query, RequestOptions};

    fn descriptor(uri: &str, options: RequestOptions) -> RequestDescriptor {
        RequestDescriptor::merge(uri, options, Some(Method::Get))
    }

    #[test]
    fn query_is_appended_in_order() {
        let request = descriptor(
            "http://localhost:8080/items?page=1",
            RequestOptions::new().with_query("token", "a b").with_query("x", "1"),
        );
        let url = request_url(&request).unwrap();
        assert_eq!(url.query(), Some("page=1&token=a+b&x=1"));
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        let request = descriptor("http://localhost:8080/", RequestOptions::new().with_qs(Query::new()));
        assert_eq!(request_url(&request).unwrap().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn empty_uri_is_rejected() {
        let err = request_url(&descriptor("  ", RequestOptions::new())).unwrap_err();
        assert!(matches!(err, HttpError::InvalidUri { .. }));
    }

    #[test]
    fn relative_uri_is_rejected() {
        let err = request_url(&descriptor("/only/a/path", RequestOptions::new())).unwrap_err();
        assert!(matches!(err, HttpError::InvalidUri { .. }));
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut map = HeaderMap::new();
        map.append("x-seen", "a".parse().unwrap());
        map.append("x-seen", "b".parse().unwrap());
        map.append(SET_COOKIE, "a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT".parse().unwrap());
        map.append(SET_COOKIE, "b=2".parse().unwrap());
        map.append("x-raw", reqwest::header::HeaderValue::from_bytes(b"caf\xe9").unwrap());

        let headers = collect_headers(&map);

        assert_eq!(headers["x-seen"], "a, b");
        assert_eq!(
            headers["set-cookie"],
            "a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT\nb=2"
        );
        assert_eq!(headers["x-raw"], "caf\u{fffd}");
    }

    #[test]
    fn builds_with_default_config() {
        let transport = ReqwestTransport::new().unwrap();
        assert!(transport.config().follow_redirects);
    }
}
