//! Disposable HTTP server, one per test

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::body::Bytes;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::{TestingError, TestingResult};

/// A server bound to an ephemeral localhost port. Dropping it stops it.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    url: String,
    requests: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Socket address the server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL, `http://127.0.0.1:<port>`. The loopback address is used
    /// instead of `localhost` so the client never resolves to `::1` while the
    /// server only listens on IPv4.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL for `path` on this server
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }

    /// Number of requests handled so far
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts a server that answers every request, whatever the method or path,
/// with `handler`. Resolves once the port is bound.
pub async fn listen<H, Fut, R>(handler: H) -> TestingResult<TestServer>
where
    H: Fn(TestRequest) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .map_err(TestingError::Bind)?;
    let addr = listener.local_addr().map_err(TestingError::Bind)?;

    let requests = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&requests);

    let app = Router::new().fallback(move |req: Request| {
        let handler = handler.clone();
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            match TestRequest::read(req).await {
                Ok(req) => handler(req).await.into_response(),
                Err(e) => send(500, e.to_string()),
            }
        }
    });

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "test server stopped");
        }
    });

    tracing::debug!(%addr, "test server listening");

    Ok(TestServer {
        addr,
        url: format!("http://{addr}"),
        requests,
        task,
    })
}

/// [`listen`] for handlers that answer without awaiting anything
pub async fn listen_sync<H, R>(handler: H) -> TestingResult<TestServer>
where
    H: Fn(TestRequest) -> R + Clone + Send + Sync + 'static,
    R: IntoResponse + Send + 'static,
{
    listen(move |req| std::future::ready(handler(req))).await
}

/// A request as seen by a test handler, body already read
#[derive(Debug, Clone)]
pub struct TestRequest {
    pub method: Method,
    pub path: String,
    pub query: IndexMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestRequest {
    async fn read(req: Request) -> Result<Self, axum::Error> {
        let (parts, body) = req.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await?;

        let query: IndexMap<String, String> = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query,
            headers: parts.headers,
            body,
        })
    }

    /// Gets a header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as text, invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> TestingResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Parses a URL-encoded form body
    pub fn form(&self) -> IndexMap<String, String> {
        url::form_urlencoded::parse(&self.body).into_owned().collect()
    }
}

/// What [`send`] writes back
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    /// `text/plain; charset=utf-8`
    Text(String),
    /// `application/json`
    Json(Value),
    /// `application/octet-stream`
    Bytes(Bytes),
}

impl From<()> for Payload {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

/// Builds a response with `status` and `payload`. An out-of-range status
/// becomes 500.
pub fn send(status: u16, payload: impl Into<Payload>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match payload.into() {
        Payload::Empty => status.into_response(),
        Payload::Text(text) => {
            (status, [(CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response()
        }
        Payload::Json(value) => {
            (status, [(CONTENT_TYPE, "application/json")], value.to_string()).into_response()
        }
        Payload::Bytes(bytes) => {
            (status, [(CONTENT_TYPE, "application/octet-stream")], bytes).into_response()
        }
    }
}

/// Handler that answers 200 with the request body and content type
pub async fn echo(req: TestRequest) -> Response {
    let content_type = req
        .header("content-type")
        .unwrap_or("application/octet-stream")
        .to_string();
    (StatusCode::OK, [(CONTENT_TYPE, content_type)], req.body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_sets_content_type_per_payload() {
        let res = send(200, "ava-http");
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");

        let res = send(404, serde_json::json!({ "a": "b" }));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");

        let res = send(204, ());
        assert!(res.headers().get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn url_uses_the_loopback_address() {
        let server = listen_sync(|_| send(200, ())).await.unwrap();
        assert_eq!(server.url(), format!("http://127.0.0.1:{}", server.addr().port()));
        assert_eq!(server.url_for("/a"), format!("{}/a", server.url()));
    }

    #[test]
    fn invalid_status_becomes_500() {
        assert_eq!(send(42, ()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
