//! Per-test context carrying the HTTP helper

use std::future::Future;

use axum::response::IntoResponse;
use trial_http::Http;

use crate::server::{TestRequest, TestServer, listen, listen_sync};
use crate::TestingResult;

/// Fresh state for one test: the helper under `http` and any servers the
/// test started, which stop when the context is dropped.
///
/// ```no_run
/// # async fn run() -> trial_testing::TestingResult<()> {
/// use trial_http::RequestOptions;
/// use trial_testing::{TestContext, send};
///
/// let mut ctx = TestContext::new()?;
/// let url = ctx.listen(|_req| async { send(200, "ava-http") }).await?;
/// assert_eq!(ctx.http.get(&url, RequestOptions::new()).await?, "ava-http");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TestContext {
    pub http: Http,
    servers: Vec<TestServer>,
}

impl TestContext {
    /// Creates a context over a default [`Http`] and turns on test logging
    pub fn new() -> TestingResult<Self> {
        Ok(Self::with_http(Http::new()?))
    }

    /// Creates a context around an existing helper
    pub fn with_http(http: Http) -> Self {
        trial_log::init_test();
        Self {
            http,
            servers: Vec::new(),
        }
    }

    /// Starts a disposable server owned by this context and returns its URL
    pub async fn listen<H, Fut, R>(&mut self, handler: H) -> TestingResult<String>
    where
        H: Fn(TestRequest) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let server = listen(handler).await?;
        Ok(self.keep(server))
    }

    /// [`TestContext::listen`] for synchronous handlers
    pub async fn listen_sync<H, R>(&mut self, handler: H) -> TestingResult<String>
    where
        H: Fn(TestRequest) -> R + Clone + Send + Sync + 'static,
        R: IntoResponse + Send + 'static,
    {
        let server = listen_sync(handler).await?;
        Ok(self.keep(server))
    }

    /// Servers started through this context, oldest first
    pub fn servers(&self) -> &[TestServer] {
        &self.servers
    }

    fn keep(&mut self, server: TestServer) -> String {
        let url = server.url().to_string();
        self.servers.push(server);
        url
    }
}
