use std::fmt;
use std::sync::Arc;

use crate::{
    Body, FullResponse, HttpResult, Method, Reply, RequestDescriptor, RequestOptions,
    ReqwestTransport, Transport, TransportConfig,
};

/// The HTTP helper: four verbs plus their full-response variants.
///
/// Holds nothing but the transport, so a clone is as good as a fresh
/// instance and concurrent calls never observe each other.
///
/// ```no_run
/// # async fn run() -> trial_http::HttpResult<()> {
/// use trial_http::{Http, RequestOptions};
///
/// let http = Http::new()?;
/// let body = http.get("http://127.0.0.1:8080/", RequestOptions::new()).await?;
/// let res = http.del_response("http://127.0.0.1:8080/1", RequestOptions::new()).await?;
/// assert_eq!(res.status_code, 200);
/// # let _ = body;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Http {
    transport: Arc<dyn Transport>,
}

impl Http {
    /// Creates a helper over a default [`ReqwestTransport`]
    pub fn new() -> HttpResult<Self> {
        Ok(Self::with_transport(ReqwestTransport::new()?))
    }

    /// Creates a helper over a [`ReqwestTransport`] built from `config`
    pub fn with_config(config: TransportConfig) -> HttpResult<Self> {
        Ok(Self::with_transport(ReqwestTransport::with_config(config)?))
    }

    /// Creates a helper over any transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Creates a helper sharing an already type-erased transport
    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Dispatches a fully merged request and shapes the result by its
    /// `resolve_with_full_response` flag.
    pub async fn request(&self, request: RequestDescriptor) -> HttpResult<Reply> {
        let full = request.resolve_with_full_response;
        let response = self.dispatch(request).await?;
        Ok(Reply::shape(response, full))
    }

    /// The one path every call takes to the transport
    async fn dispatch(&self, request: RequestDescriptor) -> HttpResult<FullResponse> {
        self.transport.send(request).await.inspect_err(|e| {
            if let Some(status) = e.status_code() {
                tracing::warn!(status, error = %e, "request failed");
            }
        })
    }

    async fn send_verb(
        &self,
        method: Method,
        uri: &str,
        options: RequestOptions,
    ) -> HttpResult<FullResponse> {
        let request = RequestDescriptor::merge(uri, options, Some(method));
        tracing::debug!(verb = method.verb(), uri, "dispatching");
        self.dispatch(request).await
    }

    async fn get_full(&self, uri: &str, mut options: RequestOptions) -> HttpResult<FullResponse> {
        options.promote_params();
        self.send_verb(Method::Get, uri, options).await
    }

    /// Sends a GET request, resolving with the body.
    ///
    /// `qs` falls back to `params`, then to an empty query.
    pub async fn get(&self, uri: &str, options: RequestOptions) -> HttpResult<Body> {
        self.get_full(uri, options).await.map(FullResponse::into_body)
    }

    /// Sends a GET request, resolving with the full response
    pub async fn get_response(&self, uri: &str, options: RequestOptions) -> HttpResult<FullResponse> {
        self.get_full(uri, options.full_response()).await
    }

    /// Sends a POST request, resolving with the body
    pub async fn post(&self, uri: &str, options: RequestOptions) -> HttpResult<Body> {
        self.send_verb(Method::Post, uri, options)
            .await
            .map(FullResponse::into_body)
    }

    /// Sends a POST request, resolving with the full response
    pub async fn post_response(&self, uri: &str, options: RequestOptions) -> HttpResult<FullResponse> {
        self.send_verb(Method::Post, uri, options.full_response()).await
    }

    /// Sends a PUT request, resolving with the body
    pub async fn put(&self, uri: &str, options: RequestOptions) -> HttpResult<Body> {
        self.send_verb(Method::Put, uri, options)
            .await
            .map(FullResponse::into_body)
    }

    /// Sends a PUT request, resolving with the full response
    pub async fn put_response(&self, uri: &str, options: RequestOptions) -> HttpResult<FullResponse> {
        self.send_verb(Method::Put, uri, options.full_response()).await
    }

    /// Sends a DELETE request, resolving with the body
    pub async fn del(&self, uri: &str, options: RequestOptions) -> HttpResult<Body> {
        self.send_verb(Method::Delete, uri, options)
            .await
            .map(FullResponse::into_body)
    }

    /// Sends a DELETE request, resolving with the full response
    pub async fn del_response(&self, uri: &str, options: RequestOptions) -> HttpResult<FullResponse> {
        self.send_verb(Method::Delete, uri, options.full_response()).await
    }
}

impl fmt::Debug for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Http").finish_non_exhaustive()
    }
}

// Helper functions over a default transport, built per call

/// Sends a GET request
pub async fn get(uri: &str, options: RequestOptions) -> HttpResult<Body> {
    Http::new()?.get(uri, options).await
}

/// Sends a GET request and resolves with the full response
pub async fn get_response(uri: &str, options: RequestOptions) -> HttpResult<FullResponse> {
    Http::new()?.get_response(uri, options).await
}

/// Sends a POST request
pub async fn post(uri: &str, options: RequestOptions) -> HttpResult<Body> {
    Http::new()?.post(uri, options).await
}

/// Sends a POST request and resolves with the full response
pub async fn post_response(uri: &str, options: RequestOptions) -> HttpResult<FullResponse> {
    Http::new()?.post_response(uri, options).await
}

/// Sends a PUT request
pub async fn put(uri: &str, options: RequestOptions) -> HttpResult<Body> {
    Http::new()?.put(uri, options).await
}

/// Sends a PUT request and resolves with the full response
pub async fn put_response(uri: &str, options: RequestOptions) -> HttpResult<FullResponse> {
    Http::new()?.put_response(uri, options).await
}

/// Sends a DELETE request
pub async fn del(uri: &str, options: RequestOptions) -> HttpResult<Body> {
    Http::new()?.del(uri, options).await
}

/// Sends a DELETE request and resolves with the full response
pub async fn del_response(uri: &str, options: RequestOptions) -> HttpResult<FullResponse> {
    Http::new()?.del_response(uri, options).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{HttpError, Query, StatusError};

    /// Records every descriptor and answers with a canned response
    struct Recording {
        seen: Mutex<Vec<RequestDescriptor>>,
        reply: FullResponse,
    }

    impl Recording {
        fn answering(reply: FullResponse) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                reply,
            })
        }

        fn seen(&self) -> Vec<RequestDescriptor> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Recording {
        async fn send(&self, request: RequestDescriptor) -> HttpResult<FullResponse> {
            self.seen.lock().unwrap().push(request);
            if self.reply.is_success() {
                Ok(self.reply.clone())
            } else {
                Err(StatusError::new(self.reply.clone()).into())
            }
        }
    }

    fn helper(reply: FullResponse) -> (Http, Arc<Recording>) {
        let recording = Recording::answering(reply);
        let shared: Arc<dyn Transport> = recording.clone();
        (Http::from_shared(shared), recording)
    }

    #[tokio::test]
    async fn verbs_force_their_method() {
        let (http, recording) = helper(FullResponse::new(200));
        let options = || RequestOptions::new().with_method(Method::Post);

        http.get("http://h/", options()).await.unwrap();
        http.post("http://h/", options().with_method(Method::Get)).await.unwrap();
        http.put("http://h/", options()).await.unwrap();
        http.del("http://h/", options()).await.unwrap();

        let methods: Vec<_> = recording.seen().iter().map(|r| r.method).collect();
        assert_eq!(methods, [Method::Get, Method::Post, Method::Put, Method::Delete]);
    }

    #[tokio::test]
    async fn get_promotes_params_but_post_does_not() {
        let (http, recording) = helper(FullResponse::new(200));
        let options = || RequestOptions::new().with_params([("token", "123456789")]);

        http.get("http://h/", options()).await.unwrap();
        http.post("http://h/", options()).await.unwrap();

        let seen = recording.seen();
        assert_eq!(seen[0].qs, Some(Query::from([("token".into(), "123456789".into())])));
        assert_eq!(seen[1].qs, None);
    }

    #[tokio::test]
    async fn get_without_query_installs_empty_qs() {
        let (http, recording) = helper(FullResponse::new(200));
        http.get("http://h/", RequestOptions::new()).await.unwrap();
        assert_eq!(recording.seen()[0].qs, Some(Query::new()));
    }

    #[tokio::test]
    async fn response_variants_only_set_the_flag() {
        let (http, recording) = helper(FullResponse::new(204));

        let res = http.put_response("http://h/", RequestOptions::new()).await.unwrap();
        http.put("http://h/", RequestOptions::new()).await.unwrap();

        assert_eq!(res.status_code, 204);
        let seen = recording.seen();
        assert!(seen[0].resolve_with_full_response);
        assert!(!seen[1].resolve_with_full_response);
        assert_eq!(seen[0].method, seen[1].method);
    }

    #[tokio::test]
    async fn status_errors_pass_through_untouched() {
        let reply = FullResponse::new(404)
            .with_header("content-type", "application/json")
            .with_body(json!({ "a": "b" }));
        let (http, _) = helper(reply);

        let err = http.get("http://h/", RequestOptions::new()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.response().unwrap().body, json!({ "a": "b" }));
        assert_eq!(err.to_string(), r#"404 - {"a":"b"}"#);
    }

    #[tokio::test]
    async fn request_shapes_by_flag() {
        let (http, _) = helper(FullResponse::new(200).with_body("ava-http"));

        let bare = RequestDescriptor::from_options("http://h/", RequestOptions::new());
        let full = RequestDescriptor::from_options("http://h/", RequestOptions::new().full_response());

        assert_eq!(http.request(bare).await.unwrap(), Reply::Body(Body::from("ava-http")));
        assert_eq!(http.request(full).await.unwrap().status_code(), Some(200));
    }

    #[tokio::test]
    async fn back_to_back_verbs_do_not_leak() {
        let (http, recording) = helper(FullResponse::new(200));
        let shared = RequestOptions::new().with_json(false);

        http.del("http://h/a", shared.clone()).await.unwrap();
        http.get("http://h/b", shared).await.unwrap();

        let seen = recording.seen();
        assert_eq!(seen[1].method, Method::Get);
        assert_eq!(seen[1].uri, "http://h/b");
        assert!(!seen[1].json);
    }

    #[tokio::test]
    async fn invalid_uri_through_reqwest() {
        let http = Http::new().unwrap();
        let err = http.get("", RequestOptions::new()).await.unwrap_err();
        assert!(matches!(err, HttpError::InvalidUri { .. }));
    }
}
