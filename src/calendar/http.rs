use std::time::Duration;

use reqwest::Method;
use tokio::runtime::Handle;

use crate::error::HttpError;

/// One outbound request, as a handler sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The host's outbound HTTP capability. Calls block until the response body
/// has been read in full.
pub trait HttpCapability: Send + Sync {
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// `HttpCapability` backed by an async reqwest client. Each call is driven to
/// completion on the runtime handle, so it must be made from a blocking
/// context (e.g. inside `spawn_blocking`), never from an async task.
pub struct ReqwestHttp {
    client: reqwest::Client,
    runtime: Handle,
}

impl ReqwestHttp {
    pub fn new(runtime: Handle, timeout: Option<Duration>) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            runtime,
        })
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {e}", request.url)))?;
        let mut builder = self.client.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(request_error)?;
        Ok(HttpResponse { status, body })
    }
}

fn request_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Request(err)
    }
}

impl HttpCapability for ReqwestHttp {
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.runtime.block_on(self.send(request))
    }
}

#[cfg(test)]
pub mod stub {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;

    /// Records every request and replies from a queue of canned responses
    /// or failures. An empty queue answers 200 with `{}`.
    #[derive(Default)]
    pub struct StubHttp {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl StubHttp {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, status: u16, body: &str) -> Self {
            self.responses.lock().push_back(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }));
            self
        }

        /// Fail the next request before any response arrives.
        pub fn fail_with(self, error: HttpError) -> Self {
            self.responses.lock().push_back(Err(error));
            self
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().len()
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.lock().last().cloned()
        }
    }

    impl HttpCapability for StubHttp {
        fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
            self.requests.lock().push(request.clone());
            self.responses.lock().pop_front().unwrap_or(Ok(HttpResponse {
                status: 200,
                body: "{}".to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::StubHttp;
    use super::*;

    #[test]
    fn test_success_range() {
        let ok = |status| HttpResponse {
            status,
            body: String::new(),
        };
        assert!(ok(200).is_success());
        assert!(ok(204).is_success());
        assert!(!ok(199).is_success());
        assert!(!ok(302).is_success());
        assert!(!ok(403).is_success());
    }

    #[test]
    fn test_stub_replays_in_order_then_defaults() {
        let stub = StubHttp::new()
            .respond(201, "first")
            .fail_with(HttpError::Timeout)
            .respond(404, "second");
        let req = HttpRequest {
            method: Method::GET,
            url: "https://example.test/".into(),
            headers: vec![],
            body: None,
        };
        assert_eq!(stub.request(&req).unwrap().body, "first");
        assert!(matches!(stub.request(&req), Err(HttpError::Timeout)));
        assert_eq!(stub.request(&req).unwrap().status, 404);
        assert_eq!(stub.request(&req).unwrap().body, "{}");
        assert_eq!(stub.call_count(), 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reqwest_rejects_bad_url() {
        let http = ReqwestHttp::new(Handle::current(), None).unwrap();
        let result = tokio::task::spawn_blocking(move || {
            http.request(&HttpRequest {
                method: Method::GET,
                url: "not a url".into(),
                headers: vec![],
                body: None,
            })
        })
        .await
        .unwrap();
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }
}
