use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::request::{ApiResponse, PreparedRequest};
use super::ApiError;

/// Moves a prepared request over the wire and returns the raw response.
///
/// Non-2xx statuses are returned as responses, not errors; only failures to
/// get any response at all surface as `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError>;
}

/// Transport backed by a pooled `reqwest::Client`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(url = %request.url, status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    type Responder = Box<dyn Fn(&PreparedRequest) -> Result<ApiResponse, ApiError> + Send + Sync>;

    /// In-process transport that records every request and answers from a
    /// closure.
    pub(crate) struct MockTransport {
        responder: Responder,
        requests: Mutex<Vec<PreparedRequest>>,
    }

    impl MockTransport {
        pub(crate) fn new<F>(responder: F) -> Self
        where
            F: Fn(&PreparedRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
        {
            Self {
                responder: Box::new(responder),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Always answer with the given status and body
        pub(crate) fn fixed(status: u16, body: &str) -> Self {
            let body = body.to_string();
            Self::new(move |_| {
                Ok(ApiResponse::new(
                    reqwest::StatusCode::from_u16(status).unwrap(),
                    body.clone(),
                ))
            })
        }

        pub(crate) fn requests(&self) -> Vec<PreparedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError> {
            let result = (self.responder)(&request);
            self.requests.lock().unwrap().push(request);
            result
        }
    }
}
