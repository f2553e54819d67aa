//! API client for communicating with the budget REST API.
//!
//! Every call goes through [`ApiClient::send`], which attaches the current
//! bearer token, transmits the request, and watches for authorization
//! failures. A 401 signs the session out and fires the session-invalidated
//! hook before the error reaches the caller. There are no retries.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use super::request::{join_url, ApiResponse, PreparedRequest, RequestDescriptor};
use super::transport::{ReqwestTransport, Transport};
use super::ApiError;
use crate::config::Config;
use crate::session::{Invalidation, SessionStore};

/// Route the UI should show after the session is invalidated
pub const LOGIN_ROUTE: &str = "/auth";

/// Emitted once per response that invalidated the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInvalidated {
    /// Where the UI should navigate
    pub redirect_to: &'static str,
    /// Path of the request that was rejected
    pub path: String,
}

pub type InvalidationHook = Arc<dyn Fn(&SessionInvalidated) + Send + Sync>;

/// API client for the budget server.
/// Clone is cheap - transport and session are shared.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    on_invalidated: Option<InvalidationHook>,
}

impl ApiClient {
    /// Create a client that talks HTTP to the configured server
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(
            config.api_base_url.clone(),
            Arc::new(transport),
            session,
        ))
    }

    pub fn with_transport(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            session,
            on_invalidated: None,
        }
    }

    /// Install the callback invoked when a 401 ends the session. This is
    /// where the owner of top-level navigation sends the user to login.
    pub fn on_session_invalidated(mut self, hook: InvalidationHook) -> Self {
        self.on_invalidated = Some(hook);
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(token: Option<&str>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidRequest("Token contains characters not allowed in a header".into())
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send a request through the pipeline.
    ///
    /// Non-2xx responses become errors. A 401 clears the session (unless a
    /// newer login already replaced the rejected token) and fires the
    /// invalidation hook exactly once before returning
    /// [`ApiError::Unauthorized`]. Any other response to a request whose
    /// session ended while it was in flight is dropped as
    /// [`ApiError::SessionEnded`].
    pub async fn send(&self, request: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        let credential = self.session.credential();
        let headers = Self::auth_headers(credential.token.as_deref())?;

        let RequestDescriptor {
            method,
            path,
            body,
            query,
        } = request;

        let prepared = PreparedRequest {
            method,
            url: join_url(&self.base_url, &path),
            query,
            headers,
            body,
        };

        debug!(
            %method,
            path = %path,
            authenticated = credential.token.is_some(),
            "Sending request"
        );

        let response = match self.transport.execute(prepared).await {
            Ok(response) => response,
            Err(e) => {
                error!(%method, path = %path, error = %e, "Request failed");
                return Err(e);
            }
        };

        if response.status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(&path, credential.generation);
            return Err(ApiError::Unauthorized);
        }

        if credential.token.is_some() && self.session.generation() != credential.generation {
            debug!(path = %path, "Discarding response for a session that has ended");
            return Err(ApiError::SessionEnded);
        }

        if !response.status.is_success() {
            let err = ApiError::from_status(response.status, &response.body);
            error!(%method, path = %path, status = response.status.as_u16(), error = %err, "API error");
            return Err(err);
        }

        Ok(response)
    }

    fn handle_unauthorized(&self, path: &str, generation: u64) {
        match self.session.invalidate(generation) {
            Invalidation::Superseded => {
                debug!(path, "401 for a replaced credential, keeping current session");
            }
            outcome => {
                warn!(path, ?outcome, "Authorization rejected, session invalidated");
                if let Some(ref hook) = self.on_invalidated {
                    hook(&SessionInvalidated {
                        redirect_to: LOGIN_ROUTE,
                        path: path.to_string(),
                    });
                }
            }
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(RequestDescriptor::get(path)).await?.json()
    }

    /// GET a list, treating an empty or `null` body as no items
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<Vec<T>, ApiError> {
        self.send(request).await?.json_or_default()
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(RequestDescriptor::post(path).json(body)?)
            .await?
            .json()
    }
}
