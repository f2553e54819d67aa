//! Sign-in, registration and sign-out.
//!
//! `AuthService` turns form input into calls on the auth endpoints and
//! records a successful login in the session store. Registration does not
//! sign the user in; they are sent back to the login form.

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::User;
use crate::validation;

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange email and password for a token and start a session.
    /// Returns the user the server sent back with the token, if any.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Option<User>, ApiError> {
        let request = validation::login_request(email, password)?;
        let response = self.api.login(&request).await?;

        let token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("Login response had no access token".into()))?;

        if response.user.is_none() {
            warn!("Login response carried no user profile");
        }
        self.api.session().login(token, response.user.clone());
        info!(email = %request.email, "Login successful");
        Ok(response.user)
    }

    pub async fn sign_up(&self, email: &str, username: &str, password: &str) -> Result<(), ApiError> {
        let request = validation::register_request(email, username, password)?;
        self.api.register(&request).await?;
        info!(email = %request.email, "Registration complete");
        Ok(())
    }

    pub fn sign_out(&self) {
        self.api.session().logout();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::transport::testing::MockTransport;
    use crate::session::SessionStore;
    use crate::storage::{MemoryTokenStore, TokenStore};

    fn service(transport: MockTransport) -> (AuthService, Arc<MockTransport>, Arc<MemoryTokenStore>) {
        let storage = Arc::new(MemoryTokenStore::default());
        let session = Arc::new(SessionStore::new(storage.clone()));
        let transport = Arc::new(transport);
        let api = ApiClient::with_transport("http://127.0.0.1:8000/", transport.clone(), session);
        (AuthService::new(api), transport, storage)
    }

    #[tokio::test]
    async fn test_sign_in_starts_session() {
        let body = r#"{"access_token": "abc123", "token_type": "bearer", "user": {"id": 1, "username": "alice", "email": "alice@example.com"}}"#;
        let (auth, transport, storage) = service(MockTransport::fixed(200, body));

        let user = auth.sign_in("alice@example.com", "secret").await.unwrap();

        assert_eq!(user.unwrap().username, "alice");
        assert!(auth.api.session().is_authenticated());
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc123"));

        let sent = &transport.requests()[0];
        assert!(sent.url.ends_with("/auth/login"));
        assert_eq!(sent.body.as_ref().unwrap()["email"], "alice@example.com");
        assert!(sent.bearer_token().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_validation_skips_network() {
        let (auth, transport, _) = service(MockTransport::fixed(200, "{}"));

        let err = auth.sign_in("", "secret").await.unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_without_token_is_rejected() {
        let (auth, _, storage) = service(MockTransport::fixed(200, r#"{"user": null}"#));

        let err = auth.sign_in("alice@example.com", "secret").await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert!(!auth.api.session().is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_up_does_not_sign_in() {
        let (auth, transport, _) = service(MockTransport::fixed(201, r#"{"id": 2, "username": "bob"}"#));

        auth.sign_up("bob@example.com", "bob", "secret").await.unwrap();

        assert!(!auth.api.session().is_authenticated());
        assert!(transport.requests()[0].url.ends_with("/auth/register"));
    }

    #[tokio::test]
    async fn test_sign_up_surfaces_server_detail() {
        let (auth, _, _) = service(MockTransport::fixed(400, r#"{"detail": "Email already registered"}"#));

        let err = auth.sign_up("bob@example.com", "bob", "secret").await.unwrap_err();

        assert_eq!(err.user_message(), "Email already registered");
    }

    #[tokio::test]
    async fn test_sign_out() {
        let body = r#"{"access_token": "abc123"}"#;
        let (auth, _, storage) = service(MockTransport::fixed(200, body));
        auth.sign_in("alice@example.com", "secret").await.unwrap();

        auth.sign_out();

        assert!(!auth.api.session().is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }
}
