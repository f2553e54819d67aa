//! Typed wrappers for the budget API endpoints.
//!
//! Payloads are whatever the server defines; these methods only pick the
//! path and decode into the models in [`crate::models`].

use async_trait::async_trait;
use tracing::debug;

use super::client::ApiClient;
use super::request::RequestDescriptor;
use super::ApiError;
use crate::models::{
    Account, Category, CategoryBalance, CategoryKind, LoginRequest, LoginResponse, NewAccount,
    NewCategory, NewOperation, Operation, OperationDetail, OperationFilter, RegisterRequest, User,
};
use crate::session::ProfileSource;

impl ApiClient {
    // ===== Auth =====

    pub async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value, ApiError> {
        let response = self
            .send(RequestDescriptor::post("/auth/register").json(request)?)
            .await?;
        response.json_or_default()
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.post("/auth/login", request).await
    }

    // ===== Users =====

    pub async fn fetch_profile(&self) -> Result<User, ApiError> {
        self.get("/users/me").await
    }

    // ===== Accounts =====

    pub async fn fetch_accounts(&self) -> Result<Vec<Account>, ApiError> {
        let accounts: Vec<Account> = self.get_list(RequestDescriptor::get("/accounts/")).await?;
        debug!(count = accounts.len(), "Fetched accounts");
        Ok(accounts)
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<Account, ApiError> {
        self.post("/accounts/", account).await
    }

    pub async fn delete_account(&self, id: i64) -> Result<(), ApiError> {
        self.send(RequestDescriptor::delete(format!("/accounts/{}", id)))
            .await?;
        Ok(())
    }

    // ===== Categories =====

    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_list(RequestDescriptor::get("/categories/")).await
    }

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ApiError> {
        self.post("/categories/", category).await
    }

    /// Categories of one kind with the total of their operations
    pub async fn fetch_category_balances(
        &self,
        kind: CategoryKind,
    ) -> Result<Vec<CategoryBalance>, ApiError> {
        self.get_list(
            RequestDescriptor::get("/categories/with-balances").query("category_type", kind),
        )
        .await
    }

    // ===== Operations =====

    pub async fn create_operation(&self, operation: &NewOperation) -> Result<Operation, ApiError> {
        self.post("/operations/", operation).await
    }

    pub async fn fetch_operations(
        &self,
        filter: &OperationFilter,
    ) -> Result<Vec<Operation>, ApiError> {
        let mut request = RequestDescriptor::get("/operations/");
        request.query = filter.to_query();
        self.get_list(request).await
    }

    /// Operations joined with category and account names, for history
    pub async fn fetch_operation_details(&self) -> Result<Vec<OperationDetail>, ApiError> {
        self.get_list(RequestDescriptor::get("/operations/details"))
            .await
    }
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn fetch_profile(&self) -> Result<User, ApiError> {
        ApiClient::fetch_profile(self).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use reqwest::StatusCode;

    use super::*;
    use crate::api::request::{ApiResponse, Method};
    use crate::api::transport::testing::MockTransport;
    use crate::session::SessionStore;
    use crate::storage::{MemoryTokenStore, TokenStore};

    fn client_with(transport: MockTransport) -> (ApiClient, Arc<MockTransport>) {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::default())));
        let transport = Arc::new(transport);
        let client = ApiClient::with_transport("http://127.0.0.1:8000/", transport.clone(), session);
        (client, transport)
    }

    #[tokio::test]
    async fn test_fetch_accounts_tolerates_null_body() {
        let (client, transport) = client_with(MockTransport::fixed(200, "null"));

        let accounts = client.fetch_accounts().await.unwrap();

        assert!(accounts.is_empty());
        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Get);
        assert_eq!(sent.url, "http://127.0.0.1:8000/accounts/");
    }

    #[tokio::test]
    async fn test_category_balances_query() {
        let body = r#"[{"id": 1, "name": "Salary", "type": "income", "total_amount": 1000}]"#;
        let (client, transport) = client_with(MockTransport::fixed(200, body));

        let balances = client
            .fetch_category_balances(CategoryKind::Income)
            .await
            .unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].total_amount, 1000.0);
        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "http://127.0.0.1:8000/categories/with-balances");
        assert_eq!(
            sent.query,
            vec![("category_type".to_string(), "income".to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_account_path() {
        let (client, transport) = client_with(MockTransport::fixed(204, ""));

        client.delete_account(42).await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Delete);
        assert_eq!(sent.url, "http://127.0.0.1:8000/accounts/42");
    }

    #[tokio::test]
    async fn test_delete_missing_account() {
        let (client, _) = client_with(MockTransport::fixed(404, r#"{"detail":"Account not found"}"#));

        let err = client.delete_account(42).await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Account not found"));
    }

    #[tokio::test]
    async fn test_create_operation_body() {
        let (client, transport) = client_with(MockTransport::new(|req| {
            let mut echoed = req.body.clone().unwrap();
            echoed["id"] = serde_json::json!(77);
            Ok(ApiResponse::new(StatusCode::OK, echoed.to_string()))
        }));

        let new = NewOperation {
            account_id: 1,
            category_id: 2,
            amount: 150.0,
            description: "Food operation".into(),
            operation_date: Utc::now(),
        };
        let created = client.create_operation(&new).await.unwrap();

        assert_eq!(created.id, 77);
        assert_eq!(created.amount, 150.0);
        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "http://127.0.0.1:8000/operations/");
        assert_eq!(sent.body.as_ref().unwrap()["category_id"], 2);
    }

    #[tokio::test]
    async fn test_fetch_operations_sends_filter() {
        let (client, transport) = client_with(MockTransport::fixed(200, "[]"));

        let filter = OperationFilter {
            account_id: Some(9),
            ..Default::default()
        };
        client.fetch_operations(&filter).await.unwrap();

        assert_eq!(
            transport.requests()[0].query,
            vec![("account_id".to_string(), "9".to_string())]
        );
    }

    #[tokio::test]
    async fn test_initialize_through_pipeline() {
        let storage = Arc::new(MemoryTokenStore::with_token("abc123"));
        let session = Arc::new(SessionStore::new(storage.clone()));
        let transport = Arc::new(MockTransport::new(|req| {
            assert_eq!(req.bearer_token(), Some("abc123"));
            assert!(req.url.ends_with("/users/me"));
            Ok(ApiResponse::new(
                StatusCode::OK,
                r#"{"id": 1, "username": "alice"}"#,
            ))
        }));
        let client = ApiClient::with_transport("http://127.0.0.1:8000/", transport, session.clone());

        let state = session.initialize(&client).await;

        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        let user = state.user.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_initialize_with_expired_token_through_pipeline() {
        let storage = Arc::new(MemoryTokenStore::with_token("expired"));
        let session = Arc::new(SessionStore::new(storage.clone()));
        let transport = Arc::new(MockTransport::fixed(401, ""));
        let client = ApiClient::with_transport("http://127.0.0.1:8000/", transport, session.clone());

        let state = session.initialize(&client).await;

        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(storage.load().unwrap(), None);
    }
}
