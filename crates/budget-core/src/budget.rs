//! Home screen data: first-run defaults and the balance summary.

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{CategoryBalance, CategoryKind, NewAccount, NewCategory};
use crate::validation::{DEFAULT_CATEGORY_COLOR, DEFAULT_CURRENCY};

/// Name of the account created for users who have none
pub const DEFAULT_ACCOUNT_NAME: &str = "Main account";
const DEFAULT_ACCOUNT_ICON: &str = "💳";

/// (name, icon) pairs created for users with no categories at all
pub const DEFAULT_EXPENSE_CATEGORIES: &[(&str, &str)] = &[
    ("Food", "🍔"),
    ("Transport", "🚌"),
    ("Home", "🏠"),
    ("Health", "💊"),
    ("Entertainment", "🎬"),
    ("Shopping", "🛍️"),
];

pub const DEFAULT_INCOME_CATEGORIES: &[(&str, &str)] = &[
    ("Salary", "💰"),
    ("Gifts", "🎁"),
    ("Other", "💵"),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub expense_total: f64,
    pub income_total: f64,
    pub balance: f64,
    pub expense_categories: Vec<CategoryBalance>,
    pub income_categories: Vec<CategoryBalance>,
}

impl Summary {
    fn from_balances(expenses: Vec<CategoryBalance>, income: Vec<CategoryBalance>) -> Self {
        let expense_total: f64 = expenses.iter().map(|c| c.total_amount).sum();
        let income_total: f64 = income.iter().map(|c| c.total_amount).sum();
        Self {
            expense_total,
            income_total,
            balance: income_total - expense_total,
            expense_categories: expenses,
            income_categories: income,
        }
    }

    pub fn categories(&self, kind: CategoryKind) -> &[CategoryBalance] {
        match kind {
            CategoryKind::Expense => &self.expense_categories,
            CategoryKind::Income => &self.income_categories,
        }
    }
}

/// Create the default account if the user has none. Returns whether one
/// was created.
pub async fn ensure_default_account(api: &ApiClient) -> Result<bool, ApiError> {
    let accounts = api.fetch_accounts().await?;
    if !accounts.is_empty() {
        return Ok(false);
    }
    api.create_account(&NewAccount {
        name: DEFAULT_ACCOUNT_NAME.to_string(),
        currency: DEFAULT_CURRENCY.to_string(),
        icon: DEFAULT_ACCOUNT_ICON.to_string(),
        balance: Some(0.0),
    })
    .await?;
    info!("Created default account");
    Ok(true)
}

/// Create the default categories, but only when the user has no
/// categories of either kind. Returns how many were created.
pub async fn ensure_default_categories(api: &ApiClient) -> Result<usize, ApiError> {
    let existing = api.fetch_categories().await?;
    if !existing.is_empty() {
        debug!(count = existing.len(), "Categories exist, skipping defaults");
        return Ok(0);
    }

    let defaults = DEFAULT_EXPENSE_CATEGORIES
        .iter()
        .map(|entry| (CategoryKind::Expense, entry))
        .chain(
            DEFAULT_INCOME_CATEGORIES
                .iter()
                .map(|entry| (CategoryKind::Income, entry)),
        );

    let mut created = 0;
    for (kind, (name, icon)) in defaults {
        api.create_category(&NewCategory {
            name: name.to_string(),
            kind,
            icon: icon.to_string(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
        })
        .await?;
        created += 1;
    }
    info!(created, "Created default categories");
    Ok(created)
}

/// First-run setup for the home screen. Each step's failure is logged and
/// does not stop the next one.
pub async fn bootstrap(api: &ApiClient) {
    if let Err(e) = ensure_default_account(api).await {
        warn!(error = %e, "Failed to ensure default account");
    }
    if let Err(e) = ensure_default_categories(api).await {
        warn!(error = %e, "Failed to create default categories");
    }
}

/// Expense and income totals, fetched concurrently
pub async fn summary(api: &ApiClient) -> Result<Summary, ApiError> {
    let (expenses, income) = futures::try_join!(
        api.fetch_category_balances(CategoryKind::Expense),
        api.fetch_category_balances(CategoryKind::Income),
    )?;
    Ok(Summary::from_balances(expenses, income))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;

    use super::*;
    use crate::api::request::{ApiResponse, Method};
    use crate::api::transport::testing::MockTransport;
    use crate::session::SessionStore;
    use crate::storage::MemoryTokenStore;

    fn client_with(transport: MockTransport) -> (ApiClient, Arc<MockTransport>) {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::default())));
        let transport = Arc::new(transport);
        let client = ApiClient::with_transport("http://127.0.0.1:8000/", transport.clone(), session);
        (client, transport)
    }

    fn ok(body: &str) -> Result<ApiResponse, ApiError> {
        Ok(ApiResponse::new(StatusCode::OK, body))
    }

    #[tokio::test]
    async fn test_default_categories_created_when_none_exist() {
        let (client, transport) = client_with(MockTransport::new(|req| match req.method {
            Method::Get => ok("[]"),
            _ => {
                let mut created = req.body.clone().unwrap();
                created["id"] = serde_json::json!(1);
                ok(&created.to_string())
            }
        }));

        let created = ensure_default_categories(&client).await.unwrap();

        let total = DEFAULT_EXPENSE_CATEGORIES.len() + DEFAULT_INCOME_CATEGORIES.len();
        assert_eq!(created, total);
        let posts: Vec<_> = transport
            .requests()
            .into_iter()
            .filter(|r| r.method == Method::Post)
            .collect();
        assert_eq!(posts.len(), total);
        assert_eq!(posts[0].body.as_ref().unwrap()["type"], "expense");
        assert_eq!(posts[total - 1].body.as_ref().unwrap()["type"], "income");
    }

    #[tokio::test]
    async fn test_default_categories_skipped_when_any_exist() {
        let body = r#"[{"id": 1, "name": "Salary", "type": "income"}]"#;
        let (client, transport) = client_with(MockTransport::fixed(200, body));

        assert_eq!(ensure_default_categories(&client).await.unwrap(), 0);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_default_account_created_once() {
        let (client, transport) = client_with(MockTransport::new(|req| match req.method {
            Method::Get => ok("[]"),
            _ => ok(r#"{"id": 1, "name": "Main account", "currency": "KGS", "balance": 0}"#),
        }));

        assert!(ensure_default_account(&client).await.unwrap());
        let post = &transport.requests()[1];
        assert_eq!(post.body.as_ref().unwrap()["name"], DEFAULT_ACCOUNT_NAME);
        assert_eq!(post.body.as_ref().unwrap()["balance"], 0.0);
    }

    #[tokio::test]
    async fn test_bootstrap_continues_after_failure() {
        let (client, transport) = client_with(MockTransport::new(|req| {
            if req.url.contains("/accounts/") {
                Ok(ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, ""))
            } else {
                ok(r#"[{"id": 1, "name": "Food", "type": "expense"}]"#)
            }
        }));

        bootstrap(&client).await;

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert!(urls.iter().any(|u| u.ends_with("/categories/")));
    }

    #[tokio::test]
    async fn test_summary_totals() {
        let (client, _) = client_with(MockTransport::new(|req| {
            let kind = &req.query[0].1;
            if kind == "expense" {
                ok(r#"[{"id": 1, "name": "Food", "type": "expense", "total_amount": 300},
                       {"id": 2, "name": "Home", "type": "expense", "total_amount": 200.5}]"#)
            } else {
                ok(r#"[{"id": 3, "name": "Salary", "type": "income", "total_amount": 1000}]"#)
            }
        }));

        let summary = summary(&client).await.unwrap();

        assert_eq!(summary.expense_total, 500.5);
        assert_eq!(summary.income_total, 1000.0);
        assert_eq!(summary.balance, 499.5);
        assert_eq!(summary.categories(CategoryKind::Expense).len(), 2);
    }

    #[tokio::test]
    async fn test_summary_propagates_errors() {
        let (client, _) = client_with(MockTransport::fixed(503, "maintenance"));

        assert!(matches!(
            summary(&client).await,
            Err(ApiError::ServerError(_))
        ));
    }
}
