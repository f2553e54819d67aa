use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CategoryKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: i64,
    pub account_id: i64,
    pub category_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub operation_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Operation joined with its category and account, as returned by
/// `/operations/details` for the history view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDetail {
    pub id: i64,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_icon: Option<String>,
    #[serde(default)]
    pub category_type: Option<CategoryKind>,
    #[serde(default)]
    pub account_name: Option<String>,
}

impl OperationDetail {
    pub fn is_income(&self) -> bool {
        self.category_type == Some(CategoryKind::Income)
    }
}

/// Payload for recording an operation. Build through
/// [`crate::validation::new_operation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOperation {
    pub account_id: i64,
    pub category_id: i64,
    pub amount: f64,
    pub description: String,
    pub operation_date: DateTime<Utc>,
}

/// Query parameters accepted by `GET /operations/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationFilter {
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl OperationFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(id) = self.account_id {
            query.push(("account_id".to_string(), id.to_string()));
        }
        if let Some(id) = self.category_id {
            query.push(("category_id".to_string(), id.to_string()));
        }
        if let Some(skip) = self.skip {
            query.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}
