//! Input checks run before anything is sent to the server.
//!
//! Each builder returns the request payload or `ApiError::Validation`
//! with a message fit for the user.

use chrono::{DateTime, Utc};

use crate::api::ApiError;
use crate::models::{
    Category, CategoryKind, LoginRequest, NewAccount, NewCategory, NewOperation, RegisterRequest,
};

/// Currency assigned to new accounts unless one is given
pub const DEFAULT_CURRENCY: &str = "KGS";

/// Color assigned to new categories unless one is given
pub const DEFAULT_CATEGORY_COLOR: &str = "#FF9500";

fn required(value: &str, message: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::Validation(message.to_string()))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn login_request(email: &str, password: &str) -> Result<LoginRequest, ApiError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Fill in all fields".into()));
    }
    Ok(LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}

pub fn register_request(
    email: &str,
    username: &str,
    password: &str,
) -> Result<RegisterRequest, ApiError> {
    let login = login_request(email, password)?;
    let username = required(username, "Enter a username")?;
    Ok(RegisterRequest {
        email: login.email,
        username,
        password: login.password,
    })
}

pub fn new_account(
    name: &str,
    icon: &str,
    currency: Option<&str>,
) -> Result<NewAccount, ApiError> {
    let name = required(name, "Fill in all required fields")?;
    let icon = required(icon, "Fill in all required fields")?;
    let currency = currency
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_uppercase();
    Ok(NewAccount {
        name,
        currency,
        icon,
        balance: None,
    })
}

pub fn new_category(
    name: &str,
    kind: CategoryKind,
    icon: &str,
    color: Option<&str>,
) -> Result<NewCategory, ApiError> {
    let name = required(name, "Fill in all fields")?;
    let icon = required(icon, "Fill in all fields")?;
    Ok(NewCategory {
        name,
        kind,
        icon,
        color: color.unwrap_or(DEFAULT_CATEGORY_COLOR).to_string(),
    })
}

/// Parse an amount typed by the user. A comma is accepted as the decimal
/// separator.
pub fn parse_amount(input: &str) -> Result<f64, ApiError> {
    let normalized = input.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|_| ApiError::Validation(format!("'{}' is not a number", input.trim())))
}

pub fn new_operation(
    account_id: Option<i64>,
    category: &Category,
    amount: f64,
    at: DateTime<Utc>,
) -> Result<NewOperation, ApiError> {
    let account_id =
        account_id.ok_or_else(|| ApiError::Validation("Account not found".into()))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::Validation("Enter an amount".into()));
    }
    Ok(NewOperation {
        account_id,
        category_id: category.id,
        amount,
        description: format!("{} operation", category.name),
        operation_date: at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food() -> Category {
        Category {
            id: 3,
            name: "Food".into(),
            kind: CategoryKind::Expense,
            icon: "🍔".into(),
            color: None,
        }
    }

    #[test]
    fn test_login_requires_email_and_password() {
        assert!(matches!(login_request("", "secret"), Err(ApiError::Validation(_))));
        assert!(matches!(login_request("a@b.c", ""), Err(ApiError::Validation(_))));
        let req = login_request("  a@b.c ", "secret").unwrap();
        assert_eq!(req.email, "a@b.c");
    }

    #[test]
    fn test_register_requires_username() {
        let err = register_request("a@b.c", "  ", "secret").unwrap_err();
        assert_eq!(err.user_message(), "Enter a username");
        assert!(register_request("a@b.c", "alice", "secret").is_ok());
    }

    #[test]
    fn test_new_account_defaults_currency() {
        let account = new_account("Cash", "💵", None).unwrap();
        assert_eq!(account.currency, "KGS");
        assert_eq!(new_account("Card", "💳", Some("usd")).unwrap().currency, "USD");
        assert!(new_account("Cash", "", None).is_err());
    }

    #[test]
    fn test_new_category_defaults_color() {
        let category = new_category("Gifts", CategoryKind::Income, "🎁", None).unwrap();
        assert_eq!(category.color, "#FF9500");
        assert!(new_category("", CategoryKind::Income, "🎁", None).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50").unwrap(), 12.5);
        assert_eq!(parse_amount(" 7,25 ").unwrap(), 7.25);
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn test_new_operation_checks() {
        let now = Utc::now();
        assert!(matches!(
            new_operation(None, &food(), 10.0, now),
            Err(ApiError::Validation(ref m)) if m == "Account not found"
        ));
        assert!(new_operation(Some(1), &food(), 0.0, now).is_err());
        assert!(new_operation(Some(1), &food(), -5.0, now).is_err());
        assert!(new_operation(Some(1), &food(), f64::NAN, now).is_err());

        let op = new_operation(Some(1), &food(), 99.9, now).unwrap();
        assert_eq!(op.description, "Food operation");
        assert_eq!(op.category_id, 3);
        assert_eq!(op.operation_date, now);
    }
}
