use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Expense,
    Income,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Expense => "expense",
            CategoryKind::Income => "income",
        }
    }

    /// Sign prefix used when displaying amounts of this kind
    pub fn sign(&self) -> char {
        match self {
            CategoryKind::Expense => '-',
            CategoryKind::Income => '+',
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" => Ok(CategoryKind::Expense),
            "income" => Ok(CategoryKind::Income),
            other => Err(format!("unknown category type '{}' (expected expense or income)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A category together with the sum of its operations, as returned by
/// `/categories/with-balances`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBalance {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default)]
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub icon: String,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_kind_from_str() {
        assert_eq!("expense".parse::<CategoryKind>(), Ok(CategoryKind::Expense));
        assert_eq!(" Income ".parse::<CategoryKind>(), Ok(CategoryKind::Income));
        assert!("transfer".parse::<CategoryKind>().is_err());
    }

    #[test]
    fn test_parse_category_balance() {
        let json = r##"{"id": 4, "name": "Food", "type": "expense", "icon": "🍔", "color": "#FF9500", "total_amount": 125.5}"##;
        let balance: CategoryBalance = serde_json::from_str(json).expect("Failed to parse balance");
        assert_eq!(balance.category.name, "Food");
        assert_eq!(balance.category.kind, CategoryKind::Expense);
        assert_eq!(balance.total_amount, 125.5);
    }

    #[test]
    fn test_new_category_serializes_type_field() {
        let new = NewCategory {
            name: "Salary".into(),
            kind: CategoryKind::Income,
            icon: "💰".into(),
            color: "#FF9500".into(),
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["type"], "income");
        assert!(value.get("kind").is_none());
    }
}
