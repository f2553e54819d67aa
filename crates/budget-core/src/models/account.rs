use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub balance: f64,
}

impl Account {
    pub fn label(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }
}

/// Payload for creating an account. Build through
/// [`crate::validation::new_account`] so required fields are checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub currency: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}
