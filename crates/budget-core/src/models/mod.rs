//! Data models for budget entities.
//!
//! This module contains the records exchanged with the budget API:
//!
//! - `User`: the signed-in profile
//! - `Account`, `NewAccount`: money accounts
//! - `Category`, `CategoryBalance`, `CategoryKind`: expense/income categories
//! - `Operation`, `OperationDetail`, `NewOperation`: recorded transactions
//! - `LoginRequest`, `LoginResponse`, `RegisterRequest`: auth payloads
//!
//! The server owns the schemas; unknown fields are ignored and missing
//! optional fields fall back to defaults.

pub mod account;
pub mod category;
pub mod operation;
pub mod user;

pub use account::{Account, NewAccount};
pub use category::{Category, CategoryBalance, CategoryKind, NewCategory};
pub use operation::{NewOperation, Operation, OperationDetail, OperationFilter};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, User};
