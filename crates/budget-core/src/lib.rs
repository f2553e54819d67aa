//! Client library for the budget app.
//!
//! The core is the session store and the request pipeline:
//!
//! - [`session::SessionStore`] knows whether, and as whom, the user is
//!   signed in, persists the token through a [`storage::TokenStore`], and
//!   validates a persisted token once at startup.
//! - [`api::ApiClient`] sends every request with the current bearer token
//!   and signs the session out on a 401, notifying whoever owns navigation.
//!
//! Around it sit typed endpoint wrappers, models, input validation, the
//! home-screen bootstrap and display helpers.

pub mod api;
pub mod auth;
pub mod budget;
pub mod config;
pub mod models;
pub mod session;
pub mod storage;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError, SessionInvalidated};
pub use auth::AuthService;
pub use config::Config;
pub use session::{SessionState, SessionStore};
