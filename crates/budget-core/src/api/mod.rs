//! REST API client module for the budget server.
//!
//! This module provides the `ApiClient` request pipeline and typed
//! wrappers for the auth, user, account, category and operation
//! endpoints.
//!
//! The API uses bearer token authentication; the token comes from the
//! `SessionStore` and is attached to every request while present.

pub mod client;
mod endpoints;
pub mod error;
pub mod request;
pub mod transport;

pub use client::{ApiClient, InvalidationHook, SessionInvalidated, LOGIN_ROUTE};
pub use error::ApiError;
pub use request::{ApiResponse, Method, PreparedRequest, RequestDescriptor};
pub use transport::{ReqwestTransport, Transport};
