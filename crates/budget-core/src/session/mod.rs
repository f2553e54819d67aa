//! Session management: who is signed in, and with which token.
//!
//! `SessionStore` is the single authority for the session. It owns the
//! durable token slot, validates a persisted token once at startup, and
//! broadcasts every change through a `tokio::sync::watch` channel so a UI
//! root can hold protected views until the startup check finishes.

pub mod state;
pub mod store;

pub use state::{Credential, SessionState};
pub use store::{Invalidation, ProfileSource, SessionStore};
