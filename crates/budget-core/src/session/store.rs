use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::{Credential, SessionState};
use crate::api::ApiError;
use crate::models::User;
use crate::storage::TokenStore;

/// Fetches the profile of whoever the current token belongs to.
/// Used once at startup to validate a persisted token.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self) -> Result<User, ApiError>;
}

/// Outcome of [`SessionStore::invalidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// The session was signed in and has been cleared
    Cleared,
    /// Nothing was signed in
    AlreadyCleared,
    /// A newer login replaced the rejected credential; left untouched
    Superseded,
}

pub struct SessionStore {
    storage: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    initialized: AtomicBool,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            storage,
            state,
            initialized: AtomicBool::new(false),
        }
    }

    /// Validate any persisted token against the profile endpoint.
    ///
    /// Runs once per store; later calls only return the current snapshot.
    /// Every failure, including network errors, degrades to signed-out and
    /// purges the persisted token. Always ends with `is_loading == false`.
    pub async fn initialize<P>(&self, profiles: &P) -> SessionState
    where
        P: ProfileSource + ?Sized,
    {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!("Session already initialized");
            return self.snapshot();
        }

        let stored = match self.storage.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, starting signed out");
                None
            }
        };

        let Some(token) = stored else {
            debug!("No stored token");
            self.state.send_modify(|s| s.is_loading = false);
            return self.snapshot();
        };

        let mut generation = 0;
        self.state.send_modify(|s| {
            s.token = Some(token);
            s.generation += 1;
            generation = s.generation;
        });

        // A login or logout while the check was in flight wins
        match profiles.fetch_profile().await {
            Ok(user) => {
                let user_id = user.id;
                let mut current = false;
                self.state.send_modify(|s| {
                    current = s.generation == generation;
                    if current {
                        s.user = Some(user);
                        s.is_authenticated = true;
                    }
                    s.is_loading = false;
                });
                if current {
                    info!(user_id, "Stored session validated");
                } else {
                    debug!("Stored session check superseded");
                }
            }
            Err(e) => {
                let mut current = false;
                self.state.send_modify(|s| {
                    current = s.generation == generation;
                    if current && s.is_signed_in() {
                        s.reset();
                    }
                    s.is_loading = false;
                });
                if current {
                    info!(error = %e, "Stored session rejected, signing out");
                    self.clear_storage();
                } else {
                    debug!(error = %e, "Stored session check superseded");
                }
            }
        }

        self.snapshot()
    }

    /// Record a token the caller already obtained from the login endpoint.
    pub fn login(&self, token: String, user: Option<User>) {
        if let Err(e) = self.storage.save(&token) {
            warn!(error = %e, "Failed to persist token");
        }
        self.state.send_modify(|s| {
            s.token = Some(token);
            s.user = user;
            s.is_authenticated = true;
            s.generation += 1;
        });
        info!("Signed in");
    }

    /// Clear the session and the persisted token. Idempotent.
    pub fn logout(&self) {
        self.clear_storage();
        let changed = self.state.send_if_modified(|s| {
            if s.is_signed_in() {
                s.reset();
                true
            } else {
                false
            }
        });
        if changed {
            info!("Signed out");
        }
    }

    /// Sign out in response to the server rejecting a credential read at
    /// `generation`. A session established after that read is kept.
    pub fn invalidate(&self, generation: u64) -> Invalidation {
        let mut outcome = Invalidation::AlreadyCleared;
        self.state.send_if_modified(|s| {
            if s.generation != generation && s.token.is_some() {
                outcome = Invalidation::Superseded;
                return false;
            }
            if s.is_signed_in() {
                s.reset();
                outcome = Invalidation::Cleared;
                true
            } else {
                false
            }
        });

        if outcome != Invalidation::Superseded {
            self.clear_storage();
        }
        debug!(?outcome, "Session invalidated");
        outcome
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn credential(&self) -> Credential {
        let state = self.state.borrow();
        Credential {
            token: state.token.clone(),
            generation: state.generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every subsequent session change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve once the startup check has finished.
    pub async fn wait_until_ready(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let ready = rx.wait_for(|s| !s.is_loading).await.map(|s| s.clone());
        // The sender lives in `self`, so the channel cannot close here
        ready.unwrap_or_else(|_| self.snapshot())
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
    }
}
