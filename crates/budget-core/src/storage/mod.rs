//! Durable storage for the session token.
//!
//! This module provides:
//! - `TokenStore`: the single persisted credential slot
//! - `KeyringTokenStore`: OS-level storage via keyring
//! - `FileTokenStore`: `session.json` in the cache directory
//! - `MemoryTokenStore`: in-process slot, gone on exit
//!
//! Only the session store writes to the slot; everything else reads the
//! token through it.

pub mod file;
pub mod keychain;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::debug;

use crate::config::{Config, TokenBackend};

pub use file::FileTokenStore;
pub use keychain::KeyringTokenStore;

pub trait TokenStore: Send + Sync {
    /// Read the persisted token, `None` when the slot is empty
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, token: &str) -> Result<()>;

    /// Empty the slot. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<()>;
}

/// Open the token store selected in the config
pub fn open(config: &Config) -> Result<Arc<dyn TokenStore>> {
    debug!(backend = ?config.token_backend, "Opening token store");
    let store: Arc<dyn TokenStore> = match config.token_backend {
        TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()),
        TokenBackend::File => Arc::new(FileTokenStore::new(config.cache_dir()?)),
        TokenBackend::Memory => Arc::new(MemoryTokenStore::default()),
    };
    Ok(store)
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Token slot lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::default();
        assert_eq!(store.load().unwrap(), None);

        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_open_memory_backend() {
        let config = Config {
            token_backend: TokenBackend::Memory,
            ..Default::default()
        };
        let store = open(&config).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
