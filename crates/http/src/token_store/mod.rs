//! Persistent holder of the current access/refresh token pair
//!
//! The store reads and writes both tokens as one unit and announces every
//! mutation through a [`ChangeNotifier`], so anything displaying the signed-in
//! state can follow along without polling.

mod backend;
mod notifier;

pub use backend::{FileBackend, MemoryBackend, TokenBackend};
pub use notifier::{AuthChange, BroadcastNotifier, ChangeNotifier};

use crate::types::TokenPair;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Storage key of the access token
pub const ACCESS_KEY: &str = "mb_access_token";

/// Storage key of the refresh token
pub const REFRESH_KEY: &str = "mb_refresh_token";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token storage lock poisoned")]
    Poisoned,
}

/// Token pair storage with change notifications
///
/// All operations are synchronous. With a [`FileBackend`] they block on disk
/// I/O (read, fsync, rename); async callers on a busy runtime should run them
/// through `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn TokenBackend>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl TokenStore {
    pub fn new(
        backend: impl TokenBackend + 'static,
        notifier: impl ChangeNotifier + 'static,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            notifier: Arc::new(notifier),
        }
    }

    /// Ephemeral store; nothing outlives the process
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), BroadcastNotifier::new())
    }

    /// File-backed store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(path), BroadcastNotifier::new())
    }

    /// Current token pair, or `None` if never written or cleared
    pub fn read(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        let mut values = self.backend.get_all(&[ACCESS_KEY, REFRESH_KEY])?.into_iter();
        let access = values.next().flatten();
        let refresh = values.next().flatten();

        match (access, refresh) {
            (Some(access), Some(refresh)) => Ok(Some(TokenPair { access, refresh })),
            (None, None) => Ok(None),
            _ => {
                warn!("Token storage holds only one of the two tokens; treating as signed out");
                Ok(None)
            }
        }
    }

    /// Persist both tokens, then notify
    pub fn write(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        self.backend.put_all(&[
            (ACCESS_KEY, pair.access.as_str()),
            (REFRESH_KEY, pair.refresh.as_str()),
        ])?;
        debug!("Stored token pair");
        self.notifier.notify(AuthChange::Updated);
        Ok(())
    }

    /// Remove both tokens, then notify
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        self.backend.remove_all(&[ACCESS_KEY, REFRESH_KEY])?;
        debug!("Cleared token pair");
        self.notifier.notify(AuthChange::Cleared);
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool, TokenStoreError> {
        Ok(self.read()?.is_some())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
