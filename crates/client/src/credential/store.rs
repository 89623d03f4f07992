// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token store: the current access/refresh pair, in memory with optional
//! file persistence.

use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::credential::persist::{self, PersistedTokens};
use crate::credential::TokenPair;

/// Holder of the current credentials.
///
/// Reads and writes are short synchronous critical sections; the lock is
/// never held across an `.await`. Persistence failures are logged and do not
/// affect the in-memory state.
pub struct TokenStore {
    tokens: RwLock<Option<TokenPair>>,
    path: Option<PathBuf>,
    /// Orders memory updates with their file writes, so the file always
    /// holds the last pair written to memory.
    persist_lock: Mutex<()>,
}

impl TokenStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self { tokens: RwLock::new(None), path: None, persist_lock: Mutex::new(()) }
    }

    /// A store backed by `path`, seeded from it when the file exists.
    pub fn with_file(path: PathBuf) -> anyhow::Result<Self> {
        let tokens = persist::load(&path)?.map(PersistedTokens::into_pair);
        if tokens.is_some() {
            tracing::debug!(path = %path.display(), "loaded persisted tokens");
        }
        Ok(Self { tokens: RwLock::new(tokens), path: Some(path), persist_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().as_ref().map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.read().as_ref().and_then(|t| t.refresh_token.clone())
    }

    pub fn get(&self) -> Option<TokenPair> {
        self.tokens.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.read().is_some()
    }

    /// Replace the stored pair.
    ///
    /// A pair without a refresh token keeps the previous refresh token, so a
    /// backend that only rotates the access token does not end the session.
    pub fn replace(&self, pair: TokenPair) {
        let _persist = self.persist_lock.lock();
        let stored = {
            let mut tokens = self.tokens.write();
            let refresh_token = pair
                .refresh_token
                .or_else(|| tokens.as_ref().and_then(|t| t.refresh_token.clone()));
            let stored = TokenPair::new(pair.access_token, refresh_token);
            *tokens = Some(stored.clone());
            stored
        };
        if let Some(ref path) = self.path {
            if let Err(e) = persist::save(path, &PersistedTokens::from_pair(&stored)) {
                tracing::warn!(path = %path.display(), err = %e, "failed to persist tokens");
            }
        }
    }

    /// Drop all credentials, in memory and on disk.
    pub fn clear(&self) {
        let _persist = self.persist_lock.lock();
        *self.tokens.write() = None;
        if let Some(ref path) = self.path {
            if let Err(e) = persist::remove(path) {
                tracing::warn!(path = %path.display(), err = %e, "failed to remove token file");
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
