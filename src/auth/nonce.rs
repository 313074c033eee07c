//! Per-attempt state nonce for the redirect flow. The nonce binds an
//! authorization request to its callback: it is generated before navigation,
//! kept in the session-scoped tier, and consumed on the first verification.

use crate::auth::error::AuthError;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixed key for the pending nonce, one per attempt.
const STATE_FILE: &str = "oauth_state";

#[derive(Clone, Debug)]
pub struct StateNonce {
    path: PathBuf,
}

impl StateNonce {
    /// Guard keyed into the given session-scoped directory.
    #[must_use]
    pub fn new(scoped_dir: impl AsRef<Path>) -> Self {
        Self {
            path: scoped_dir.as_ref().join(STATE_FILE),
        }
    }

    /// Generate a fresh random state, replacing any pending one.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` when the nonce cannot be written.
    pub fn generate(&self) -> Result<String, AuthError> {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let state = Base64UrlUnpadded::encode_string(&bytes);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| AuthError::Storage(format!("failed to prepare nonce dir: {err}")))?;
        }
        fs::write(&self.path, &state)
            .map_err(|err| AuthError::Storage(format!("failed to write nonce: {err}")))?;

        Ok(state)
    }

    /// Check the returned state against the pending nonce and consume it.
    /// Fails when no nonce is pending or the values differ; both cases abort
    /// the attempt before any exchange.
    ///
    /// # Errors
    /// Returns `AuthError::StateMismatch` on a missing or foreign state.
    pub fn verify(&self, returned_state: &str) -> Result<(), AuthError> {
        let stored = fs::read_to_string(&self.path).map_err(|err| {
            debug!("no pending state nonce: {err}");
            AuthError::StateMismatch
        })?;

        if stored != returned_state {
            return Err(AuthError::StateMismatch);
        }

        // Single use: a verified nonce can never match again.
        if let Err(err) = fs::remove_file(&self.path) {
            debug!("failed to remove consumed nonce: {err}");
        }

        Ok(())
    }
}
