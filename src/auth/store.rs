//! Two-tier session storage. The durable tier lives under the user's config
//! directory and survives reboots; the session-scoped tier lives under the
//! runtime (or temp) directory and is the native analog of tab-scoped
//! storage. The store is the single owner of the persisted session; callers
//! re-read it instead of caching copies.

use crate::auth::{error::AuthError, session::Session};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One canonical storage document per tier.
const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug)]
pub struct SessionStore {
    durable_dir: PathBuf,
    scoped_dir: PathBuf,
}

impl SessionStore {
    /// Resolve the default tier locations for the current user.
    ///
    /// # Errors
    /// Returns `AuthError::Config` when no config directory can be resolved.
    pub fn from_env() -> Result<Self, AuthError> {
        let durable_dir = dirs::config_dir()
            .ok_or_else(|| AuthError::Config("no config directory for this user".to_string()))?
            .join(env!("CARGO_PKG_NAME"));

        let scoped_dir = dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(env!("CARGO_PKG_NAME"));

        Ok(Self {
            durable_dir,
            scoped_dir,
        })
    }

    /// Build a store over explicit tier roots.
    #[must_use]
    pub fn with_roots(durable_dir: impl Into<PathBuf>, scoped_dir: impl Into<PathBuf>) -> Self {
        Self {
            durable_dir: durable_dir.into(),
            scoped_dir: scoped_dir.into(),
        }
    }

    /// Directory backing the session-scoped tier. Per-attempt state such as
    /// the pending nonce lives here too.
    #[must_use]
    pub fn scoped_dir(&self) -> &Path {
        &self.scoped_dir
    }

    /// Write the session to both tiers.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` when neither tier could be written; a
    /// single-tier failure is tolerated and logged.
    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        let payload = serde_json::to_vec_pretty(session)
            .map_err(|err| AuthError::Storage(format!("failed to encode session: {err}")))?;

        let durable = write_tier(&self.durable_dir, &payload);
        let scoped = write_tier(&self.scoped_dir, &payload);

        match (durable, scoped) {
            (Err(durable_err), Err(scoped_err)) => Err(AuthError::Storage(format!(
                "failed to write session: {durable_err}; {scoped_err}"
            ))),
            (Err(err), Ok(())) | (Ok(()), Err(err)) => {
                debug!("session written to one tier only: {err}");
                Ok(())
            }
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    /// Read the session, preferring the durable tier. An unreadable or
    /// corrupt tier counts as absent.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        read_tier(&self.durable_dir).or_else(|| read_tier(&self.scoped_dir))
    }

    /// Remove the session from both tiers. Local clearing always succeeds;
    /// failures are logged and ignored.
    pub fn clear(&self) {
        for dir in [&self.durable_dir, &self.scoped_dir] {
            let path = dir.join(SESSION_FILE);
            match fs::remove_file(&path) {
                Ok(()) => debug!("removed {}", path.display()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => debug!("failed to remove {}: {err}", path.display()),
            }
        }
    }
}

fn write_tier(dir: &Path, payload: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SESSION_FILE);
    fs::write(&path, payload)?;
    restrict_permissions(&path)?;
    Ok(())
}

fn read_tier(dir: &Path) -> Option<Session> {
    let path = dir.join(SESSION_FILE);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                debug!("failed to read {}: {err}", path.display());
            }
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(session) => Some(session),
        Err(err) => {
            debug!("ignoring corrupt session at {}: {err}", path.display());
            None
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
