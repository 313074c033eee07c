//! Token strategy: collect a provider-signed identity token directly, the
//! way the hosted sign-in prompt hands one to a page. The provider client is
//! initialized at most once per strategy instance; a second acquisition
//! reuses it.

use crate::auth::{acquirer::AuthCredential, error::AuthError};
use crate::APP_USER_AGENT;
use std::io::{BufRead, Write};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

/// The identity-services client script; reaching it is the readiness probe
/// for this strategy.
pub const PROVIDER_CLIENT_URL: &str = "https://accounts.google.com/gsi/client";

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Seam for collecting the identity token from the user. `Ok(None)` means the
/// prompt was dismissed.
pub trait IdentityPrompt: Send + Sync {
    /// # Errors
    /// Returns an error when the prompt cannot be read at all.
    fn read_token(&self) -> std::io::Result<Option<String>>;
}

/// Reads the token from the terminal.
pub struct TerminalPrompt;

impl IdentityPrompt for TerminalPrompt {
    fn read_token(&self) -> std::io::Result<Option<String>> {
        let mut stdout = std::io::stdout();
        writeln!(stdout, "Paste the identity token issued by the provider.")?;
        write!(stdout, "Token (empty to cancel): ")?;
        stdout.flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }

        let token = line.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }
}

pub struct TokenStrategy {
    probe_url: String,
    client: reqwest::Client,
    loaded: OnceCell<()>,
}

impl TokenStrategy {
    /// # Errors
    /// Returns `AuthError::Config` when the HTTP client cannot be built.
    pub fn new(probe_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|err| AuthError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            probe_url: probe_url.into(),
            client,
            loaded: OnceCell::new(),
        })
    }

    /// Initialize the provider client at most once. Repeat calls are no-ops;
    /// a failed init leaves the strategy uninitialized so the caller can
    /// fall back.
    ///
    /// # Errors
    /// Returns `AuthError::ProviderUnavailable` when the probe fails.
    async fn ensure_loaded(&self) -> Result<(), AuthError> {
        self.loaded
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get(&self.probe_url)
                    .send()
                    .await
                    .map_err(|err| AuthError::ProviderUnavailable(err.to_string()))?;

                if !response.status().is_success() {
                    return Err(AuthError::ProviderUnavailable(format!(
                        "provider client answered {}",
                        response.status()
                    )));
                }

                debug!("provider client ready");
                Ok(())
            })
            .await
            .map(|_| ())
    }

    /// Acquire an identity token through the prompt.
    ///
    /// # Errors
    /// `ProviderUnavailable` when the provider client cannot be reached,
    /// `UserCancelled` when the prompt is dismissed, `Config` when the
    /// prompt itself cannot be read.
    pub async fn acquire(&self, prompt: &dyn IdentityPrompt) -> Result<AuthCredential, AuthError> {
        self.ensure_loaded().await?;

        match prompt.read_token() {
            Ok(Some(token)) => Ok(AuthCredential::IdentityToken(token)),
            Ok(None) => Err(AuthError::UserCancelled),
            Err(err) => Err(AuthError::Config(format!("failed to read prompt: {err}"))),
        }
    }
}
