//! Credential-to-session bootstrap. One `AuthClient` owns the full chain
//! (acquire a provider credential, verify the state nonce, exchange it at
//! the backend, persist the session) and is passed explicitly to whatever
//! needs it; there are no ambient globals.

pub mod acquirer;
pub mod callback;
pub mod error;
pub mod exchange;
pub mod nonce;
pub mod render;
pub mod session;
pub mod store;

use crate::auth::{
    acquirer::{
        redirect::{self, BrowserLauncher, SystemBrowser},
        token::{IdentityPrompt, TerminalPrompt, TokenStrategy, PROVIDER_CLIENT_URL},
        AuthCredential,
    },
    error::AuthError,
    exchange::Exchanger,
    nonce::StateNonce,
    session::Session,
    store::SessionStore,
};
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};
use ulid::Ulid;

/// Default provider authorization endpoint for the redirect flow.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Default wall-clock bound on one redirect round-trip.
pub const DEFAULT_FLOW_TIMEOUT: Duration = Duration::from_secs(300);

/// Which acquisition strategy a sign-in attempt uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Browser round-trip through the provider's authorization endpoint.
    Redirect,
    /// Provider-signed identity token collected directly.
    Token,
    /// Token strategy first, falling back to redirect when the provider
    /// client cannot be initialized.
    Auto,
}

impl std::str::FromStr for Flow {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "redirect" => Ok(Flow::Redirect),
            "token" => Ok(Flow::Token),
            "auto" => Ok(Flow::Auto),
            _ => Err(format!("invalid flow: {value}")),
        }
    }
}

/// Everything a client needs to run the bootstrap against one backend and
/// one provider.
#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub api_url: String,
    pub client_id: String,
    pub auth_url: String,
    pub probe_url: String,
    pub redirect_port: u16,
    pub timeout: Duration,
}

impl ClientSettings {
    /// Settings for the given backend and OAuth client, with provider
    /// defaults. Required fields are parameters; the rest chain.
    #[must_use]
    pub fn new(api_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            client_id: client_id.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            probe_url: PROVIDER_CLIENT_URL.to_string(),
            redirect_port: 0,
            timeout: DEFAULT_FLOW_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    #[must_use]
    pub fn with_probe_url(mut self, probe_url: impl Into<String>) -> Self {
        self.probe_url = probe_url.into();
        self
    }

    #[must_use]
    pub fn with_redirect_port(mut self, port: u16) -> Self {
        self.redirect_port = port;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct AuthClient {
    settings: ClientSettings,
    exchanger: Exchanger,
    store: SessionStore,
    guard: StateNonce,
    token_strategy: TokenStrategy,
    launcher: Box<dyn BrowserLauncher>,
    prompt: Box<dyn IdentityPrompt>,
}

impl AuthClient {
    /// # Errors
    /// Returns `AuthError::Config` when an HTTP client cannot be built.
    pub fn new(settings: ClientSettings, store: SessionStore) -> Result<Self, AuthError> {
        let exchanger = Exchanger::new(settings.api_url.clone())?;
        let guard = StateNonce::new(store.scoped_dir());
        let token_strategy = TokenStrategy::new(settings.probe_url.clone())?;

        Ok(Self {
            settings,
            exchanger,
            store,
            guard,
            token_strategy,
            launcher: Box::new(SystemBrowser),
            prompt: Box::new(TerminalPrompt),
        })
    }

    /// Replace the browser launcher, e.g. with a URL printer.
    #[must_use]
    pub fn with_launcher(mut self, launcher: Box<dyn BrowserLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Replace the identity-token prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Box<dyn IdentityPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run one sign-in attempt end to end and persist the session it yields.
    ///
    /// # Errors
    /// Any `AuthError` from the acquisition, verification, exchange or
    /// persistence stage; all are terminal for this attempt.
    pub async fn sign_in(&self, flow: Flow) -> Result<Session, AuthError> {
        let attempt_id = Ulid::new().to_string();
        let span = info_span!("auth.sign_in", %attempt_id);
        self.sign_in_inner(flow).instrument(span).await
    }

    async fn sign_in_inner(&self, flow: Flow) -> Result<Session, AuthError> {
        match flow {
            Flow::Redirect => self.sign_in_with_redirect().await,
            Flow::Token => self.sign_in_with_token().await,
            Flow::Auto => match self.sign_in_with_token().await {
                Err(AuthError::ProviderUnavailable(reason)) => {
                    info!("provider client unavailable ({reason}), falling back to redirect");
                    self.sign_in_with_redirect().await
                }
                other => other,
            },
        }
    }

    async fn sign_in_with_token(&self) -> Result<Session, AuthError> {
        let credential = self.token_strategy.acquire(self.prompt.as_ref()).await?;
        self.finish(credential).await
    }

    async fn sign_in_with_redirect(&self) -> Result<Session, AuthError> {
        let state = self.guard.generate()?;
        let acquired = redirect::acquire(
            &self.settings.auth_url,
            &self.settings.client_id,
            self.settings.redirect_port,
            self.settings.timeout,
            &state,
            self.launcher.as_ref(),
        )
        .await?;

        // The returned state must clear the guard before the code goes
        // anywhere near the backend.
        self.guard.verify(&acquired.state)?;

        self.finish(AuthCredential::AuthorizationCode {
            code: acquired.code,
            redirect_uri: acquired.redirect_uri,
        })
        .await
    }

    async fn finish(&self, credential: AuthCredential) -> Result<Session, AuthError> {
        let session = self.exchanger.exchange(&credential).await?;
        self.store.save(&session)?;
        info!("signed in as {}", session.user().email);
        Ok(session)
    }

    /// Re-read the stored session and confirm it against the backend. A 401
    /// destroys the local session; callers get `None` and render guest state.
    ///
    /// # Errors
    /// Any `AuthError` from the profile call other than a plain 401.
    pub async fn current_user(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.store.load() else {
            return Ok(None);
        };

        match self.exchanger.profile(session.token()).await? {
            Some(user) => Ok(Some(Session::new(session.token().clone(), user))),
            None => {
                debug!("backend no longer honors the session, clearing");
                self.store.clear();
                Ok(None)
            }
        }
    }

    /// Invalidate the session on the backend (best effort) and always clear
    /// both local tiers.
    pub async fn sign_out(&self) {
        if let Some(session) = self.store.load() {
            if let Err(err) = self.exchanger.logout(session.token()).await {
                debug!("backend sign-out failed, clearing locally anyway: {err}");
            }
        }
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_parses_known_values() {
        assert_eq!("redirect".parse::<Flow>(), Ok(Flow::Redirect));
        assert_eq!("Token".parse::<Flow>(), Ok(Flow::Token));
        assert_eq!("AUTO".parse::<Flow>(), Ok(Flow::Auto));
        assert!("popup".parse::<Flow>().is_err());
    }

    #[test]
    fn settings_default_to_provider_endpoints() {
        let settings = ClientSettings::new("https://api.example.com", "client-1");
        assert_eq!(settings.auth_url, GOOGLE_AUTH_URL);
        assert_eq!(settings.probe_url, PROVIDER_CLIENT_URL);
        assert_eq!(settings.redirect_port, 0);
        assert_eq!(settings.timeout, DEFAULT_FLOW_TIMEOUT);
    }

    #[test]
    fn settings_overrides_chain() {
        let settings = ClientSettings::new("https://api.example.com", "client-1")
            .with_auth_url("https://provider.test/authorize")
            .with_probe_url("https://provider.test/client")
            .with_redirect_port(4180)
            .with_timeout(Duration::from_secs(30));

        assert_eq!(settings.auth_url, "https://provider.test/authorize");
        assert_eq!(settings.probe_url, "https://provider.test/client");
        assert_eq!(settings.redirect_port, 4180);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }
}
