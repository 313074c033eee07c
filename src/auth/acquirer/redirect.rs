//! Redirect strategy: send the browser to the provider's authorization
//! endpoint with a state nonce and catch the `code`/`state` pair on a
//! loopback listener. The attempt is bounded by a wall-clock timeout; once
//! the callback resolves, the listener is torn down.

use crate::auth::callback::{self, CallbackOutcome, CallbackState};
use crate::auth::error::AuthError;
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use url::Url;

/// What the redirect flow hands back for verification and exchange: the
/// one-time code, the state echoed by the provider, and the redirect URI the
/// code is bound to.
#[derive(Debug)]
pub struct Acquired {
    pub code: String,
    pub state: String,
    pub redirect_uri: String,
}

/// Seam for sending the user's browser to a URL. `open` reports whether the
/// navigation was started; a refusal means no network call is attempted.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> bool;
}

/// Launches the platform browser handler.
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> bool {
        let mut command = if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        };

        match command.stdout(Stdio::null()).stderr(Stdio::null()).spawn() {
            Ok(_) => true,
            Err(err) => {
                debug!("failed to launch browser: {err}");
                false
            }
        }
    }
}

/// Prints the authorization URL instead of launching anything. Used for
/// `--no-browser` and headless environments.
pub struct PrintUrl;

impl BrowserLauncher for PrintUrl {
    fn open(&self, url: &str) -> bool {
        println!("Open this URL in your browser to sign in:\n\n  {url}\n");
        true
    }
}

/// Build the provider authorization URL for one attempt.
///
/// # Errors
/// Returns `AuthError::Config` when the configured endpoint is not a URL.
pub fn authorization_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, AuthError> {
    let mut url = Url::parse(auth_url)
        .map_err(|err| AuthError::Config(format!("invalid authorization endpoint: {err}")))?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", "openid email profile")
        .append_pair("state", state)
        .append_pair("prompt", "select_account");

    Ok(url)
}

/// Run one redirect round-trip and return the acquired code.
///
/// # Errors
/// `PopupBlocked` when the browser cannot be launched (nothing has touched
/// the network at that point), `Timeout` when no callback arrives within
/// `timeout`, `UserCancelled` when the user denies the request,
/// `ProviderUnavailable` when the provider reports any other error.
pub async fn acquire(
    auth_url: &str,
    client_id: &str,
    port: u16,
    timeout: Duration,
    state: &str,
    launcher: &dyn BrowserLauncher,
) -> Result<Acquired, AuthError> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|err| AuthError::Config(format!("failed to bind loopback listener: {err}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|err| AuthError::Config(format!("failed to read listener address: {err}")))?;
    let redirect_uri = format!("http://127.0.0.1:{}/callback", local_addr.port());

    let url = authorization_url(auth_url, client_id, &redirect_uri, state)?;

    let (outcome_tx, outcome_rx) = oneshot::channel();
    let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel();
    let app = callback::router(CallbackState::new(outcome_tx, shutdown_tx.clone()));

    let server = tokio::spawn(async move {
        let serve = axum::serve(listener, app.into_make_service()).with_graceful_shutdown(
            async move {
                shutdown_rx.recv().await;
            },
        );
        if let Err(err) = serve.await {
            debug!("callback listener stopped: {err}");
        }
    });

    if !launcher.open(url.as_str()) {
        let _ = shutdown_tx.send(());
        let _ = server.await;
        return Err(AuthError::PopupBlocked);
    }

    info!("Waiting for the provider callback on {redirect_uri}");

    let outcome = match tokio::time::timeout(timeout, outcome_rx).await {
        Err(_) => {
            let _ = shutdown_tx.send(());
            let _ = server.await;
            return Err(AuthError::Timeout);
        }
        Ok(Err(_)) => {
            let _ = shutdown_tx.send(());
            let _ = server.await;
            return Err(AuthError::ProviderUnavailable(
                "callback listener stopped before the provider answered".to_string(),
            ));
        }
        Ok(Ok(outcome)) => outcome,
    };

    let _ = shutdown_tx.send(());
    let _ = server.await;

    match outcome {
        CallbackOutcome::Code { code, state } => Ok(Acquired {
            code,
            state,
            redirect_uri,
        }),
        CallbackOutcome::Denied => Err(AuthError::UserCancelled),
        CallbackOutcome::Failed(message) => Err(AuthError::ProviderUnavailable(message)),
    }
}
