//! Loopback callback service for the redirect flow. One axum router, alive
//! for a single sign-in attempt: the provider redirects the browser to
//! `/callback`, the outcome is forwarded to the waiting flow exactly once,
//! and the server shuts down gracefully.

use crate::GIT_COMMIT_HASH;
use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;
use tracing::debug;

/// What the provider sent back to the loopback listener.
#[derive(Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Authorization code plus the state echoed by the provider.
    Code { code: String, state: String },
    /// The user denied the authorization request.
    Denied,
    /// The provider reported some other error.
    Failed(String),
}

#[derive(Clone)]
pub struct CallbackState {
    outcome: Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>,
    shutdown: mpsc::UnboundedSender<()>,
}

impl CallbackState {
    #[must_use]
    pub fn new(
        outcome: oneshot::Sender<CallbackOutcome>,
        shutdown: mpsc::UnboundedSender<()>,
    ) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(Some(outcome))),
            shutdown,
        }
    }
}

#[must_use]
pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/callback", get(callback))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

const CALLBACK_PAGE: &str = "<!doctype html>\
<html><head><title>folio</title></head>\
<body><p>Sign-in received. You can close this tab and return to the terminal.</p>\
<script>window.close();</script></body></html>";

// Repeated hits (or stray requests) find the sender already taken and are
// answered without forwarding anything.
async fn callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let outcome = match (params.code, params.state, params.error) {
        (_, _, Some(error)) if error == "access_denied" => CallbackOutcome::Denied,
        (_, _, Some(error)) => CallbackOutcome::Failed(error),
        (Some(code), Some(state), None) => CallbackOutcome::Code { code, state },
        _ => CallbackOutcome::Failed("missing code or state".to_string()),
    };

    if let Ok(mut sender) = state.outcome.lock() {
        if let Some(sender) = sender.take() {
            if sender.send(outcome).is_err() {
                debug!("callback arrived after the flow stopped waiting");
            }
        } else {
            debug!("duplicate provider callback ignored");
        }
    }

    let _ = state.shutdown.send(());

    Html(CALLBACK_PAGE)
}

#[derive(Serialize, Deserialize, Debug)]
struct Health {
    commit: String,
    name: String,
    version: String,
    status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener as StdTcpListener;
    use tokio::net::TcpListener;

    fn can_bind_localhost() -> bool {
        StdTcpListener::bind("127.0.0.1:0").is_ok()
    }

    async fn serve() -> (String, oneshot::Receiver<CallbackOutcome>) {
        let (tx, rx) = oneshot::channel();
        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel();
        let app = router(CallbackState::new(tx, shutdown_tx));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(async move {
                    shutdown_rx.recv().await;
                })
                .await
                .expect("serve");
        });

        (format!("http://{addr}"), rx)
    }

    #[tokio::test]
    async fn callback_forwards_code_and_state_once() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let (base, rx) = serve().await;

        let body = reqwest::get(format!("{base}/callback?code=abc&state=xyz"))
            .await
            .expect("request")
            .text()
            .await
            .expect("body");
        assert!(body.contains("close this tab"));

        assert_eq!(
            rx.await.expect("outcome"),
            CallbackOutcome::Code {
                code: "abc".to_string(),
                state: "xyz".to_string()
            }
        );
    }

    #[tokio::test]
    async fn access_denied_maps_to_denied() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let (base, rx) = serve().await;

        reqwest::get(format!("{base}/callback?error=access_denied"))
            .await
            .expect("request");

        assert_eq!(rx.await.expect("outcome"), CallbackOutcome::Denied);
    }

    #[tokio::test]
    async fn missing_parameters_map_to_failed() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let (base, rx) = serve().await;

        reqwest::get(format!("{base}/callback?code=only-code"))
            .await
            .expect("request");

        assert!(matches!(
            rx.await.expect("outcome"),
            CallbackOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn health_reports_package_identity() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let (base, _rx) = serve().await;

        let health: Health = reqwest::get(format!("{base}/health"))
            .await
            .expect("request")
            .json()
            .await
            .expect("json");

        assert_eq!(health.name, env!("CARGO_PKG_NAME"));
        assert_eq!(health.status, "ok");
    }
}
