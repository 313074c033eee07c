//! End-to-end bootstrap flow tests: a simulated provider plays the browser
//! round-trip while a mock backend answers the credential exchange.

use folio::auth::{
    acquirer::redirect::BrowserLauncher,
    acquirer::token::IdentityPrompt,
    error::AuthError,
    render,
    session::{Session, User},
    store::SessionStore,
    AuthClient, ClientSettings, Flow,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::net::TcpListener;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn user_json() -> serde_json::Value {
    json!({
        "id": "u-1",
        "name": "Jane Doe",
        "email": "jane@example.com",
        "avatarUrl": "https://example.com/a.png"
    })
}

/// Plays the identity provider: parses the authorization URL and sends the
/// "browser" straight back to the loopback callback.
struct SimulatedProvider {
    state_override: Option<&'static str>,
}

impl BrowserLauncher for SimulatedProvider {
    fn open(&self, url: &str) -> bool {
        let url = Url::parse(url).expect("authorization URL");
        let mut redirect_uri = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "redirect_uri" => redirect_uri = Some(value.to_string()),
                "state" => state = Some(value.to_string()),
                _ => {}
            }
        }
        let redirect_uri = redirect_uri.expect("redirect_uri present");
        let state = self
            .state_override
            .map(str::to_string)
            .unwrap_or_else(|| state.expect("state present"));

        tokio::spawn(async move {
            let _ = reqwest::get(format!("{redirect_uri}?code=one-time&state={state}")).await;
        });
        true
    }
}

struct Blocked;

impl BrowserLauncher for Blocked {
    fn open(&self, _url: &str) -> bool {
        false
    }
}

struct StaticPrompt(&'static str);

impl IdentityPrompt for StaticPrompt {
    fn read_token(&self) -> std::io::Result<Option<String>> {
        Ok(Some(self.0.to_string()))
    }
}

struct Harness {
    _durable: tempfile::TempDir,
    _scoped: tempfile::TempDir,
    store: SessionStore,
}

impl Harness {
    fn new() -> Self {
        let durable = tempfile::tempdir().expect("tempdir");
        let scoped = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::with_roots(durable.path(), scoped.path());
        Self {
            _durable: durable,
            _scoped: scoped,
            store,
        }
    }

    fn client(&self, settings: ClientSettings) -> AuthClient {
        AuthClient::new(settings, self.store.clone()).expect("client")
    }
}

fn settings(api_url: &str) -> ClientSettings {
    ClientSettings::new(api_url, "client-1").with_timeout(Duration::from_secs(10))
}

#[tokio::test]
async fn redirect_flow_persists_the_exchanged_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-123",
            "user": user_json()
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let harness = Harness::new();
    let client = harness
        .client(settings(&backend.uri()))
        .with_launcher(Box::new(SimulatedProvider {
            state_override: None,
        }));

    let session = client.sign_in(Flow::Redirect).await.expect("session");
    assert_eq!(session.token().expose_secret(), "tok-123");

    // The store owns the session now; a re-read returns exactly what the
    // backend issued.
    let loaded = harness.store.load().expect("stored session");
    assert_eq!(loaded.token().expose_secret(), "tok-123");
    assert_eq!(loaded.user().email, "jane@example.com");

    backend.verify().await;
}

#[tokio::test]
async fn foreign_state_never_reaches_the_exchanger() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let harness = Harness::new();
    let client = harness
        .client(settings(&backend.uri()))
        .with_launcher(Box::new(SimulatedProvider {
            state_override: Some("forged-state"),
        }));

    let err = client
        .sign_in(Flow::Redirect)
        .await
        .expect_err("expected state mismatch");
    assert_eq!(err, AuthError::StateMismatch);
    assert!(harness.store.load().is_none());

    backend.verify().await;
}

#[tokio::test]
async fn blocked_browser_makes_no_network_call() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let harness = Harness::new();
    let client = harness
        .client(settings(&backend.uri()))
        .with_launcher(Box::new(Blocked));

    let err = client
        .sign_in(Flow::Redirect)
        .await
        .expect_err("expected popup blocked");
    assert_eq!(err, AuthError::PopupBlocked);

    backend.verify().await;
}

#[tokio::test]
async fn rejection_message_is_shown_and_nothing_is_stored() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Invalid token"
        })))
        .mount(&backend)
        .await;

    let harness = Harness::new();
    let client = harness
        .client(settings(&backend.uri()))
        .with_launcher(Box::new(SimulatedProvider {
            state_override: None,
        }));

    let err = client
        .sign_in(Flow::Redirect)
        .await
        .expect_err("expected rejection");
    assert_eq!(render::notice(&err), "! Invalid token");
    assert!(harness.store.load().is_none());
}

#[tokio::test]
async fn token_flow_skips_the_state_guard() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-token-flow",
            "user": user_json()
        })))
        .mount(&backend)
        .await;
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gsi/client"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&provider)
        .await;

    let harness = Harness::new();
    let client = harness
        .client(settings(&backend.uri()).with_probe_url(format!("{}/gsi/client", provider.uri())))
        .with_prompt(Box::new(StaticPrompt("signed.jwt")));

    let session = client.sign_in(Flow::Token).await.expect("session");
    assert_eq!(session.token().expose_secret(), "tok-token-flow");
    assert!(harness.store.load().is_some());
}

#[tokio::test]
async fn auto_flow_falls_back_to_redirect_when_provider_client_is_down() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-fallback",
            "user": user_json()
        })))
        .mount(&backend)
        .await;

    let harness = Harness::new();
    let client = harness
        .client(settings(&backend.uri()).with_probe_url("http://127.0.0.1:1/gsi/client"))
        .with_launcher(Box::new(SimulatedProvider {
            state_override: None,
        }))
        .with_prompt(Box::new(StaticPrompt("never used")));

    let session = client.sign_in(Flow::Auto).await.expect("session");
    assert_eq!(session.token().expose_secret(), "tok-fallback");
}

#[tokio::test]
async fn sign_out_clears_locally_even_when_backend_is_unreachable() {
    let harness = Harness::new();
    harness
        .store
        .save(&Session::new(
            SecretString::from("tok-stale".to_string()),
            User {
                id: "u-1".to_string(),
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                avatar_url: None,
                created_at: None,
                last_login: None,
            },
        ))
        .expect("save");

    let client = harness.client(settings("http://127.0.0.1:1"));
    client.sign_out().await;

    assert!(harness.store.load().is_none());
}

#[tokio::test]
async fn expired_backend_session_is_destroyed_on_profile() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&backend)
        .await;

    let harness = Harness::new();
    harness
        .store
        .save(&Session::new(
            SecretString::from("tok-stale".to_string()),
            User {
                id: "u-1".to_string(),
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                avatar_url: None,
                created_at: None,
                last_login: None,
            },
        ))
        .expect("save");

    let client = harness.client(settings(&backend.uri()));
    let session = client.current_user().await.expect("profile call");

    assert!(session.is_none());
    assert!(harness.store.load().is_none());
}
