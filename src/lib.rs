//! # Folio (Portfolio sign-in client)
//!
//! `folio` signs a user into the portfolio backend through a third-party
//! identity provider and keeps the resulting session available to the
//! terminal.
//!
//! ## Bootstrap flow
//!
//! A sign-in attempt runs one fixed chain:
//!
//! 1. **Acquire** a provider credential, either by sending the browser to the
//!    provider's authorization endpoint and catching the redirect on a
//!    loopback listener, or by collecting a provider-signed identity token
//!    directly.
//! 2. **Verify** the state nonce bound to the attempt (redirect path only).
//!    A missing or foreign state aborts before anything touches the network.
//! 3. **Exchange** the credential at the backend's `/api/auth/google`
//!    endpoint for a bearer token and user profile.
//! 4. **Persist** the session to the durable and session-scoped storage
//!    tiers, then render the signed-in state.
//!
//! Credentials are transient; only the issued session is ever written to
//! disk. The bearer token is opaque to this client: it is stored and
//! replayed, never parsed.
//!
//! ## Session lifecycle
//!
//! Sessions are replaced whole, never patched. They are destroyed on explicit
//! sign-out or when an authenticated call answers `401 Unauthorized`.

pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
