//! Credential acquisition strategies. Both produce a provider credential for
//! the exchanger and differ only in how the user proves their identity: a
//! browser round-trip through the provider's authorization endpoint, or a
//! provider-signed identity token collected directly.

pub mod redirect;
pub mod token;

/// Credential obtained from the identity provider. Transient by contract:
/// it lives between acquisition and exchange and is never persisted.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// Single-use code from the redirect flow, bound to the redirect URI it
    /// was issued for.
    AuthorizationCode { code: String, redirect_uri: String },
    /// Provider-signed token asserting identity claims directly.
    IdentityToken(String),
}

impl std::fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthCredential::AuthorizationCode { redirect_uri, .. } => f
                .debug_struct("AuthorizationCode")
                .field("code", &"***")
                .field("redirect_uri", redirect_uri)
                .finish(),
            AuthCredential::IdentityToken(_) => f.write_str("IdentityToken(***)"),
        }
    }
}
