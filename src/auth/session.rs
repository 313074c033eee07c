//! Session and user types persisted between runs. The bearer token is opaque:
//! it is stored and replayed against the backend, never parsed or inspected
//! for claims.

use secrecy::{ExposeSecret, SecretString};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Profile summary returned by the backend alongside the bearer token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

/// An authenticated session: one bearer token plus the user it belongs to.
/// Replaced whole on every change; there are no partial updates.
#[derive(Clone, Deserialize)]
pub struct Session {
    token: SecretString,
    user: User,
}

impl Session {
    #[must_use]
    pub fn new(token: SecretString, user: User) -> Self {
        Self { token, user }
    }

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }
}

// Serialized only by the session store; persistence needs the raw token value.
impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Session", 2)?;
        state.serialize_field("token", self.token.expose_secret())?;
        state.serialize_field("user", &self.user)?;
        state.end()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("user", &self.user)
            .finish()
    }
}
