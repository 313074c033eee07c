//! Terminal reflection of auth state. Pure functions of the session: the
//! same input always renders the same block, so repeated renders never stack
//! duplicate affordances.

use crate::auth::{error::AuthError, session::Session};

/// Header line marking the authenticated block. Rendered exactly once per
/// render call.
const SIGNED_IN_HEADER: &str = "Signed in as";

/// Render the signed-in or guest affordance for the given session.
#[must_use]
pub fn render(session: Option<&Session>) -> String {
    match session {
        Some(session) => {
            let user = session.user();
            let mut block = format!("{SIGNED_IN_HEADER} {} <{}>\n", user.name, user.email);
            if let Some(avatar_url) = &user.avatar_url {
                block.push_str(&format!("  avatar:   {avatar_url}\n"));
            }
            if let Some(last_login) = &user.last_login {
                block.push_str(&format!("  last seen: {last_login}\n"));
            }
            block.push_str("  profile:  folio profile\n");
            block.push_str("  sign out: folio logout");
            block
        }
        None => "Signed out\n  sign in: folio login".to_string(),
    }
}

/// One-line transient notice for a failed attempt. The backend's own words
/// pass through untouched.
#[must_use]
pub fn notice(err: &AuthError) -> String {
    format!("! {err}")
}
