use crate::auth::{render, store::SessionStore, AuthClient, ClientSettings};
use anyhow::Result;

/// Confirm the stored session against the backend and render the profile it
/// returns. A session the backend no longer honors is cleared and rendered
/// as guest state.
///
/// # Errors
/// Returns an error when the profile call fails.
pub async fn execute(settings: ClientSettings) -> Result<()> {
    let store = SessionStore::from_env()?;
    let client = AuthClient::new(settings, store)?;

    match client.current_user().await {
        Ok(session) => {
            println!("{}", render::render(session.as_ref()));
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", render::notice(&err));
            Err(err.into())
        }
    }
}
