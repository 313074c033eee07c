use crate::auth::{render, store::SessionStore, AuthClient, ClientSettings};
use anyhow::Result;

/// Invalidate the backend session best-effort and clear both local tiers.
/// Local clearing succeeds even when the backend is unreachable.
///
/// # Errors
/// Returns an error when no storage location can be resolved.
pub async fn execute(settings: ClientSettings) -> Result<()> {
    let store = SessionStore::from_env()?;
    let client = AuthClient::new(settings, store)?;

    client.sign_out().await;

    println!("{}", render::render(None));

    Ok(())
}
