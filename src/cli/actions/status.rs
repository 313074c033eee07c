use crate::auth::{render, store::SessionStore};
use anyhow::Result;

/// Render the locally stored session without touching the backend.
///
/// # Errors
/// Returns an error when no storage location can be resolved.
pub fn execute() -> Result<()> {
    let store = SessionStore::from_env()?;
    let session = store.load();

    println!("{}", render::render(session.as_ref()));

    Ok(())
}
