use crate::auth::{
    acquirer::redirect::PrintUrl, error::AuthError, render, store::SessionStore, AuthClient,
    ClientSettings, Flow,
};
use anyhow::Result;

/// Run one sign-in attempt and render the outcome.
///
/// # Errors
/// Returns an error when the attempt fails for any reason other than the
/// user cancelling it.
pub async fn execute(settings: ClientSettings, flow: Flow, no_browser: bool) -> Result<()> {
    let store = SessionStore::from_env()?;
    let mut client = AuthClient::new(settings, store)?;

    if no_browser {
        client = client.with_launcher(Box::new(PrintUrl));
    }

    match client.sign_in(flow).await {
        Ok(session) => {
            println!("{}", render::render(Some(&session)));
            Ok(())
        }
        // A dismissed prompt is a decision, not a failure.
        Err(AuthError::UserCancelled) => {
            println!("{}", render::notice(&AuthError::UserCancelled));
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", render::notice(&err));
            Err(err.into())
        }
    }
}
