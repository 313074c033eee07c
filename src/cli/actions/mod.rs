pub mod login;
pub mod logout;
pub mod profile;
pub mod status;

use crate::auth::{ClientSettings, Flow};
use anyhow::Result;

#[derive(Debug)]
pub enum Action {
    Login {
        settings: ClientSettings,
        flow: Flow,
        no_browser: bool,
    },
    Status,
    Profile {
        settings: ClientSettings,
    },
    Logout {
        settings: ClientSettings,
    },
}

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
// To add a new action, add a new `Action::*` variant and a corresponding `*::execute` call here.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login {
            settings,
            flow,
            no_browser,
        } => login::execute(settings, flow, no_browser).await,
        Action::Status => status::execute(),
        Action::Profile { settings } => profile::execute(settings).await,
        Action::Logout { settings } => logout::execute(settings).await,
    }
}
