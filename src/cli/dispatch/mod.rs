use crate::auth::{ClientSettings, Flow};
use crate::cli::actions::Action;
use crate::cli::commands::{self, backend};
use anyhow::{anyhow, Result};
use std::time::Duration;

/// Map parsed arguments to an action.
///
/// # Errors
/// Returns an error when a required argument is missing for the requested
/// subcommand.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((commands::CMD_LOGIN, sub_m)) => {
            let settings = settings(matches, true)?;
            let flow = sub_m
                .get_one::<String>(commands::ARG_FLOW)
                .map_or("auto", String::as_str)
                .parse::<Flow>()
                .map_err(|err| anyhow!(err))?;

            Ok(Action::Login {
                settings,
                flow,
                no_browser: sub_m.get_flag(commands::ARG_NO_BROWSER),
            })
        }
        Some((commands::CMD_STATUS, _)) => Ok(Action::Status),
        Some((commands::CMD_PROFILE, _)) => Ok(Action::Profile {
            settings: settings(matches, false)?,
        }),
        Some((commands::CMD_LOGOUT, _)) => Ok(Action::Logout {
            settings: settings(matches, false)?,
        }),
        _ => Err(anyhow!("missing subcommand")),
    }
}

// The client id only matters when a login attempt has to build an
// authorization URL; the session-replay subcommands run without one.
fn settings(matches: &clap::ArgMatches, require_client_id: bool) -> Result<ClientSettings> {
    let api_url = matches
        .get_one::<String>(backend::ARG_API_URL)
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: --api-url"))?;

    let client_id = matches.get_one::<String>(backend::ARG_CLIENT_ID).cloned();
    if require_client_id && client_id.is_none() {
        return Err(anyhow!("missing required argument: --client-id"));
    }

    let mut settings = ClientSettings::new(api_url, client_id.unwrap_or_default());

    if let Some(auth_url) = matches.get_one::<String>(backend::ARG_AUTH_URL) {
        settings = settings.with_auth_url(auth_url.clone());
    }
    if let Some(port) = matches.get_one::<u16>(backend::ARG_REDIRECT_PORT) {
        settings = settings.with_redirect_port(*port);
    }
    if let Some(timeout) = matches.get_one::<u64>(backend::ARG_TIMEOUT) {
        settings = settings.with_timeout(Duration::from_secs(*timeout));
    }

    Ok(settings)
}
