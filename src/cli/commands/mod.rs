pub mod backend;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

pub const CMD_LOGIN: &str = "login";
pub const CMD_STATUS: &str = "status";
pub const CMD_PROFILE: &str = "profile";
pub const CMD_LOGOUT: &str = "logout";

pub const ARG_FLOW: &str = "flow";
pub const ARG_NO_BROWSER: &str = "no-browser";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("folio")
        .about("Portfolio sign-in and session bootstrap client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in through the identity provider")
                .arg(
                    clap::Arg::new(ARG_FLOW)
                        .long(ARG_FLOW)
                        .help("Acquisition strategy")
                        .value_parser(["redirect", "token", "auto"])
                        .default_value("auto"),
                )
                .arg(
                    clap::Arg::new(ARG_NO_BROWSER)
                        .long(ARG_NO_BROWSER)
                        .help("Print the authorization URL instead of launching a browser")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new(CMD_STATUS).about("Show the current session"))
        .subcommand(
            Command::new(CMD_PROFILE).about("Fetch the profile behind the stored session"),
        )
        .subcommand(
            Command::new(CMD_LOGOUT).about("Invalidate the session and clear local state"),
        );

    let command = backend::with_args(command);
    logging::with_args(command)
}
