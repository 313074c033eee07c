use crate::auth::GOOGLE_AUTH_URL;
use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_CLIENT_ID: &str = "client-id";
pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_REDIRECT_PORT: &str = "redirect-port";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .short('a')
                .long(ARG_API_URL)
                .help("Backend base URL, example: https://portfolio.example.com")
                .env("FOLIO_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_CLIENT_ID)
                .long(ARG_CLIENT_ID)
                .help("OAuth client id issued by the identity provider")
                .env("FOLIO_CLIENT_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Provider authorization endpoint")
                .env("FOLIO_AUTH_URL")
                .default_value(GOOGLE_AUTH_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_REDIRECT_PORT)
                .long(ARG_REDIRECT_PORT)
                .help("Loopback callback port, 0 picks an ephemeral port")
                .env("FOLIO_REDIRECT_PORT")
                .default_value("0")
                .value_parser(clap::value_parser!(u16))
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Seconds to wait for the provider callback")
                .env("FOLIO_TIMEOUT")
                .default_value("300")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
}
