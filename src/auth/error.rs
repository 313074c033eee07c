use std::fmt;

/// Failure taxonomy for a sign-in attempt. Every variant is terminal for the
/// attempt; none is retried automatically. Each renders as a single
/// user-facing notice line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// The identity provider could not be reached or initialized.
    ProviderUnavailable(String),
    /// The user dismissed the prompt or denied the authorization request.
    UserCancelled,
    /// The system browser could not be launched for the authorization page.
    PopupBlocked,
    /// The returned state does not match the nonce bound to this attempt.
    StateMismatch,
    /// The backend request could not complete (offline, DNS, timeout).
    NetworkError(String),
    /// The backend refused the credential; the message is shown verbatim.
    BackendRejected {
        status: Option<u16>,
        message: String,
    },
    /// The backend claimed success but the session payload was incomplete.
    MalformedResponse(String),
    /// The authorization flow exceeded its wall-clock bound.
    Timeout,
    /// Local configuration is missing or invalid.
    Config(String),
    /// A storage tier could not be read or written.
    Storage(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::ProviderUnavailable(message) => {
                write!(formatter, "Identity provider unavailable: {message}")
            }
            AuthError::UserCancelled => write!(formatter, "Sign-in cancelled"),
            AuthError::PopupBlocked => {
                write!(formatter, "Could not open a browser for sign-in")
            }
            AuthError::StateMismatch => {
                write!(formatter, "Sign-in attempt rejected: state mismatch")
            }
            AuthError::NetworkError(message) => {
                write!(formatter, "Unable to reach the server: {message}")
            }
            AuthError::BackendRejected { message, .. } => write!(formatter, "{message}"),
            AuthError::MalformedResponse(message) => {
                write!(formatter, "Unexpected server response: {message}")
            }
            AuthError::Timeout => write!(formatter, "Sign-in timed out. Please try again."),
            AuthError::Config(message) => write!(formatter, "Config error: {message}"),
            AuthError::Storage(message) => write!(formatter, "Storage error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}
