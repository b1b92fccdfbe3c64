//! Error types for account verification.

use thiserror::Error;

/// Errors that end the authentication loop.
///
/// A 401/403 from the verification endpoint is not an error here: it is
/// recovered in place by prompting the operator. Only failures that prompting
/// cannot fix escape [`SessionManager::authenticate`](super::SessionManager::authenticate).
#[derive(Debug, Error)]
pub enum AuthError {
    /// Connection-level failure talking to the verification endpoint.
    #[error("network error verifying account at {url}: {source}")]
    Network {
        /// Verification URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The verification request timed out.
    #[error("timeout verifying account at {url}")]
    Timeout {
        /// Verification URL.
        url: String,
    },

    /// The verification endpoint answered with something other than 200/401/403.
    #[error("unexpected HTTP {status} verifying account at {url}")]
    UnexpectedStatus {
        /// Verification URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The configured verification endpoint cannot carry an account path segment.
    #[error("invalid account endpoint URL: {url}")]
    InvalidUrl {
        /// The endpoint that failed to parse.
        url: String,
    },

    /// The operator could not be asked for replacement credentials.
    #[error("could not read {what} from operator: {source}")]
    Prompt {
        /// Which value was being requested.
        what: &'static str,
        /// The underlying input error.
        #[source]
        source: std::io::Error,
    },
}

impl AuthError {
    /// Maps a reqwest send failure to `Timeout` or `Network`.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an unexpected-status error.
    pub fn unexpected_status(url: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a prompt failure error.
    #[must_use]
    pub fn prompt(what: &'static str, source: std::io::Error) -> Self {
        Self::Prompt { what, source }
    }
}
