//! Account session and the interactive re-authentication loop.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::AuthError;
use crate::download::HttpClient;
use crate::download::client::bearer;
use crate::prompt::{EMAIL_PROMPT, Prompter, TOKEN_PROMPT};

/// Account identifier and bearer credential for one run.
///
/// Only [`SessionManager`] changes these values after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    account_identifier: String,
    credential: String,
    has_authenticated_once: bool,
}

impl Session {
    /// Creates a session that has not been verified yet.
    pub fn new(account_identifier: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            account_identifier: account_identifier.into(),
            credential: credential.into(),
            has_authenticated_once: false,
        }
    }

    /// Builds a session from operator input: email first, then token.
    ///
    /// When `account_identifier` is already known only the token is requested.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Prompt`] if either answer cannot be read.
    pub fn from_prompts(
        prompter: &dyn Prompter,
        account_identifier: Option<String>,
    ) -> Result<Self, AuthError> {
        let account_identifier = match account_identifier {
            Some(account) => account.trim().to_string(),
            None => prompter
                .prompt(EMAIL_PROMPT)
                .map_err(|e| AuthError::prompt("account email", e))?,
        };
        let credential = prompter
            .prompt(TOKEN_PROMPT)
            .map_err(|e| AuthError::prompt("bearer token", e))?;
        Ok(Self::new(account_identifier, credential))
    }

    /// Account identifier (email) the session is bound to.
    #[must_use]
    pub fn account_identifier(&self) -> &str {
        &self.account_identifier
    }

    /// Bearer credential.
    #[must_use]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Whether verification has succeeded at least once in this run.
    #[must_use]
    pub fn has_authenticated_once(&self) -> bool {
        self.has_authenticated_once
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("account_identifier", &self.account_identifier)
            .field("credential", &"<redacted>")
            .field("has_authenticated_once", &self.has_authenticated_once)
            .finish()
    }
}

/// Outcome of a single verification request.
enum Verification {
    Accepted,
    Rejected(StatusCode),
}

/// Owns the [`Session`] and verifies it against the account endpoint.
pub struct SessionManager {
    session: Session,
    client: HttpClient,
    prompter: Arc<dyn Prompter>,
    step_delay: Duration,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &self.session)
            .field("step_delay", &self.step_delay)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager for `session`.
    ///
    /// `step_delay` is slept before every verification request.
    pub fn new(
        session: Session,
        client: HttpClient,
        prompter: Arc<dyn Prompter>,
        step_delay: Duration,
    ) -> Self {
        Self {
            session,
            client,
            prompter,
            step_delay,
        }
    }

    /// The session in its current state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Credential to attach to authenticated requests.
    #[must_use]
    pub fn current_credential(&self) -> &str {
        self.session.credential()
    }

    /// Account identifier to attach to authenticated requests.
    #[must_use]
    pub fn current_account_identifier(&self) -> &str {
        self.session.account_identifier()
    }

    /// Verifies the session, prompting for replacements until the service accepts it.
    ///
    /// On 401/403 the recovery depends on history: before the first success
    /// in this run the token is assumed wrong, so a new token and then a new
    /// email are requested; after a success only a new email is requested.
    /// There is no attempt limit.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the request fails at the transport level,
    /// the service answers with an unexpected status, or operator input
    /// cannot be read.
    #[instrument(skip(self))]
    pub async fn authenticate(&mut self) -> Result<(), AuthError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.verify_once().await? {
                Verification::Accepted => {
                    self.session.has_authenticated_once = true;
                    info!(
                        account = %self.session.account_identifier,
                        attempt,
                        "authentication successful"
                    );
                    return Ok(());
                }
                Verification::Rejected(status) => {
                    warn!(
                        account = %self.session.account_identifier,
                        status = status.as_u16(),
                        attempt,
                        "credentials rejected"
                    );
                    self.prompt_replacement_credentials()?;
                }
            }
        }
    }

    /// Asks for a new token, then runs [`authenticate`](Self::authenticate).
    ///
    /// Used when a later request rejects a credential the account endpoint
    /// had already accepted, so re-verifying the old token would not help.
    /// The new token has not been verified yet, so a rejection of it asks
    /// for the token again rather than only the email.
    ///
    /// # Errors
    ///
    /// Same as [`authenticate`](Self::authenticate).
    #[instrument(skip(self))]
    pub async fn refresh_credential(&mut self) -> Result<(), AuthError> {
        self.session.credential = self
            .prompter
            .prompt(TOKEN_PROMPT)
            .map_err(|e| AuthError::prompt("bearer token", e))?;
        self.session.has_authenticated_once = false;
        self.authenticate().await
    }

    async fn verify_once(&self) -> Result<Verification, AuthError> {
        tokio::time::sleep(self.step_delay).await;

        let url = account_url(
            &self.client.endpoints().accounts,
            &self.session.account_identifier,
        )?;
        debug!(url = %url, "verifying account");

        let response = self
            .client
            .inner()
            .get(url.clone())
            .header(AUTHORIZATION, bearer(&self.session.credential))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| AuthError::transport(url.as_str(), e))?;

        match response.status() {
            StatusCode::OK => Ok(Verification::Accepted),
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Ok(Verification::Rejected(status))
            }
            status => Err(AuthError::unexpected_status(url.as_str(), status.as_u16())),
        }
    }

    fn prompt_replacement_credentials(&mut self) -> Result<(), AuthError> {
        if !self.session.has_authenticated_once {
            self.session.credential = self
                .prompter
                .prompt(TOKEN_PROMPT)
                .map_err(|e| AuthError::prompt("bearer token", e))?;
        }
        self.session.account_identifier = self
            .prompter
            .prompt(EMAIL_PROMPT)
            .map_err(|e| AuthError::prompt("account email", e))?;
        Ok(())
    }
}

/// Builds `{base}/{email}?email={email}`.
fn account_url(base: &str, account_identifier: &str) -> Result<Url, AuthError> {
    let mut url = Url::parse(base).map_err(|_| AuthError::invalid_url(base))?;
    url.path_segments_mut()
        .map_err(|()| AuthError::invalid_url(base))?
        .pop_if_empty()
        .push(account_identifier);
    url.query_pairs_mut().append_pair("email", account_identifier);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;

    #[test]
    fn test_account_url_carries_email_in_path_and_query() {
        let url = account_url("https://accounts.quixel.com/api/v1/users", "me@example.com").unwrap();
        assert_eq!(url.path(), "/api/v1/users/me@example.com");
        assert_eq!(url.query(), Some("email=me%40example.com"));
    }

    #[test]
    fn test_account_url_tolerates_trailing_slash() {
        let url = account_url("http://localhost:8080/users/", "a").unwrap();
        assert_eq!(url.path(), "/users/a");
    }

    #[test]
    fn test_account_url_rejects_non_hierarchical_base() {
        let result = account_url("mailto:someone", "a");
        assert!(matches!(result, Err(AuthError::InvalidUrl { .. })));
    }

    #[test]
    fn test_session_from_prompts_asks_email_then_token() {
        let prompter = ScriptedPrompter::new([" me@example.com ", " tok "]);
        let session = Session::from_prompts(&prompter, None).unwrap();
        assert_eq!(session.account_identifier(), "me@example.com");
        assert_eq!(session.credential(), "tok");
        assert!(!session.has_authenticated_once());
        assert_eq!(prompter.asked(), vec![EMAIL_PROMPT, TOKEN_PROMPT]);
    }

    #[test]
    fn test_session_from_prompts_skips_known_email() {
        let prompter = ScriptedPrompter::new(["tok"]);
        let session = Session::from_prompts(&prompter, Some("known@example.com".into())).unwrap();
        assert_eq!(session.account_identifier(), "known@example.com");
        assert_eq!(prompter.asked(), vec![TOKEN_PROMPT]);
    }

    #[test]
    fn test_session_debug_redacts_credential() {
        let session = Session::new("me@example.com", "super-secret");
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
