//! HTTP client wrapper shared by every remote step.
//!
//! This module provides the `HttpClient` struct which pairs a pooled
//! `reqwest::Client` (timeouts, User-Agent) with the endpoints it talks to.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::instrument;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::config::Endpoints;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the marketplace API.
///
/// Created once per run and cloned into each component; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    endpoints: Arc<Endpoints>,
}

impl HttpClient {
    /// Creates a client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes (for large archives)
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn new(endpoints: Endpoints) -> Result<Self, reqwest::Error> {
        Self::with_timeouts(endpoints, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    #[instrument(level = "debug", skip(endpoints))]
    pub fn with_timeouts(
        endpoints: Endpoints,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoints: Arc::new(endpoints),
        })
    }

    /// Endpoints this client targets.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Formats a credential for the `Authorization` header of bearer-authenticated endpoints.
#[must_use]
pub(crate) fn bearer(credential: &str) -> String {
    format!("Bearer {credential}")
}
