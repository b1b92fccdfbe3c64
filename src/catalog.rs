//! Acquired-asset catalog.
//!
//! Fetches the full list of assets the authenticated account owns. The
//! session is re-verified before every fetch rather than after a failure.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::auth::{AuthError, SessionManager};
use crate::download::HttpClient;
use crate::download::client::bearer;

/// One entitlement owned by the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Stable unique identifier; the dedup key.
    #[serde(rename = "assetID")]
    pub asset_id: String,
    /// License tier marker (not a pixel resolution).
    #[serde(default)]
    pub resolution: i64,
    /// Extended export permission flag.
    #[serde(rename = "exrAccess", default)]
    pub exr_access: String,
}

/// Errors from [`AssetCatalog::fetch_owned_assets`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The pre-fetch authentication could not complete.
    #[error("authentication failed before catalog fetch: {0}")]
    Auth(#[from] AuthError),

    /// The catalog endpoint rejected the freshly verified credential.
    #[error("catalog request rejected with HTTP {status} at {url}")]
    AuthRejected {
        /// Catalog URL.
        url: String,
        /// 401 or 403.
        status: u16,
    },

    /// Connection-level failure.
    #[error("network error fetching catalog from {url}: {source}")]
    Network {
        /// Catalog URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The request timed out.
    #[error("timeout fetching catalog from {url}")]
    Timeout {
        /// Catalog URL.
        url: String,
    },

    /// Any non-200 status other than 401/403.
    #[error("HTTP {status} fetching catalog from {url}")]
    HttpStatus {
        /// Catalog URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The body was not a JSON array of assets.
    #[error("malformed catalog response from {url}: {source}")]
    Decode {
        /// Catalog URL.
        url: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The account owns nothing.
    #[error("no acquired assets were found for this account")]
    Empty,
}

impl CatalogError {
    fn transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Reads the acquired-asset catalog.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    client: HttpClient,
    step_delay: Duration,
}

impl AssetCatalog {
    /// Creates a catalog reader. `step_delay` is slept before the catalog request.
    #[must_use]
    pub fn new(client: HttpClient, step_delay: Duration) -> Self {
        Self { client, step_delay }
    }

    /// Authenticates, then returns every owned asset in the order the service lists them.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Auth`] if authentication cannot complete
    /// - [`CatalogError::AuthRejected`] on 401/403 from the catalog itself
    /// - [`CatalogError::HttpStatus`], [`CatalogError::Network`], [`CatalogError::Timeout`]
    ///   on transport failures
    /// - [`CatalogError::Decode`] if the body is not an asset array
    /// - [`CatalogError::Empty`] if the array is empty
    #[instrument(skip(self, session))]
    pub async fn fetch_owned_assets(
        &self,
        session: &mut SessionManager,
    ) -> Result<Vec<Asset>, CatalogError> {
        tokio::time::sleep(self.step_delay).await;
        info!("retrieving acquired assets");
        session.authenticate().await?;

        let url = self.client.endpoints().acquired_assets.as_str();
        let response = self
            .client
            .inner()
            .get(url)
            .header(AUTHORIZATION, bearer(session.current_credential()))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::transport(url, e))?;

        match response.status() {
            StatusCode::OK => {}
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                return Err(CatalogError::AuthRejected {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            status => {
                return Err(CatalogError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::transport(url, e))?;
        let assets = parse_catalog(&body).map_err(|source| CatalogError::Decode {
            url: url.to_string(),
            source,
        })?;
        if assets.is_empty() {
            return Err(CatalogError::Empty);
        }

        debug!(count = assets.len(), "catalog decoded");
        Ok(assets)
    }
}

fn parse_catalog(body: &[u8]) -> Result<Vec<Asset>, serde_json::Error> {
    serde_json::from_slice(body)
}
