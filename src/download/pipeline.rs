//! Three-step download negotiation for a single asset.
//!
//! 1. `POST` a manifest naming the asset and export preferences; the service
//!    answers with a transient download id.
//! 2. `GET` the payload for that id, uncompressed.
//! 3. Write `{destination}/{asset_id}.zip` and verify every byte landed.
//!
//! A fixed delay precedes each remote step. Nothing is retried, except the
//! manifest step after re-authentication when
//! [`AuthFailurePolicy::Reauthenticate`] is configured.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::{HttpClient, bearer};
use super::constants::{ARCHIVE_EXTENSION, DEFAULT_STEP_DELAY};
use super::error::{DownloadError, DownloadStep};
use super::manifest::{DownloadManifest, ExportPreferences, ManifestResponse};
use super::writer::{FsPayloadWriter, PayloadWriter};
use crate::auth::SessionManager;
use crate::catalog::Asset;
use crate::config::AuthFailurePolicy;

/// Downloads individual assets.
#[derive(Clone)]
pub struct DownloadPipeline {
    client: HttpClient,
    writer: Arc<dyn PayloadWriter>,
    preferences: ExportPreferences,
    step_delay: Duration,
    auth_policy: AuthFailurePolicy,
}

impl std::fmt::Debug for DownloadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadPipeline")
            .field("preferences", &self.preferences)
            .field("step_delay", &self.step_delay)
            .field("auth_policy", &self.auth_policy)
            .finish_non_exhaustive()
    }
}

impl DownloadPipeline {
    /// Creates a pipeline writing to the file system with default preferences,
    /// the default step delay and the fail-fast auth policy.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            writer: Arc::new(FsPayloadWriter),
            preferences: ExportPreferences::default(),
            step_delay: DEFAULT_STEP_DELAY,
            auth_policy: AuthFailurePolicy::default(),
        }
    }

    /// Replaces the disk layer.
    #[must_use]
    pub fn with_writer(mut self, writer: Arc<dyn PayloadWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Replaces the export preferences sent with each manifest.
    #[must_use]
    pub fn with_preferences(mut self, preferences: ExportPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Sets the pause before each remote step.
    #[must_use]
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Sets how a 401/403 at the manifest step is handled.
    #[must_use]
    pub fn with_auth_policy(mut self, auth_policy: AuthFailurePolicy) -> Self {
        self.auth_policy = auth_policy;
        self
    }

    /// Downloads `asset` into `destination` and returns the archive path.
    ///
    /// The path is returned only after the written byte count has been
    /// checked against the payload length.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::AuthRejected`] if the manifest step gets 401/403
    ///   (after one re-authenticated retry under the reauthenticate policy)
    /// - [`DownloadError::Manifest`], [`DownloadError::MissingDownloadId`],
    ///   [`DownloadError::Decode`] for a failed negotiation
    /// - [`DownloadError::HttpStatus`], [`DownloadError::Network`],
    ///   [`DownloadError::Timeout`] for transport failures
    /// - [`DownloadError::EmptyPayload`] for a zero-length payload
    /// - [`DownloadError::Io`], [`DownloadError::ShortWrite`] for disk failures
    #[instrument(skip(self, session, asset), fields(asset_id = %asset.asset_id))]
    pub async fn download(
        &self,
        session: &mut SessionManager,
        asset: &Asset,
        destination: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let download_id = self.negotiate(session, asset).await?;
        let payload = self
            .fetch_payload(session.current_credential(), &asset.asset_id, &download_id)
            .await?;
        self.save(asset, &payload, destination).await
    }

    async fn negotiate(
        &self,
        session: &mut SessionManager,
        asset: &Asset,
    ) -> Result<String, DownloadError> {
        let first_attempt = self
            .request_manifest(session.current_credential(), asset)
            .await;
        match first_attempt {
            Err(error)
                if error.is_auth_rejected()
                    && self.auth_policy == AuthFailurePolicy::Reauthenticate =>
            {
                warn!(error = %error, "manifest rejected; re-authenticating before one retry");
                session
                    .refresh_credential()
                    .await
                    .map_err(|source| DownloadError::Reauthentication {
                        asset_id: asset.asset_id.clone(),
                        source,
                    })?;
                self.request_manifest(session.current_credential(), asset)
                    .await
            }
            other => other,
        }
    }

    async fn request_manifest(
        &self,
        credential: &str,
        asset: &Asset,
    ) -> Result<String, DownloadError> {
        tokio::time::sleep(self.step_delay).await;
        info!("initiating download");

        let url = self.client.endpoints().downloads.as_str();
        let body = serde_json::to_vec(&DownloadManifest::new(&asset.asset_id, &self.preferences))
            .map_err(|source| DownloadError::Encode {
                asset_id: asset.asset_id.clone(),
                source,
            })?;

        let response = self
            .client
            .inner()
            .post(url)
            .header(AUTHORIZATION, bearer(credential))
            .header(CONTENT_TYPE, "application/json")
            .body(body.clone())
            .send()
            .await
            .map_err(|e| DownloadError::transport(DownloadStep::Manifest, url, e))?;

        match response.status() {
            StatusCode::OK => {}
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                return Err(DownloadError::AuthRejected {
                    asset_id: asset.asset_id.clone(),
                    status: status.as_u16(),
                });
            }
            status => {
                if status == StatusCode::BAD_REQUEST {
                    warn!(
                        request = %String::from_utf8_lossy(&body),
                        "manifest request rejected as malformed"
                    );
                }
                return Err(DownloadError::Manifest {
                    asset_id: asset.asset_id.clone(),
                    status: status.as_u16(),
                });
            }
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| DownloadError::transport(DownloadStep::Manifest, url, e))?;
        let manifest: ManifestResponse =
            serde_json::from_slice(&raw).map_err(|source| DownloadError::Decode {
                asset_id: asset.asset_id.clone(),
                source,
            })?;
        if manifest.id.is_empty() {
            return Err(DownloadError::MissingDownloadId {
                asset_id: asset.asset_id.clone(),
            });
        }

        debug!(download_id = %manifest.id, "manifest accepted");
        Ok(manifest.id)
    }

    async fn fetch_payload(
        &self,
        credential: &str,
        asset_id: &str,
        download_id: &str,
    ) -> Result<Vec<u8>, DownloadError> {
        tokio::time::sleep(self.step_delay).await;
        info!("requesting download");

        let endpoints = self.client.endpoints();
        let url = payload_url(&endpoints.asset_downloads, download_id, &endpoints.downloads)?;

        // The payload endpoint takes the raw token, without the Bearer scheme.
        let response = self
            .client
            .inner()
            .get(url.clone())
            .header(ACCEPT_ENCODING, "identity")
            .header(AUTHORIZATION, credential)
            .send()
            .await
            .map_err(|e| DownloadError::transport(DownloadStep::Payload, url.as_str(), e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut payload = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| DownloadError::transport(DownloadStep::Payload, url.as_str(), e))?;
            payload.extend_from_slice(&chunk);
        }

        if payload.is_empty() {
            return Err(DownloadError::EmptyPayload {
                asset_id: asset_id.to_string(),
            });
        }

        debug!(bytes = payload.len(), "payload received");
        Ok(payload)
    }

    async fn save(
        &self,
        asset: &Asset,
        payload: &[u8],
        destination: &Path,
    ) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        let path = archive_path(destination, &asset.asset_id);
        debug!(path = %path.display(), "saving download to disk");

        let expected_bytes = payload.len() as u64;
        let actual_bytes = match self.writer.write_payload(&path, payload).await {
            Ok(written) => written,
            Err(error) => {
                discard_partial(&path).await;
                return Err(DownloadError::io(path, error));
            }
        };

        if actual_bytes != expected_bytes {
            discard_partial(&path).await;
            return Err(DownloadError::ShortWrite {
                path,
                expected_bytes,
                actual_bytes,
            });
        }

        info!(path = %path.display(), bytes = expected_bytes, "download saved");
        Ok(path)
    }
}

/// Removes an archive that failed verification so it is never mistaken for a download.
async fn discard_partial(path: &Path) {
    debug!(path = %path.display(), "removing incomplete archive");
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => {
            warn!(path = %path.display(), error = %error, "could not remove incomplete archive");
        }
    }
}

/// `{destination}/{asset_id}.zip`
#[must_use]
pub fn archive_path(destination: &Path, asset_id: &str) -> PathBuf {
    destination.join(format!("{asset_id}.{ARCHIVE_EXTENSION}"))
}

/// Builds `{base}/{download_id}?preserveStructure=true&url={manifest_endpoint}`.
fn payload_url(base: &str, download_id: &str, manifest_endpoint: &str) -> Result<Url, DownloadError> {
    let mut url = Url::parse(base).map_err(|_| DownloadError::invalid_url(base))?;
    url.path_segments_mut()
        .map_err(|()| DownloadError::invalid_url(base))?
        .pop_if_empty()
        .push(download_id);
    url.query_pairs_mut()
        .append_pair("preserveStructure", "true")
        .append_pair("url", manifest_endpoint);
    Ok(url)
}
