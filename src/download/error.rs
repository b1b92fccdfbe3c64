//! Error types for the download module.
//!
//! This module defines structured errors for every step of the download
//! negotiation, each carrying the asset, URL or path needed to retry by hand.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::auth::AuthError;

/// Step of the download pipeline an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStep {
    /// Manifest negotiation (transient id request).
    Manifest,
    /// Binary payload retrieval.
    Payload,
    /// Writing the archive to disk.
    DiskWrite,
}

impl fmt::Display for DownloadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manifest => "manifest",
            Self::Payload => "payload",
            Self::DiskWrite => "disk write",
        })
    }
}

/// Errors that can occur while downloading one asset.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The manifest endpoint rejected the credential mid-run.
    #[error(
        "[AUTH] manifest request for {asset_id} rejected (HTTP {status})\n  Suggestion: the token has most likely expired; update it and rerun"
    )]
    AuthRejected {
        /// Asset being negotiated.
        asset_id: String,
        /// 401 or 403.
        status: u16,
    },

    /// Re-authentication after a manifest rejection could not complete.
    #[error("re-authentication for {asset_id} failed: {source}")]
    Reauthentication {
        /// Asset being negotiated.
        asset_id: String,
        /// Why authentication stopped.
        #[source]
        source: AuthError,
    },

    /// The manifest endpoint refused the request.
    #[error("manifest negotiation for {asset_id} failed with HTTP {status}")]
    Manifest {
        /// Asset being negotiated.
        asset_id: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The manifest response carried no usable download id.
    #[error("manifest response for {asset_id} has no download id")]
    MissingDownloadId {
        /// Asset being negotiated.
        asset_id: String,
    },

    /// The manifest response was not valid JSON.
    #[error("malformed manifest response for {asset_id}: {source}")]
    Decode {
        /// Asset being negotiated.
        asset_id: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest request body could not be serialized.
    #[error("could not encode manifest request for {asset_id}: {source}")]
    Encode {
        /// Asset being negotiated.
        asset_id: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error during {step} step at {url}: {source}")]
    Network {
        /// Step that failed.
        step: DownloadStep,
        /// The URL being requested.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout during {step} step at {url}")]
    Timeout {
        /// Step that failed.
        step: DownloadStep,
        /// The URL being requested.
        url: String,
    },

    /// Payload endpoint answered with a non-200 status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The payload URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Payload endpoint answered 200 with no bytes.
    #[error("download body for {asset_id} is empty")]
    EmptyPayload {
        /// Asset being downloaded.
        asset_id: String,
    },

    /// A configured endpoint cannot be turned into a request URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// File system error creating or writing the archive.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Fewer bytes reached disk than the payload holds.
    #[error("short write to {path}: expected {expected_bytes} bytes, wrote {actual_bytes}")]
    ShortWrite {
        /// Archive path.
        path: PathBuf,
        /// Payload length.
        expected_bytes: u64,
        /// Bytes reported written.
        actual_bytes: u64,
    },
}

impl DownloadError {
    /// Maps a reqwest failure in `step` to `Timeout` or `Network`.
    pub fn transport(step: DownloadStep, url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                step,
                url: url.into(),
            }
        } else {
            Self::Network {
                step,
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Step of the pipeline this error belongs to.
    #[must_use]
    pub fn step(&self) -> DownloadStep {
        match self {
            Self::AuthRejected { .. }
            | Self::Reauthentication { .. }
            | Self::Manifest { .. }
            | Self::MissingDownloadId { .. }
            | Self::Decode { .. }
            | Self::Encode { .. } => DownloadStep::Manifest,
            Self::Network { step, .. } | Self::Timeout { step, .. } => *step,
            Self::HttpStatus { .. } | Self::EmptyPayload { .. } | Self::InvalidUrl { .. } => {
                DownloadStep::Payload
            }
            Self::Io { .. } | Self::ShortWrite { .. } => DownloadStep::DiskWrite,
        }
    }

    /// Whether the error is a rejected credential.
    #[must_use]
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::AuthRejected { .. })
    }
}
