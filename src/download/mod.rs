//! Per-asset download negotiation.
//!
//! This module turns one owned [`Asset`](crate::catalog::Asset) into a verified
//! archive on disk.
//!
//! # Features
//!
//! - Manifest negotiation with configurable [`ExportPreferences`]
//! - Uncompressed payload retrieval (`Accept-Encoding: identity`)
//! - Byte-count verification of the written archive via [`PayloadWriter`]
//! - Fixed pacing delay before every remote step
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use megascans_sync::auth::{Session, SessionManager};
//! use megascans_sync::catalog::Asset;
//! use megascans_sync::config::Endpoints;
//! use megascans_sync::download::{DownloadPipeline, HttpClient};
//! use megascans_sync::prompt::StdinPrompter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(Endpoints::default())?;
//! let mut session = SessionManager::new(
//!     Session::new("me@example.com", "token"),
//!     client.clone(),
//!     Arc::new(StdinPrompter::new()),
//!     Duration::from_secs(1),
//! );
//! let asset = Asset { asset_id: "abc123".into(), resolution: 8192, exr_access: String::new() };
//! let path = DownloadPipeline::new(client)
//!     .download(&mut session, &asset, Path::new("./downloads"))
//!     .await?;
//! println!("Downloaded: {}", path.display());
//! # Ok(())
//! # }
//! ```

pub(crate) mod client;
mod constants;
mod error;
mod manifest;
mod pipeline;
mod writer;

pub use client::HttpClient;
pub use constants::{
    ARCHIVE_EXTENSION, CONNECT_TIMEOUT_SECS, DEFAULT_STEP_DELAY, READ_TIMEOUT_SECS,
};
pub use error::{DownloadError, DownloadStep};
pub use manifest::{DEFAULT_MESH_MIME_TYPE, DownloadManifest, ExportPreferences, ManifestResponse};
pub use pipeline::{DownloadPipeline, archive_path};
pub use writer::{FsPayloadWriter, PayloadWriter};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
