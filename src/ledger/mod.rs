//! Durable record of completed downloads.
//!
//! The ledger is a single JSON file holding the downloads folder chosen by the
//! operator and every asset that has been fully written to disk:
//!
//! ```json
//! {
//!     "downloadsFolder": "/home/me/Megascans",
//!     "SuccessfulDownloads": [
//!         { "assetID": "abc123", "resolution": 8192, "exrAccess": "full" }
//!     ]
//! }
//! ```
//!
//! The file is the source of truth across runs. Every read reloads it and
//! every write re-serializes the whole document. Fields this version does not
//! know about are carried through a rewrite untouched.

mod error;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, info, instrument};

pub use error::LedgerError;

use crate::catalog::Asset;
use crate::prompt::{DOWNLOADS_FOLDER_PROMPT, Prompter};

/// One completed download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Identifier of the downloaded asset.
    #[serde(rename = "assetID")]
    pub asset_id: String,
    /// License tier known at download time.
    #[serde(default)]
    pub resolution: i64,
    /// Export permission known at download time.
    #[serde(rename = "exrAccess", default)]
    pub exr_access: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<&Asset> for LedgerEntry {
    fn from(asset: &Asset) -> Self {
        Self {
            asset_id: asset.asset_id.clone(),
            resolution: asset.resolution,
            exr_access: asset.exr_access.clone(),
            extra: Map::new(),
        }
    }
}

/// Full contents of the ledger file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Folder every asset archive is written to.
    #[serde(rename = "downloadsFolder", default)]
    pub downloads_folder: PathBuf,
    /// Completed downloads, oldest first.
    #[serde(
        rename = "SuccessfulDownloads",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub successful_downloads: Vec<LedgerEntry>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl LedgerState {
    /// Creates an empty ledger targeting `downloads_folder`.
    pub fn new(downloads_folder: impl Into<PathBuf>) -> Self {
        Self {
            downloads_folder: downloads_folder.into(),
            successful_downloads: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Whether `asset_id` has already been downloaded.
    ///
    /// Linear scan; personal libraries stay small enough that no index is kept.
    #[must_use]
    pub fn contains_asset(&self, asset_id: &str) -> bool {
        self.successful_downloads
            .iter()
            .any(|entry| entry.asset_id == asset_id)
    }

    /// Number of completed downloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.successful_downloads.len()
    }

    /// Whether nothing has been downloaded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successful_downloads.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<LedgerEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<LedgerEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Handle on the ledger file.
///
/// Holds no cached state: [`load`](Self::load) always reads the file and
/// [`record_success`](Self::record_success) always rewrites it.
pub struct Ledger {
    path: PathBuf,
    prompter: Arc<dyn Prompter>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Creates a handle for the ledger at `path`.
    ///
    /// `prompter` supplies the downloads folder if the file has to be created.
    pub fn new(path: impl Into<PathBuf>, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            path: path.into(),
            prompter,
        }
    }

    /// Location of the ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the ledger, creating it first if it does not exist.
    ///
    /// Creation asks the operator for a downloads folder and writes an empty
    /// ledger before reading it back.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the file cannot be read, created or decoded.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<LedgerState, LedgerError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                self.bootstrap().await?;
                fs::read(&self.path)
                    .await
                    .map_err(|e| LedgerError::io(&self.path, e))?
            }
            Err(error) => return Err(LedgerError::io(&self.path, error)),
        };

        let state: LedgerState =
            serde_json::from_slice(&raw).map_err(|e| LedgerError::decode(&self.path, e))?;
        debug!(entries = state.len(), "ledger loaded");
        Ok(state)
    }

    /// Appends `entry` and rewrites the ledger, returning the new contents.
    ///
    /// The file is re-read first so the write is based on what is on disk,
    /// not on a snapshot taken earlier in the run.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the reload, encoding or write fails.
    #[instrument(skip(self, entry), fields(path = %self.path.display(), asset_id = %entry.asset_id))]
    pub async fn record_success(&self, entry: LedgerEntry) -> Result<LedgerState, LedgerError> {
        let mut state = self.load().await?;
        state.successful_downloads.push(entry);
        self.write_state(&state).await?;
        debug!(entries = state.len(), "ledger updated");
        Ok(state)
    }

    async fn bootstrap(&self) -> Result<(), LedgerError> {
        info!("no ledger found, creating one");
        let downloads_folder =
            self.prompter
                .prompt(DOWNLOADS_FOLDER_PROMPT)
                .map_err(|source| LedgerError::Prompt {
                    path: self.path.clone(),
                    source,
                })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LedgerError::io(parent, e))?;
        }

        self.write_state(&LedgerState::new(downloads_folder)).await
    }

    /// Replaces the ledger file with `state`.
    ///
    /// Writes a sibling staging file and renames it over the ledger so an
    /// interrupted write leaves the previous contents intact.
    async fn write_state(&self, state: &LedgerState) -> Result<(), LedgerError> {
        let encoded = encode_state(state).map_err(|e| LedgerError::encode(&self.path, e))?;
        let staging = staging_path(&self.path);
        fs::write(&staging, &encoded)
            .await
            .map_err(|e| LedgerError::io(&staging, e))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| LedgerError::io(&self.path, e))
    }
}

/// Serializes the ledger with four-space indentation.
fn encode_state(state: &LedgerState) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    state.serialize(&mut serializer)?;
    Ok(buffer)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("ledger"));
    name.push(".tmp");
    path.with_file_name(name)
}
