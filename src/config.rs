//! Remote endpoints, run policies and default ledger location.

use std::path::PathBuf;

use clap::ValueEnum;

/// Account verification endpoint; the email is appended as a path segment.
pub const DEFAULT_ACCOUNTS_ENDPOINT: &str = "https://accounts.quixel.com/api/v1/users";

/// Catalog of assets acquired by the authenticated account.
pub const DEFAULT_ACQUIRED_ASSETS_ENDPOINT: &str = "https://quixel.com/v1/assets/acquired";

/// Download manifest negotiation endpoint.
pub const DEFAULT_DOWNLOADS_ENDPOINT: &str = "https://quixel.com/v1/downloads";

/// Binary payload endpoint; the transient download id is appended as a path segment.
pub const DEFAULT_ASSET_DOWNLOADS_ENDPOINT: &str = "https://assetdownloads.quixel.com/download";

/// File name of the ledger when no explicit path is configured.
pub const DEFAULT_LEDGER_FILE_NAME: &str = "downloadedContent.json";

/// The four remote endpoints the tool talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Account verification (`GET {accounts}/{email}?email={email}`).
    pub accounts: String,
    /// Acquired asset catalog.
    pub acquired_assets: String,
    /// Manifest negotiation (`POST`).
    pub downloads: String,
    /// Payload retrieval (`GET {asset_downloads}/{id}`).
    pub asset_downloads: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS_ENDPOINT.to_string(),
            acquired_assets: DEFAULT_ACQUIRED_ASSETS_ENDPOINT.to_string(),
            downloads: DEFAULT_DOWNLOADS_ENDPOINT.to_string(),
            asset_downloads: DEFAULT_ASSET_DOWNLOADS_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    /// Points every endpoint at a single host, keeping the production paths.
    ///
    /// Used to run the full protocol against a local mock server.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            accounts: format!("{base}/api/v1/users"),
            acquired_assets: format!("{base}/v1/assets/acquired"),
            downloads: format!("{base}/v1/downloads"),
            asset_downloads: format!("{base}/download"),
        }
    }
}

/// What the download pipeline does when the manifest step is rejected with 401/403.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AuthFailurePolicy {
    /// Abort the run; the operator refreshes the token and reruns.
    #[default]
    FailFast,
    /// Run the interactive re-authentication loop, then retry the manifest once.
    Reauthenticate,
}

/// Resolves the ledger path used when none is given on the command line.
///
/// The ledger lives next to the executable so every invocation of the same
/// binary shares one library record. Falls back to the working directory when
/// the executable path cannot be determined.
#[must_use]
pub fn resolve_default_ledger_path() -> PathBuf {
    match std::env::current_exe() {
        Ok(executable) => executable
            .parent()
            .map_or_else(|| PathBuf::from("."), std::path::Path::to_path_buf)
            .join(DEFAULT_LEDGER_FILE_NAME),
        Err(error) => {
            tracing::warn!(error = %error, "could not determine executable path; using working directory for ledger");
            PathBuf::from(DEFAULT_LEDGER_FILE_NAME)
        }
    }
}
