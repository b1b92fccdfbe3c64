//! Reconciliation: owned assets minus the ledger, downloaded in catalog order.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, instrument};

use crate::auth::{AuthError, SessionManager};
use crate::catalog::{Asset, AssetCatalog, CatalogError};
use crate::download::{DownloadError, DownloadPipeline, DownloadStep};
use crate::ledger::{Ledger, LedgerEntry, LedgerError, LedgerState};

/// Errors that abort a reconciliation run.
///
/// Every variant is fatal for the run; assets recorded before the failure
/// stay recorded and are skipped next time.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The ledger could not be loaded.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Authentication could not complete.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The owned-asset catalog could not be fetched.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// An asset failed to download.
    #[error(
        "download of {asset_id} failed at the {step} step ({completed} of {pending} pending assets completed): {source}"
    )]
    Download {
        /// Asset that failed.
        asset_id: String,
        /// Pipeline step that failed.
        step: DownloadStep,
        /// Assets downloaded and recorded earlier in this run.
        completed: usize,
        /// Assets that were pending at the start of this run.
        pending: usize,
        /// The pipeline error.
        #[source]
        source: DownloadError,
    },

    /// An asset was written to disk but could not be added to the ledger.
    #[error("{asset_id} was saved to {path} but could not be recorded: {source}")]
    Record {
        /// Asset that was downloaded.
        asset_id: String,
        /// Archive that was written.
        path: PathBuf,
        /// The ledger error.
        #[source]
        source: LedgerError,
    },
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Assets listed by the catalog.
    pub owned: usize,
    /// Owned assets already in the ledger.
    pub already_downloaded: usize,
    /// Archives written this run, in download order.
    pub downloaded: Vec<PathBuf>,
}

/// Returns the owned assets not yet in the ledger, in catalog order.
#[must_use]
pub fn pending_assets(owned: &[Asset], ledger: &LedgerState) -> Vec<Asset> {
    owned
        .iter()
        .filter(|asset| !ledger.contains_asset(&asset.asset_id))
        .cloned()
        .collect()
}

/// Drives a full synchronization run.
#[derive(Debug)]
pub struct Reconciler {
    ledger: Ledger,
    catalog: AssetCatalog,
    pipeline: DownloadPipeline,
}

impl Reconciler {
    #[must_use]
    pub fn new(ledger: Ledger, catalog: AssetCatalog, pipeline: DownloadPipeline) -> Self {
        Self {
            ledger,
            catalog,
            pipeline,
        }
    }

    /// The ledger this reconciler records into.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Downloads every owned asset missing from the ledger.
    ///
    /// Assets are attempted one at a time in catalog order; each is recorded
    /// only after its archive is verified on disk. The first failure aborts
    /// the run.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] for the first ledger, authentication,
    /// catalog, download or recording failure.
    #[instrument(skip_all)]
    pub async fn run(&self, session: &mut SessionManager) -> Result<RunSummary, ReconcileError> {
        let state = self.ledger.load().await?;
        session.authenticate().await?;
        let owned = self.catalog.fetch_owned_assets(session).await?;

        let pending = pending_assets(&owned, &state);
        let mut summary = RunSummary {
            owned: owned.len(),
            already_downloaded: owned.len() - pending.len(),
            downloaded: Vec::with_capacity(pending.len()),
        };
        info!(
            owned = summary.owned,
            already_downloaded = summary.already_downloaded,
            pending = pending.len(),
            folder = %state.downloads_folder.display(),
            "reconciling library"
        );

        for (index, asset) in pending.iter().enumerate() {
            info!(
                asset_id = %asset.asset_id,
                "downloading asset {} of {}",
                index + 1,
                pending.len()
            );

            let path = self
                .pipeline
                .download(session, asset, &state.downloads_folder)
                .await
                .map_err(|source| ReconcileError::Download {
                    asset_id: asset.asset_id.clone(),
                    step: source.step(),
                    completed: index,
                    pending: pending.len(),
                    source,
                })?;

            self.ledger
                .record_success(LedgerEntry::from(asset))
                .await
                .map_err(|source| ReconcileError::Record {
                    asset_id: asset.asset_id.clone(),
                    path: path.clone(),
                    source,
                })?;

            info!(asset_id = %asset.asset_id, path = %path.display(), "recorded download");
            summary.downloaded.push(path);
        }

        Ok(summary)
    }
}
