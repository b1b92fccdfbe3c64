//! Megascans library synchronization.
//!
//! This library keeps a local folder in step with the assets an account has
//! acquired on the Megascans marketplace: it lists the owned assets, skips the
//! ones already recorded in a JSON ledger, and downloads the rest one at a
//! time, recording each only after its archive is verified on disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`ledger`] - Durable record of completed downloads (and the downloads folder)
//! - [`auth`] - Session ownership and interactive re-authentication
//! - [`catalog`] - Owned-asset listing
//! - [`download`] - Manifest, payload and disk steps for one asset
//! - [`app`] - The reconciliation run tying them together
//! - [`prompt`] - Operator input, injectable for tests
//! - [`config`] - Endpoints and run policies

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod download;
pub mod ledger;
pub mod prompt;

// Re-export commonly used types
pub use app::{ReconcileError, Reconciler, RunSummary, pending_assets};
pub use auth::{AuthError, Session, SessionManager};
pub use catalog::{Asset, AssetCatalog, CatalogError};
pub use config::{AuthFailurePolicy, Endpoints, resolve_default_ledger_path};
pub use download::{
    DEFAULT_STEP_DELAY, DownloadError, DownloadPipeline, DownloadStep, ExportPreferences,
    FsPayloadWriter, HttpClient, PayloadWriter,
};
pub use ledger::{Ledger, LedgerEntry, LedgerError, LedgerState};
pub use prompt::{Prompter, StdinPrompter};
