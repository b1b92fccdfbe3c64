//! Run orchestration.

mod reconcile;

pub use reconcile::{ReconcileError, Reconciler, RunSummary, pending_assets};
