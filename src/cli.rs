//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use megascans_sync::AuthFailurePolicy;
use megascans_sync::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Download every Megascans asset your account owns that is not on disk yet.
///
/// Progress is kept in a JSON ledger, so rerunning only fetches what is new
/// or what a previous run did not finish.
#[derive(Parser, Debug)]
#[command(name = "megascans-sync")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Ledger file (default: downloadedContent.json next to the executable)
    #[arg(long, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// Account email; prompted for when omitted
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Pause before every remote request in milliseconds (0-60000)
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub step_delay_ms: u64,

    /// What to do when the download manifest request is rejected as unauthorized
    #[arg(long, value_enum, default_value_t = AuthFailurePolicy::FailFast)]
    pub on_download_auth_failure: AuthFailurePolicy,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// HTTP read timeout in seconds (1-3600)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: u64,
}
