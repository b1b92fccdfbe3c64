//! Constants for the download module (timeouts, pacing, output naming).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large asset archives).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Fixed pause before every remote step, as a courtesy to the marketplace API.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(1);

/// Extension of every saved asset archive.
pub const ARCHIVE_EXTENSION: &str = "zip";
