//! CLI entry point for megascans-sync.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use megascans_sync::{
    AssetCatalog, DownloadPipeline, Endpoints, HttpClient, Ledger, Prompter, Reconciler, Session,
    SessionManager, StdinPrompter, resolve_default_ledger_path,
};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    info!("megascans-sync starting");

    let prompter: Arc<dyn Prompter> = Arc::new(StdinPrompter::new());
    let ledger_path = args.ledger.unwrap_or_else(resolve_default_ledger_path);
    let ledger = Ledger::new(ledger_path, Arc::clone(&prompter));

    // Load (or create) the ledger before asking for credentials, so a first
    // run asks for the downloads folder up front.
    let state = ledger
        .load()
        .await
        .with_context(|| format!("Failed to load ledger '{}'", ledger.path().display()))?;
    info!(
        ledger = %ledger.path().display(),
        folder = %state.downloads_folder.display(),
        recorded = state.len(),
        "ledger ready"
    );

    let client = HttpClient::with_timeouts(
        Endpoints::default(),
        args.connect_timeout,
        args.read_timeout,
    )
    .context("Failed to build HTTP client")?;
    let step_delay = Duration::from_millis(args.step_delay_ms);

    let session = Session::from_prompts(prompter.as_ref(), args.email)?;
    let mut session = SessionManager::new(session, client.clone(), Arc::clone(&prompter), step_delay);

    let pipeline = DownloadPipeline::new(client.clone())
        .with_step_delay(step_delay)
        .with_auth_policy(args.on_download_auth_failure);
    let reconciler = Reconciler::new(ledger, AssetCatalog::new(client, step_delay), pipeline);

    let summary = reconciler
        .run(&mut session)
        .await
        .context("Run aborted; recorded downloads are kept, run again to resume")?;

    info!(
        owned = summary.owned,
        already_downloaded = summary.already_downloaded,
        downloaded = summary.downloaded.len(),
        "Library up to date"
    );
    Ok(())
}
