//! Shared fixtures for the integration tests: mock marketplace routes,
//! zero-delay components and fake disk layers.

#![allow(dead_code)]

pub mod prompter;
pub mod socket_guard;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use megascans_sync::{
    AssetCatalog, DownloadPipeline, Endpoints, HttpClient, Ledger, PayloadWriter, Prompter,
    Reconciler, Session, SessionManager,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub use prompter::ScriptedPrompter;

pub const EMAIL: &str = "artist@example.com";
pub const TOKEN: &str = "token-123";

pub fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(Endpoints::with_base(&server.uri())).unwrap()
}

pub fn prompter(answers: &[&str]) -> Arc<ScriptedPrompter> {
    Arc::new(ScriptedPrompter::new(answers.iter().copied()))
}

pub fn session_for(
    server: &MockServer,
    email: &str,
    token: &str,
    prompter: Arc<ScriptedPrompter>,
) -> SessionManager {
    SessionManager::new(
        Session::new(email, token),
        client_for(server),
        prompter,
        Duration::ZERO,
    )
}

pub fn catalog_for(server: &MockServer) -> AssetCatalog {
    AssetCatalog::new(client_for(server), Duration::ZERO)
}

pub fn pipeline_for(server: &MockServer) -> DownloadPipeline {
    DownloadPipeline::new(client_for(server)).with_step_delay(Duration::ZERO)
}

pub fn reconciler_for(
    server: &MockServer,
    ledger_path: &Path,
    ledger_prompter: Arc<dyn Prompter>,
) -> Reconciler {
    Reconciler::new(
        Ledger::new(ledger_path, ledger_prompter),
        catalog_for(server),
        pipeline_for(server),
    )
}

/// Accepts any account/token pair.
pub async fn mount_account_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v1/users/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": EMAIL})))
        .mount(server)
        .await;
}

/// Catalog listing `ids` in the given order.
pub async fn mount_catalog(server: &MockServer, ids: &[&str]) {
    let assets: Vec<_> = ids
        .iter()
        .map(|id| json!({"assetID": id, "resolution": 8192, "exrAccess": "full"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/v1/assets/acquired"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assets))
        .mount(server)
        .await;
}

/// Manifest route answering `{ "id": "dl-<asset_id>" }` for `asset_id`.
pub async fn mount_manifest(server: &MockServer, asset_id: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/downloads"))
        .and(body_partial_json(json!({"asset": asset_id})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": download_id(asset_id)})))
        .mount(server)
        .await;
}

/// Payload route for `asset_id`'s transient id.
pub async fn mount_payload(server: &MockServer, asset_id: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", download_id(asset_id))))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

pub fn download_id(asset_id: &str) -> String {
    format!("dl-{asset_id}")
}

pub fn archive_bytes(asset_id: &str) -> Vec<u8> {
    format!("PK\u{3}\u{4} archive for {asset_id}").into_bytes()
}

/// Disk layer that accepts everything but reports one byte fewer.
#[derive(Debug, Default)]
pub struct ShortWriter {
    pub calls: AtomicUsize,
}

#[async_trait]
impl PayloadWriter for ShortWriter {
    async fn write_payload(&self, path: &Path, payload: &[u8]) -> std::io::Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let kept = &payload[..payload.len().saturating_sub(1)];
        tokio::fs::write(path, kept).await?;
        Ok(kept.len() as u64)
    }
}

/// Disk layer that always fails.
#[derive(Debug, Default)]
pub struct FailingWriter;

#[async_trait]
impl PayloadWriter for FailingWriter {
    async fn write_payload(&self, _path: &Path, _payload: &[u8]) -> std::io::Result<u64> {
        Err(std::io::Error::other("simulated disk full"))
    }
}

/// Disk layer that writes half the payload, then fails.
#[derive(Debug, Default)]
pub struct InterruptedWriter;

#[async_trait]
impl PayloadWriter for InterruptedWriter {
    async fn write_payload(&self, path: &Path, payload: &[u8]) -> std::io::Result<u64> {
        tokio::fs::write(path, &payload[..payload.len() / 2]).await?;
        Err(std::io::Error::other("simulated disconnect mid-write"))
    }
}
