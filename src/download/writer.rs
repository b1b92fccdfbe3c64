//! Disk layer for downloaded archives.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Writes a payload to `path` and reports how many bytes were accepted.
///
/// The pipeline compares the returned count with the payload length, so an
/// implementation must report what it actually wrote rather than fail silently.
#[async_trait]
pub trait PayloadWriter: Send + Sync {
    /// Creates or truncates `path` and writes `payload` into it.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be created, written or synced.
    async fn write_payload(&self, path: &Path, payload: &[u8]) -> std::io::Result<u64>;
}

/// Writes archives to the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPayloadWriter;

#[async_trait]
impl PayloadWriter for FsPayloadWriter {
    async fn write_payload(&self, path: &Path, payload: &[u8]) -> std::io::Result<u64> {
        let mut file = File::create(path).await?;
        let mut written = 0usize;
        while written < payload.len() {
            let n = file.write(&payload[written..]).await?;
            if n == 0 {
                break;
            }
            written += n;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written as u64)
    }
}
