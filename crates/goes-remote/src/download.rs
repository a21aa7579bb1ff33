//! Bounded-concurrency download of filtered remote keys, with idempotent skip of
//! files already present at the destination.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use aws_sdk_s3::primitives::ByteStream;
use futures::stream::{self, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::config::RemoteConfig;
use crate::error::DownloadError;

/// Outcome of [`download`]: every local path actually written, and every remote key
/// that could not be fetched after exhausting retries.
#[derive(Debug, Clone, Default)]
pub struct DownloadOutcome {
    /// Local paths for objects downloaded in this call (does not include files that
    /// were already present and skipped).
    pub downloaded: Vec<PathBuf>,
    /// Remote keys that failed after retrying `config.retry_attempts` times.
    pub failed: Vec<String>,
}

/// Reports download progress as `(completed, total)`, where `completed` counts both
/// newly downloaded files and those skipped because they already existed.
pub trait ProgressSink: Send + Sync {
    /// Called once before any downloads start, with the number of pre-existing
    /// files already skipped, and again every `config.progress_step` completions
    /// and at the final count.
    fn report(&self, completed: u64, total: u64);
}

impl<F: Fn(u64, u64) + Send + Sync> ProgressSink for F {
    fn report(&self, completed: u64, total: u64) {
        self(completed, total);
    }
}

/// Downloads `keys` (filename → remote key) from `bucket` into `dest`, skipping any
/// file already present on disk with nonzero size.
///
/// Runs up to `config.max_workers` downloads concurrently, each retrying up to
/// `config.retry_attempts` times with [`RemoteConfig::backoff_delay`]. Per-key
/// failures are collected rather than propagated: the whole call only returns
/// `Err` if `dest` itself cannot be prepared.
///
/// # Errors
///
/// Returns a [`DownloadError`] if `dest` cannot be created.
pub async fn download(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    keys: &HashMap<String, String>,
    dest: &Path,
    config: &RemoteConfig,
    progress: &dyn ProgressSink,
) -> Result<DownloadOutcome, DownloadError> {
    std::fs::create_dir_all(dest).map_err(|e| DownloadError::CreateFile {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let total = keys.len() as u64;
    let mut outcome = DownloadOutcome::default();
    let mut pending = Vec::new();
    let mut already_done: u64 = 0;

    for (filename, key) in keys {
        let local_path = dest.join(filename);
        if local_path.metadata().is_ok_and(|m| m.len() > 0) {
            already_done += 1;
            outcome.downloaded.push(local_path);
        } else {
            pending.push((filename.clone(), key.clone(), local_path));
        }
    }

    progress.report(already_done, total);
    if pending.is_empty() {
        return Ok(outcome);
    }

    let completed = std::sync::atomic::AtomicU64::new(already_done);
    let results = stream::iter(pending.into_iter().map(|(filename, key, local_path)| {
        let client = client.clone();
        let completed = &completed;
        async move {
            let result = fetch_with_retry(&client, bucket, &key, &local_path, config).await;
            let done = completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            if done % config.progress_step == 0 || done == total {
                progress.report(done, total);
            }
            (filename, local_path, result)
        }
    }))
    .buffer_unordered(config.max_workers)
    .collect::<Vec<_>>()
    .await;

    for (filename, local_path, result) in results {
        match result {
            Ok(()) => outcome.downloaded.push(local_path),
            Err(detail) => {
                tracing::warn!(%filename, error = %detail, "remote download failed after retries");
                outcome.failed.push(filename);
            }
        }
    }

    Ok(outcome)
}

async fn fetch_with_retry(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    local_path: &Path,
    config: &RemoteConfig,
) -> Result<(), String> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match fetch_once(client, bucket, key, local_path).await {
            Ok(()) => return Ok(()),
            Err(detail) => {
                if attempt >= config.retry_attempts {
                    return Err(detail);
                }
                tokio::time::sleep(config.backoff_delay(attempt)).await;
            }
        }
    }
}

async fn fetch_once(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    local_path: &Path,
) -> Result<(), String> {
    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    write_body(output.body, local_path).await
}

async fn write_body(mut body: ByteStream, local_path: &Path) -> Result<(), String> {
    let mut file = tokio::fs::File::create(local_path)
        .await
        .map_err(|e| e.to_string())?;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;
        file.write_all(&chunk).await.map_err(|e| e.to_string())?;
    }
    file.flush().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn progress_sink_closure_impl_compiles() {
        let calls: Mutex<Vec<(u64, u64)>> = Mutex::new(Vec::new());
        let sink = |completed: u64, total: u64| calls.lock().unwrap().push((completed, total));
        sink.report(1, 10);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn download_skips_preexisting_nonempty_files() {
        let dest = tempfile::TempDir::new().unwrap();
        std::fs::write(dest.path().join("already-here.nc"), b"data").unwrap();

        let mut keys = HashMap::new();
        keys.insert("already-here.nc".to_string(), "some/key.nc".to_string());

        // No real client call happens because the only key is pre-existing.
        let config = RemoteConfig::default();
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .no_credentials()
            .load()
            .await;
        let client = aws_sdk_s3::Client::new(&sdk_config);

        let reports: Mutex<Vec<(u64, u64)>> = Mutex::new(Vec::new());
        let sink = |completed: u64, total: u64| reports.lock().unwrap().push((completed, total));

        let outcome = download(&client, "noaa-goes16", &keys, dest.path(), &config, &sink)
            .await
            .unwrap();
        assert_eq!(outcome.downloaded.len(), 1);
        assert!(outcome.failed.is_empty());
        assert_eq!(reports.lock().unwrap()[0], (1, 1));
    }
}
