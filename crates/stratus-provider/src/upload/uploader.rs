//! Bounded-concurrency uploader.

use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::config::UploadConfig;
use crate::error::TransferError;
use crate::remote::{ApiRequest, RemoteApi, Service};
use crate::types::{FileEntry, Manifest};

use super::UploadPlan;

/// Outcome of a successful sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries that were uploaded.
    pub uploaded: usize,
    /// Entries left untouched because they had not changed.
    pub skipped: usize,
}

/// Uploads the entries of a manifest that differ from the previous one.
pub struct DiffUploader {
    api: Arc<dyn RemoteApi>,
    max_concurrent: usize,
}

impl DiffUploader {
    /// Create an uploader sending requests through `api`.
    pub fn new(api: Arc<dyn RemoteApi>, config: &UploadConfig) -> Self {
        Self {
            api,
            max_concurrent: config.concurrency(),
        }
    }

    /// Maximum number of uploads in flight.
    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Bring `bucket` in line with `desired`, given what `previous` uploaded.
    ///
    /// Pass an empty `previous` to force every entry to upload. Fails with
    /// the first upload error observed; no new uploads start after that, and
    /// uploads already in flight are left to finish on their own.
    pub async fn sync(
        &self,
        bucket: &str,
        desired: &Manifest,
        previous: &Manifest,
    ) -> Result<SyncReport, TransferError> {
        let plan = UploadPlan::new(desired, previous);
        let skipped = plan.skipped().len();

        if plan.is_noop() {
            info!(bucket = %bucket, skipped, "all files up to date");
            return Ok(SyncReport {
                uploaded: 0,
                skipped,
            });
        }

        let uploads = plan.into_uploads();
        let uploaded = uploads.len();
        debug!(
            bucket = %bucket,
            uploads = uploaded,
            skipped,
            max_concurrent = self.max_concurrent,
            "starting sync"
        );

        let bucket: Arc<str> = Arc::from(bucket);
        let mut tasks = JoinSet::new();

        for entry in uploads {
            // Settle finished uploads, then wait for a free slot.
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = settle(joined) {
                    return Err(abandon(tasks, e));
                }
            }
            while tasks.len() >= self.max_concurrent {
                let Some(joined) = tasks.join_next().await else {
                    break;
                };
                if let Err(e) = settle(joined) {
                    return Err(abandon(tasks, e));
                }
            }

            let api = Arc::clone(&self.api);
            let bucket = Arc::clone(&bucket);
            tasks.spawn(async move { upload_entry(api.as_ref(), &bucket, &entry).await });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = settle(joined) {
                return Err(abandon(tasks, e));
            }
        }

        info!(bucket = %bucket, uploaded, skipped, "sync complete");
        Ok(SyncReport { uploaded, skipped })
    }
}

impl std::fmt::Debug for DiffUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffUploader")
            .field("max_concurrent", &self.max_concurrent)
            .finish_non_exhaustive()
    }
}

fn settle(joined: Result<Result<(), TransferError>, JoinError>) -> Result<(), TransferError> {
    joined.map_err(|e| TransferError::Worker(e.to_string()))?
}

/// Stop tracking the remaining uploads and hand back the failure.
fn abandon(mut tasks: JoinSet<Result<(), TransferError>>, error: TransferError) -> TransferError {
    warn!(
        error = %error,
        in_flight = tasks.len(),
        "sync failed, abandoning in-flight uploads"
    );
    tasks.detach_all();
    error
}

async fn upload_entry(
    api: &dyn RemoteApi,
    bucket: &str,
    entry: &FileEntry,
) -> Result<(), TransferError> {
    let body = tokio::fs::read(&entry.source)
        .await
        .map_err(|e| TransferError::Read {
            key: entry.key.clone(),
            path: entry.source.clone(),
            source: e,
        })?;
    let size = body.len();

    let mut request = ApiRequest::put(Service::S3, format!("{bucket}/{}", entry.key), body);
    if !entry.content_type.is_empty() {
        request = request.header("Content-Type", entry.content_type.as_str());
    }
    if let Some(cache_control) = entry.cache_control.as_deref().filter(|c| !c.is_empty()) {
        request = request.header("Cache-Control", cache_control);
    }

    debug!(key = %entry.key, size, "uploading");
    api.request(request)
        .await
        .map_err(|e| TransferError::Upload {
            key: entry.key.clone(),
            source: e,
        })?;
    debug!(key = %entry.key, size, "uploaded");

    Ok(())
}
