//! Common test utilities for provider integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use stratus_provider::{DiffUploader, FileEntry, MockRemoteApi, UploadConfig};
use tempfile::TempDir;

/// A directory of site files backing a manifest.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    /// Creates an empty site directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Writes `contents` to disk and returns an entry for it, fingerprinted by content.
    pub fn file(&self, key: &str, contents: &str) -> FileEntry {
        let path = self.dir.path().join(key.replace('/', "__"));
        std::fs::write(&path, contents).unwrap();
        FileEntry::new(path, key, "text/plain").with_hash(format!("sha-{contents}"))
    }

    /// Writes `count` distinct files named `file-N.txt`.
    pub fn files(&self, count: usize) -> Vec<FileEntry> {
        (0..count)
            .map(|i| self.file(&format!("file-{i}.txt"), &format!("contents {i}")))
            .collect()
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an uploader over `api` with the given concurrency limit.
pub fn uploader(api: &Arc<MockRemoteApi>, max_concurrent: usize) -> DiffUploader {
    DiffUploader::new(api.clone(), &UploadConfig { max_concurrent })
}
