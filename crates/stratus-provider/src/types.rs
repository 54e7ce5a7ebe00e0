//! Core types for stratus-provider.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One file to be materialised in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Local path to the file content. Read at upload time.
    pub source: PathBuf,
    /// Remote object key, unique within a manifest.
    pub key: String,
    /// Value sent as `Content-Type`.
    pub content_type: String,
    /// Value sent as `Cache-Control`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// Caller-supplied content fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl FileEntry {
    /// Create an entry with no cache control and no hash.
    #[must_use]
    pub fn new(
        source: impl Into<PathBuf>,
        key: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            key: key.into(),
            content_type: content_type.into(),
            cache_control: None,
            hash: None,
        }
    }

    /// Set the `Cache-Control` value.
    #[must_use]
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    /// Set the content fingerprint.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Whether `previous` describes the same remote object as `self`.
    ///
    /// Only `(hash, cache_control, content_type)` take part; `source` does not.
    #[must_use]
    pub fn is_unchanged_from(&self, previous: &Self) -> bool {
        self.hash == previous.hash
            && self.cache_control == previous.cache_control
            && self.content_type == previous.content_type
    }
}

/// Ordered set of file entries describing one desired state of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Vec<FileEntry>);

impl Manifest {
    /// Create a manifest from entries.
    #[must_use]
    pub fn new(entries: Vec<FileEntry>) -> Self {
        Self(entries)
    }

    /// An empty manifest.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries in manifest order.
    #[must_use]
    pub fn entries(&self) -> &[FileEntry] {
        &self.0
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.0.iter()
    }

    /// Index entries by key. Later duplicates win.
    #[must_use]
    pub fn by_key(&self) -> HashMap<&str, &FileEntry> {
        self.0.iter().map(|e| (e.key.as_str(), e)).collect()
    }
}

impl From<Vec<FileEntry>> for Manifest {
    fn from(entries: Vec<FileEntry>) -> Self {
        Self(entries)
    }
}

impl FromIterator<FileEntry> for Manifest {
    fn from_iter<I: IntoIterator<Item = FileEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Inputs of a bucket files resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketFilesInputs {
    /// Target bucket.
    pub bucket_name: String,
    /// Desired files.
    pub files: Manifest,
}

/// One deployment-status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitRequest {
    /// Distribution to poll.
    pub distribution_id: String,
    /// Identifies the change being waited on. Passed through untouched.
    pub etag: String,
    /// When false, waiting is skipped entirely.
    pub wait: bool,
}

impl WaitRequest {
    /// Create a request that polls `distribution_id`.
    #[must_use]
    pub fn new(distribution_id: impl Into<String>, etag: impl Into<String>) -> Self {
        Self {
            distribution_id: distribution_id.into(),
            etag: etag.into(),
            wait: true,
        }
    }

    /// Turn waiting on or off.
    #[must_use]
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }
}

/// Outputs of a deployment waiter resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterOutputs {
    /// Always true once the waiter returns.
    pub is_done: bool,
}
