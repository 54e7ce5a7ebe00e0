//! Change detection between two manifests.

use crate::types::{FileEntry, Manifest};

/// Which entries of a desired manifest need uploading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPlan {
    uploads: Vec<FileEntry>,
    skipped: Vec<String>,
}

impl UploadPlan {
    /// Compare `desired` against `previous`.
    ///
    /// An entry is skipped when `previous` holds an entry with the same key
    /// whose hash, cache control and content type all match. Everything else,
    /// including entries with no previous counterpart, is uploaded.
    #[must_use]
    pub fn new(desired: &Manifest, previous: &Manifest) -> Self {
        let previous = previous.by_key();
        let mut plan = Self::default();

        for entry in desired {
            match previous.get(entry.key.as_str()) {
                Some(old) if entry.is_unchanged_from(old) => plan.skipped.push(entry.key.clone()),
                _ => plan.uploads.push(entry.clone()),
            }
        }

        plan
    }

    /// Entries that must be uploaded, in manifest order.
    #[must_use]
    pub fn uploads(&self) -> &[FileEntry] {
        &self.uploads
    }

    /// Keys left untouched.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Whether nothing needs uploading.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.uploads.is_empty()
    }

    pub(crate) fn into_uploads(self) -> Vec<FileEntry> {
        self.uploads
    }
}
