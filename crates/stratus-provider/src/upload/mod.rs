//! Incremental file synchronisation into the content store.
//!
//! [`UploadPlan`] decides which entries changed; [`DiffUploader`] reads and
//! PUTs them through a bounded worker pool.

mod plan;
mod uploader;

pub use plan::UploadPlan;
pub use uploader::{DiffUploader, SyncReport};
