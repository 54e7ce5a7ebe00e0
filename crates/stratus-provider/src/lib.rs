//! Stratus reconciliation providers
//!
//! This crate holds the two reconciliation procedures a static-site
//! deployment needs from its infrastructure tool:
//!
//! - **File sync**: bring an object-store bucket in line with a manifest of
//!   local files, uploading only entries whose hash, cache control or
//!   content type changed since the previous reconciliation.
//! - **Deployment wait**: poll a CDN distribution until it reports
//!   `Deployed`, or until the polling ceiling passes.
//!
//! Both are exposed as [`ResourceProvider`]s with `create`/`update`
//! semantics. All remote traffic goes through the [`RemoteApi`] contract.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stratus_provider::{
//!     BucketFilesInputs, BucketFilesProvider, FileEntry, HttpRemoteApi, Manifest,
//!     ResourceProvider, StratusConfig,
//! };
//!
//! let config = StratusConfig::load()?;
//! let api = Arc::new(HttpRemoteApi::new(&config.remote)?);
//! let provider = BucketFilesProvider::from_config(api, &config);
//!
//! let inputs = BucketFilesInputs {
//!     bucket_name: "my-site".to_owned(),
//!     files: Manifest::new(vec![
//!         FileEntry::new("dist/index.html", "index.html", "text/html").with_hash("3f2a"),
//!     ]),
//! };
//! provider.create(&inputs).await?;
//! ```

#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod remote;
pub mod types;
pub mod upload;
pub mod waiter;

// Re-export commonly used types at the crate root
pub use clock::{Clock, TokioClock};
pub use config::{RemoteConfig, StratusConfig, UploadConfig, WaiterConfig};
pub use error::{
    ConfigError, ProviderError, ProviderResult, TransferError, TransportError, WaitError,
};
pub use lifecycle::{
    BucketFilesProvider, CreateResult, DeploymentWaiterProvider, ResourceProvider, UpdateResult,
};
pub use remote::{
    ApiRequest, ApiResponse, HttpRemoteApi, MockRemoteApi, RecordedRequest, RemoteApi, Service,
};
pub use types::{BucketFilesInputs, FileEntry, Manifest, WaitRequest, WaiterOutputs};
pub use upload::{DiffUploader, SyncReport, UploadPlan};
pub use waiter::{DeploymentWaiter, WaitOutcome, WaitReport, TERMINAL_STATUS};
