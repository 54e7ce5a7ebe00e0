//! Resource lifecycle providers.
//!
//! The infrastructure framework drives each resource through `create` and
//! `update`, supplying the inputs it recorded last time. State persistence is
//! the framework's job; providers only reconcile.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::StratusConfig;
use crate::error::ProviderResult;
use crate::remote::RemoteApi;
use crate::types::{BucketFilesInputs, Manifest, WaitRequest, WaiterOutputs};
use crate::upload::DiffUploader;
use crate::waiter::DeploymentWaiter;

/// Result of creating a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResult<O> {
    /// Stable resource identifier.
    pub id: String,
    /// Resource outputs.
    pub outs: O,
}

/// Result of updating a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult<O> {
    /// Resource outputs.
    pub outs: O,
}

/// A resource the framework can create and update.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Desired state supplied by the framework.
    type Inputs: Send + Sync;
    /// Values reported back to the framework.
    type Outputs: Send;

    /// Bring a new resource into existence.
    async fn create(&self, inputs: &Self::Inputs) -> ProviderResult<CreateResult<Self::Outputs>>;

    /// Move an existing resource from `olds` to `news`.
    async fn update(
        &self,
        id: &str,
        olds: &Self::Inputs,
        news: &Self::Inputs,
    ) -> ProviderResult<UpdateResult<Self::Outputs>>;
}

/// Keeps a bucket's files in line with a manifest.
#[derive(Debug)]
pub struct BucketFilesProvider {
    uploader: DiffUploader,
}

impl BucketFilesProvider {
    /// Identifier reported for every bucket files resource.
    pub const RESOURCE_ID: &'static str = "files";

    /// Create a provider around an uploader.
    #[must_use]
    pub fn new(uploader: DiffUploader) -> Self {
        Self { uploader }
    }

    /// Create a provider from configuration.
    pub fn from_config(api: Arc<dyn RemoteApi>, config: &StratusConfig) -> Self {
        Self::new(DiffUploader::new(api, &config.upload))
    }
}

#[async_trait]
impl ResourceProvider for BucketFilesProvider {
    type Inputs = BucketFilesInputs;
    type Outputs = ();

    async fn create(&self, inputs: &BucketFilesInputs) -> ProviderResult<CreateResult<()>> {
        self.uploader
            .sync(&inputs.bucket_name, &inputs.files, &Manifest::empty())
            .await?;

        Ok(CreateResult {
            id: Self::RESOURCE_ID.to_owned(),
            outs: (),
        })
    }

    async fn update(
        &self,
        id: &str,
        olds: &BucketFilesInputs,
        news: &BucketFilesInputs,
    ) -> ProviderResult<UpdateResult<()>> {
        let empty = Manifest::empty();
        let previous = if olds.bucket_name == news.bucket_name {
            &olds.files
        } else {
            info!(
                id = %id,
                from = %olds.bucket_name,
                to = %news.bucket_name,
                "bucket changed, uploading all files"
            );
            &empty
        };

        self.uploader
            .sync(&news.bucket_name, &news.files, previous)
            .await?;

        Ok(UpdateResult { outs: () })
    }
}

/// Blocks a deployment until its distribution has settled.
#[derive(Debug)]
pub struct DeploymentWaiterProvider {
    waiter: DeploymentWaiter,
}

impl DeploymentWaiterProvider {
    /// Identifier reported for every waiter resource.
    pub const RESOURCE_ID: &'static str = "waiter";

    /// Create a provider around a waiter.
    #[must_use]
    pub fn new(waiter: DeploymentWaiter) -> Self {
        Self { waiter }
    }

    /// Create a provider from configuration.
    pub fn from_config(api: Arc<dyn RemoteApi>, config: &StratusConfig) -> Self {
        Self::new(DeploymentWaiter::new(api, &config.waiter))
    }
}

#[async_trait]
impl ResourceProvider for DeploymentWaiterProvider {
    type Inputs = WaitRequest;
    type Outputs = WaiterOutputs;

    async fn create(&self, inputs: &WaitRequest) -> ProviderResult<CreateResult<WaiterOutputs>> {
        let report = self.waiter.wait(inputs).await?;

        Ok(CreateResult {
            id: Self::RESOURCE_ID.to_owned(),
            outs: WaiterOutputs {
                is_done: report.is_done(),
            },
        })
    }

    async fn update(
        &self,
        _id: &str,
        _olds: &WaitRequest,
        news: &WaitRequest,
    ) -> ProviderResult<UpdateResult<WaiterOutputs>> {
        let report = self.waiter.wait(news).await?;

        Ok(UpdateResult {
            outs: WaiterOutputs {
                is_done: report.is_done(),
            },
        })
    }
}
