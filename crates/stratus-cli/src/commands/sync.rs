//! Implementation of the `stratus sync` command.

use std::path::PathBuf;
use std::sync::Arc;

use stratus_provider::{
    BucketFilesInputs, BucketFilesProvider, HttpRemoteApi, ProviderError, ResourceProvider,
    StratusConfig,
};
use tracing::info;

use super::{read_manifest, CommandError};

/// Arguments for the sync command.
pub struct SyncArgs {
    pub bucket: String,
    pub manifest: PathBuf,
    pub previous: Option<PathBuf>,
    pub previous_bucket: Option<String>,
}

pub async fn run(config: &StratusConfig, args: SyncArgs) -> Result<(), CommandError> {
    let news = BucketFilesInputs {
        bucket_name: args.bucket,
        files: read_manifest(&args.manifest)?,
    };

    let api = Arc::new(HttpRemoteApi::new(&config.remote).map_err(ProviderError::from)?);
    let provider = BucketFilesProvider::from_config(api, config);

    match args.previous {
        Some(previous) => {
            let olds = BucketFilesInputs {
                bucket_name: args
                    .previous_bucket
                    .unwrap_or_else(|| news.bucket_name.clone()),
                files: read_manifest(&previous)?,
            };
            provider
                .update(BucketFilesProvider::RESOURCE_ID, &olds, &news)
                .await?;
        }
        None => {
            provider.create(&news).await?;
        }
    }

    info!(bucket = %news.bucket_name, files = news.files.len(), "bucket in sync");
    Ok(())
}
