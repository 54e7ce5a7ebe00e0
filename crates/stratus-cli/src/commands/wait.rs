//! Implementation of the `stratus wait` command.

use std::sync::Arc;

use stratus_provider::{
    DeploymentWaiter, HttpRemoteApi, ProviderError, StratusConfig, WaitOutcome, WaitRequest,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::CommandError;

/// Arguments for the wait command.
pub struct WaitArgs {
    pub distribution_id: String,
    pub etag: String,
    pub wait: bool,
}

pub async fn run(config: &StratusConfig, args: WaitArgs) -> Result<(), CommandError> {
    let request = WaitRequest::new(args.distribution_id, args.etag).with_wait(args.wait);

    let api = Arc::new(HttpRemoteApi::new(&config.remote).map_err(ProviderError::from)?);
    let waiter = DeploymentWaiter::new(api, &config.waiter);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling wait");
            on_signal.cancel();
        }
    });

    let report = waiter
        .wait_until_cancelled(&request, &cancel)
        .await
        .map_err(ProviderError::from)?;

    if report.outcome == WaitOutcome::TimedOut {
        warn!(
            distribution_id = %request.distribution_id,
            "distribution did not report Deployed before the timeout"
        );
    }

    println!("{}", serde_json::json!({ "isDone": report.is_done() }));
    Ok(())
}
