//! Integration tests for deployment waiting under paused time.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use stratus_provider::{
    DeploymentWaiter, DeploymentWaiterProvider, MockRemoteApi, ResourceProvider, Service,
    StratusConfig, WaitError, WaitOutcome, WaitRequest, WaiterConfig,
};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

fn waiter(api: &Arc<MockRemoteApi>) -> DeploymentWaiter {
    DeploymentWaiter::new(api.clone(), &WaiterConfig::default())
}

#[tokio::test(start_paused = true)]
async fn deployed_on_fourth_poll() {
    let api = Arc::new(
        MockRemoteApi::new()
            .push_status("InProgress")
            .push_status("InProgress")
            .push_status("InProgress")
            .push_status("Deployed"),
    );

    let report = waiter(&api)
        .wait(&WaitRequest::new("E2QWRUHEXAMPLE", "etag"))
        .await
        .unwrap();

    assert_eq!(report.outcome, WaitOutcome::Deployed);
    assert_eq!(report.polls, 4);

    let gets = api.requests_for(Service::CloudFront);
    assert_eq!(gets.len(), 4);
    assert!(gets.iter().all(|r| r.path == "/distribution/E2QWRUHEXAMPLE"));
    for pair in gets.windows(2) {
        assert!(pair[1].at - pair[0].at >= Duration::from_secs(5));
    }
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_ceiling_and_still_reports_done() {
    let api = Arc::new(MockRemoteApi::new().push_status("InProgress"));
    let start = Instant::now();

    let report = waiter(&api)
        .wait(&WaitRequest::new("E1", "etag"))
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.outcome, WaitOutcome::TimedOut);
    assert!(report.is_done());
    assert!(elapsed >= Duration::from_secs(300));
    assert!(elapsed <= Duration::from_secs(305));
    assert_eq!(report.polls, 60);
}

#[tokio::test(start_paused = true)]
async fn custom_ceiling_is_respected() {
    let api = Arc::new(MockRemoteApi::new());
    let config = WaiterConfig {
        poll_interval_secs: 2,
        timeout_secs: 10,
    };

    let report = DeploymentWaiter::new(api.clone(), &config)
        .wait(&WaitRequest::new("E1", "etag"))
        .await
        .unwrap();

    assert_eq!(report.outcome, WaitOutcome::TimedOut);
    assert_eq!(report.polls, 5);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_sleep() {
    let api = Arc::new(MockRemoteApi::new());
    let waiter = Arc::new(waiter(&api));
    let cancel = CancellationToken::new();

    let handle = tokio::spawn({
        let waiter = Arc::clone(&waiter);
        let cancel = cancel.clone();
        async move {
            waiter
                .wait_until_cancelled(&WaitRequest::new("E1", "etag"), &cancel)
                .await
        }
    });

    sleep(Duration::from_secs(12)).await;
    cancel.cancel();

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(WaitError::Cancelled(ref id)) if id == "E1"));
    assert_eq!(api.requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn provider_update_polls_new_distribution() {
    let api = Arc::new(MockRemoteApi::new().push_status("Deployed"));
    let provider = DeploymentWaiterProvider::from_config(api.clone(), &StratusConfig::default());

    let olds = WaitRequest::new("E-OLD", "etag-1");
    let news = WaitRequest::new("E-NEW", "etag-2");
    let result = provider.update("waiter", &olds, &news).await.unwrap();

    assert!(result.outs.is_done);
    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/distribution/E-NEW");
}

#[tokio::test]
async fn transport_failure_propagates_without_retry() {
    let api = Arc::new(MockRemoteApi::new().push_status_failure());

    let err = waiter(&api)
        .wait(&WaitRequest::new("E1", "etag"))
        .await
        .unwrap_err();

    assert!(matches!(err, WaitError::Transport { .. }));
    assert_eq!(api.requests().len(), 1);
}
