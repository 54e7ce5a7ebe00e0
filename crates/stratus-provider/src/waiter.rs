//! Polling a CDN distribution until its deployment settles.
//!
//! The waiter is a two-state machine:
//!
//! ```text
//! Polling ──(status == "Deployed")──▶ Done(Deployed)
//!    │  ▲
//!    │  └──(sleep, elapsed < ceiling)
//!    └────(sleep, elapsed ≥ ceiling)──▶ Done(TimedOut)
//! ```
//!
//! Both exits report the waiter as done. Reaching the ceiling does not prove
//! the distribution deployed; [`WaitOutcome`] records which exit was taken.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, TokioClock};
use crate::config::WaiterConfig;
use crate::error::{TransportError, WaitError};
use crate::remote::{ApiRequest, RemoteApi, Service};
use crate::types::WaitRequest;

/// Distribution status reported once a change has propagated.
pub const TERMINAL_STATUS: &str = "Deployed";

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Waiting was turned off for this request.
    Skipped,
    /// The distribution reported the terminal status.
    Deployed,
    /// The polling ceiling was reached first.
    TimedOut,
}

/// Result of a finished wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitReport {
    /// Which exit was taken.
    pub outcome: WaitOutcome,
    /// Status requests issued.
    pub polls: u32,
    /// Time spent waiting.
    pub elapsed: Duration,
}

impl WaitReport {
    /// Always true: every exit counts as done, including a timeout.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
enum WaitState {
    Polling,
    Done(WaitOutcome),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DistributionResponse {
    distribution: Option<DistributionBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DistributionBody {
    status: Option<String>,
}

/// Polls a distribution's status until it deploys or the ceiling passes.
pub struct DeploymentWaiter {
    api: Arc<dyn RemoteApi>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    timeout: Duration,
}

impl DeploymentWaiter {
    /// Create a waiter using the tokio clock.
    pub fn new(api: Arc<dyn RemoteApi>, config: &WaiterConfig) -> Self {
        Self {
            api,
            clock: Arc::new(TokioClock),
            poll_interval: config.poll_interval(),
            timeout: config.timeout(),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Wait for the distribution named in `request`.
    pub async fn wait(&self, request: &WaitRequest) -> Result<WaitReport, WaitError> {
        self.wait_until_cancelled(request, &CancellationToken::new())
            .await
    }

    /// Wait for the distribution named in `request`, giving up early with
    /// [`WaitError::Cancelled`] if `cancel` fires.
    pub async fn wait_until_cancelled(
        &self,
        request: &WaitRequest,
        cancel: &CancellationToken,
    ) -> Result<WaitReport, WaitError> {
        let distribution_id = request.distribution_id.as_str();

        if !request.wait {
            debug!(distribution_id = %distribution_id, "waiting disabled");
            return Ok(WaitReport {
                outcome: WaitOutcome::Skipped,
                polls: 0,
                elapsed: Duration::ZERO,
            });
        }

        let start = self.clock.now();
        let mut polls = 0u32;
        let mut state = WaitState::Polling;

        debug!(
            distribution_id = %distribution_id,
            etag = %request.etag,
            interval = ?self.poll_interval,
            timeout = ?self.timeout,
            "waiting for deployment"
        );

        loop {
            match state {
                WaitState::Done(outcome) => {
                    let elapsed = self.clock.now() - start;
                    match outcome {
                        WaitOutcome::TimedOut => warn!(
                            distribution_id = %distribution_id,
                            polls,
                            elapsed = ?elapsed,
                            "gave up waiting for deployment, reporting done anyway"
                        ),
                        _ => info!(
                            distribution_id = %distribution_id,
                            polls,
                            elapsed = ?elapsed,
                            "distribution deployed"
                        ),
                    }
                    return Ok(WaitReport {
                        outcome,
                        polls,
                        elapsed,
                    });
                }
                WaitState::Polling => {
                    let fetched = tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(cancelled(distribution_id)),
                        fetched = self.fetch_status(distribution_id) => fetched,
                    };
                    let status = fetched.map_err(|source| WaitError::Transport {
                        distribution_id: distribution_id.to_owned(),
                        source,
                    })?;
                    polls += 1;

                    debug!(
                        distribution_id = %distribution_id,
                        poll = polls,
                        status = status.as_deref().unwrap_or("<missing>"),
                        "distribution status"
                    );

                    if status.as_deref() == Some(TERMINAL_STATUS) {
                        state = WaitState::Done(WaitOutcome::Deployed);
                        continue;
                    }

                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(cancelled(distribution_id)),
                        () = self.clock.sleep(self.poll_interval) => {}
                    }

                    if self.clock.now() - start >= self.timeout {
                        state = WaitState::Done(WaitOutcome::TimedOut);
                    }
                }
            }
        }
    }

    async fn fetch_status(&self, distribution_id: &str) -> Result<Option<String>, TransportError> {
        let request = ApiRequest::get(
            Service::CloudFront,
            format!("/distribution/{distribution_id}"),
        );
        let response: DistributionResponse = self.api.request(request).await?.json()?;
        Ok(response.distribution.and_then(|d| d.status))
    }
}

impl std::fmt::Debug for DeploymentWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentWaiter")
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn cancelled(distribution_id: &str) -> WaitError {
    info!(distribution_id = %distribution_id, "wait cancelled");
    WaitError::Cancelled(distribution_id.to_owned())
}
