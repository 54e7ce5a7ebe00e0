//! Scriptable in-process [`RemoteApi`] for tests and dry runs.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use tokio::time::Instant;

use crate::error::TransportError;

use super::{ApiRequest, ApiResponse, RemoteApi, Service};

/// A request observed by [`MockRemoteApi`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Target service.
    pub service: Service,
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Headers as sent.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Bytes>,
    /// When the request arrived.
    pub at: Instant,
}

impl RecordedRequest {
    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted reply to a status request.
#[derive(Debug, Clone)]
enum StatusReply {
    Status(String),
    Fail,
}

/// In-memory [`RemoteApi`].
///
/// PUTs succeed unless their path was registered with
/// [`fail_path`](Self::fail_path). Status GETs answer from a script; once the
/// script runs out the last reply repeats, or `InProgress` if nothing was
/// scripted.
#[derive(Debug, Default)]
pub struct MockRemoteApi {
    requests: Mutex<Vec<RecordedRequest>>,
    failing_paths: Mutex<HashSet<String>>,
    statuses: Mutex<VecDeque<StatusReply>>,
    last_status: Mutex<Option<StatusReply>>,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockRemoteApi {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every request to `path` fail with a 500.
    #[must_use]
    pub fn fail_path(self, path: impl Into<String>) -> Self {
        if let Ok(mut paths) = self.failing_paths.lock() {
            paths.insert(path.into());
        }
        self
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        if let Ok(mut slot) = self.latency.lock() {
            *slot = Some(latency);
        }
        self
    }

    /// Queue the distribution status returned by the next status GET.
    #[must_use]
    pub fn push_status(self, status: impl Into<String>) -> Self {
        self.push_reply(StatusReply::Status(status.into()))
    }

    /// Queue a transport failure for the next status GET.
    #[must_use]
    pub fn push_status_failure(self) -> Self {
        self.push_reply(StatusReply::Fail)
    }

    fn push_reply(self, reply: StatusReply) -> Self {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push_back(reply);
        }
        self
    }

    /// All requests seen so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Requests seen for `service`.
    #[must_use]
    pub fn requests_for(&self, service: Service) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.service == service)
            .collect()
    }

    /// Paths of all PUT requests, sorted.
    #[must_use]
    pub fn put_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .requests()
            .into_iter()
            .filter(|r| r.method == Method::PUT)
            .map(|r| r.path)
            .collect();
        paths.sort();
        paths
    }

    /// Highest number of requests that were in flight at the same time.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn next_status(&self) -> StatusReply {
        let queued = self.statuses.lock().ok().and_then(|mut s| s.pop_front());
        let mut last = match self.last_status.lock() {
            Ok(last) => last,
            Err(_) => return StatusReply::Fail,
        };
        match queued {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .unwrap_or_else(|| StatusReply::Status("InProgress".to_owned())),
        }
    }

    async fn respond(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let latency = self.latency.lock().ok().and_then(|l| *l);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failing = self
            .failing_paths
            .lock()
            .map(|p| p.contains(&request.path))
            .unwrap_or(false);
        if failing {
            return Err(TransportError::Status {
                service: request.service,
                status: 500,
                body: "InternalError".to_owned(),
            });
        }

        match (request.service, &request.method) {
            (Service::CloudFront, &Method::GET) => match self.next_status() {
                StatusReply::Status(status) => {
                    let body = serde_json::json!({
                        "Distribution": {
                            "Id": request.path.rsplit('/').next().unwrap_or_default(),
                            "Status": status,
                        }
                    });
                    Ok(ApiResponse {
                        status: 200,
                        body: Bytes::from(body.to_string()),
                    })
                }
                StatusReply::Fail => Err(TransportError::Status {
                    service: request.service,
                    status: 503,
                    body: "ServiceUnavailable".to_owned(),
                }),
            },
            _ => Ok(ApiResponse::ok()),
        }
    }
}

#[async_trait]
impl RemoteApi for MockRemoteApi {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                service: request.service,
                method: request.method.clone(),
                path: request.path.clone(),
                headers: request.headers.clone(),
                body: request.body.clone(),
                at: Instant::now(),
            });
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = self.respond(&request).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
