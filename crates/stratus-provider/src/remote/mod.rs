//! Remote API contract.
//!
//! Both reconciliation procedures talk to the outside world through
//! [`RemoteApi`]: one request against a named service, one response back.
//! Request signing is not part of this contract; implementations that need
//! it wrap or replace [`HttpRemoteApi`].

mod http;
mod mock;

pub use http::HttpRemoteApi;
pub use mock::{MockRemoteApi, RecordedRequest};

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::error::TransportError;

/// Remote services the providers talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Object store holding site content.
    S3,
    /// CDN control plane.
    CloudFront,
}

impl Service {
    /// Service name as used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::CloudFront => "cloudfront",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request against a remote service.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Target service.
    pub service: Service,
    /// HTTP method.
    pub method: Method,
    /// Path relative to the service endpoint.
    pub path: String,
    /// Request body.
    pub body: Option<Bytes>,
    /// Extra headers, sent in order.
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Build a GET request.
    #[must_use]
    pub fn get(service: Service, path: impl Into<String>) -> Self {
        Self {
            service,
            method: Method::GET,
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Build a PUT request carrying `body`.
    #[must_use]
    pub fn put(service: Service, path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            service,
            method: Method::PUT,
            path: path.into(),
            body: Some(body.into()),
            headers: Vec::new(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response to an [`ApiRequest`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
}

impl ApiResponse {
    /// An empty `200 OK` response.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: Bytes::new(),
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::decode(e.to_string()))
    }
}

/// Performs requests against remote services.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Send one request. Non-success responses are errors.
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = ApiRequest::put(Service::S3, "bucket/key", "body")
            .header("Content-Type", "text/html");
        assert_eq!(request.header_value("content-type"), Some("text/html"));
        assert_eq!(request.header_value("Cache-Control"), None);
    }

    #[test]
    fn service_names() {
        assert_eq!(Service::S3.to_string(), "s3");
        assert_eq!(Service::CloudFront.to_string(), "cloudfront");
    }

    #[test]
    fn json_decode_error() {
        let response = ApiResponse {
            status: 200,
            body: Bytes::from_static(b"<xml/>"),
        };
        let result: Result<serde_json::Value, _> = response.json();
        assert!(matches!(result, Err(TransportError::Decode(_))));
    }
}
