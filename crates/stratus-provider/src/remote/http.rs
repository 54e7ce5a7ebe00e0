//! HTTP implementation of [`RemoteApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::TransportError;

use super::{ApiRequest, ApiResponse, RemoteApi, Service};

/// Longest body excerpt kept in status errors.
const ERROR_BODY_LIMIT: usize = 512;

/// Sends [`ApiRequest`]s over HTTP to the configured service endpoints.
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: Client,
    s3_endpoint: String,
    cloudfront_endpoint: String,
}

impl HttpRemoteApi {
    /// Create a client from configuration.
    pub fn new(config: &RemoteConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            s3_endpoint: config.s3_endpoint.trim_end_matches('/').to_owned(),
            cloudfront_endpoint: config.cloudfront_endpoint.trim_end_matches('/').to_owned(),
        })
    }

    fn endpoint(&self, service: Service) -> Result<&str, TransportError> {
        let endpoint = match service {
            Service::S3 => &self.s3_endpoint,
            Service::CloudFront => &self.cloudfront_endpoint,
        };

        if endpoint.is_empty() {
            return Err(TransportError::UnknownService(service));
        }
        Ok(endpoint)
    }

    fn url(&self, service: Service, path: &str) -> Result<reqwest::Url, TransportError> {
        let url = format!("{}/{}", self.endpoint(service)?, path.trim_start_matches('/'));
        reqwest::Url::parse(&url).map_err(|e| TransportError::InvalidUrl {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(request.service, &request.path)?;
        debug!(service = %request.service, method = %request.method, url = %url, "sending request");

        let mut builder = self.client.request(request.method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let excerpt: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(TransportError::Status {
                service: request.service,
                status: status.as_u16(),
                body: excerpt,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}
