// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! HTTP transport for the MidoNet REST API.
//!
//! [`Transport`] is the seam between the client's status-code semantics and the
//! wire. [`HttpTransport`] is the production implementation over `reqwest`; tests
//! substitute an in-memory backend.

use super::ClientConfig;
use crate::errors::ClientError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// One request against the MidoNet API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`
    pub path: String,
    /// Content type of `body`
    pub media_type: Option<String>,
    /// JSON body
    pub body: Option<String>,
}

/// Status and body of an API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Sends requests to the MidoNet API.
///
/// Implementations return `Ok` for every response that has a status, whatever the
/// status is. Only failures to get a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if no response could be obtained.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;

    /// Full URL of `path`, used in diagnostics.
    fn url(&self, path: &str) -> String;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        (**self).send(request).await
    }

    fn url(&self, path: &str) -> String {
        (**self).url(path)
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for the configured API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api.as_str().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url(&request.path);
        let transport_error = |reason: String| ClientError::Transport {
            method: request.method.to_string(),
            url: url.clone(),
            reason,
        };

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(media_type) = &request.media_type {
            builder = builder.header(ACCEPT, media_type.as_str());
        }
        if let Some(body) = &request.body {
            if let Some(media_type) = &request.media_type {
                builder = builder.header(CONTENT_TYPE, media_type.as_str());
            }
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(format!("failed to read response body: {e}")))?;

        debug!(
            method = %request.method,
            url = %url,
            status = %status,
            response_len = body.len(),
            "MidoNet API response"
        );

        Ok(ApiResponse { status, body })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod transport_tests;
