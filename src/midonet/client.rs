// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Idempotent push and delete against the MidoNet REST API.
//!
//! Both operations walk a resource list in order and stop at the first error.
//! The client never retries; retryable errors are surfaced to the driver, which
//! re-delivers the whole event.

use super::resources::BackendResource;
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use super::types::Operation;
use super::ClientConfig;
use crate::errors::ClientError;
use crate::http_errors::{classify_create, classify_delete, CreateOutcome, DeleteOutcome};
use crate::metrics;
use tracing::{debug, error, info};

/// MidoNet API client over a [`Transport`].
#[derive(Debug, Clone)]
pub struct MidonetClient<T = HttpTransport> {
    transport: T,
}

impl MidonetClient<HttpTransport> {
    /// Build a client talking HTTP to the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport> MidonetClient<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create every resource, in order.
    ///
    /// A resource that already exists (HTTP 409) is updated in place when its kind
    /// supports update, and left as is otherwise.
    ///
    /// # Errors
    ///
    /// - [`ClientError::ParentNotReady`] if a create under a parent returned 404 (retryable)
    /// - [`ClientError::Transport`] if the API could not be reached (retryable)
    /// - [`ClientError::UnexpectedStatus`] for any other non-success status
    /// - [`ClientError::UnsupportedOperation`] if a kind cannot be created
    pub async fn push(&self, resources: &[BackendResource]) -> Result<(), ClientError> {
        for resource in resources {
            self.create(resource).await?;
        }
        Ok(())
    }

    /// Delete every resource, in order. Resources that are already gone are skipped.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] if the API could not be reached (retryable)
    /// - [`ClientError::UnexpectedStatus`] for a status other than 2xx or 404
    /// - [`ClientError::UnsupportedOperation`] if a kind cannot be deleted
    pub async fn delete(&self, resources: &[BackendResource]) -> Result<(), ClientError> {
        for resource in resources {
            self.remove(resource).await?;
        }
        Ok(())
    }

    async fn create(&self, resource: &BackendResource) -> Result<(), ClientError> {
        let request = build_request(Operation::Create, resource)?;
        let response = self.send(resource, request.clone()).await?;

        match classify_create(response.status, resource.has_parent()) {
            CreateOutcome::Success => {
                debug!(resource = %resource.identity(), "Created MidoNet resource");
                Ok(())
            }
            CreateOutcome::ParentNotReady => Err(ClientError::ParentNotReady {
                resource: resource.identity(),
                parent: resource
                    .parent()
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                url: self.transport.url(&request.path),
            }),
            CreateOutcome::Conflict if resource.supports(Operation::Update) => {
                self.update(resource).await
            }
            CreateOutcome::Conflict => {
                debug!(
                    resource = %resource.identity(),
                    "MidoNet resource already exists"
                );
                Ok(())
            }
            CreateOutcome::Unexpected => Err(self.unexpected(resource, &request, response)),
        }
    }

    async fn update(&self, resource: &BackendResource) -> Result<(), ClientError> {
        let request = build_request(Operation::Update, resource)?;
        let response = self.send(resource, request.clone()).await?;

        if response.status.is_success() {
            info!(resource = %resource.identity(), "Updated existing MidoNet resource");
            Ok(())
        } else {
            Err(self.unexpected(resource, &request, response))
        }
    }

    async fn remove(&self, resource: &BackendResource) -> Result<(), ClientError> {
        let request = build_request(Operation::Delete, resource)?;
        let response = self.send(resource, request.clone()).await?;

        match classify_delete(response.status) {
            DeleteOutcome::Deleted => {
                metrics::record_resource_deleted(resource.kind());
                debug!(resource = %resource.identity(), "Deleted MidoNet resource");
                Ok(())
            }
            DeleteOutcome::AlreadyGone => {
                debug!(
                    resource = %resource.identity(),
                    "MidoNet resource already gone"
                );
                Ok(())
            }
            DeleteOutcome::Unexpected => Err(self.unexpected(resource, &request, response)),
        }
    }

    async fn send(
        &self,
        resource: &BackendResource,
        request: ApiRequest,
    ) -> Result<ApiResponse, ClientError> {
        let method = request.method.clone();
        match self.transport.send(request).await {
            Ok(response) => {
                metrics::record_backend_request(
                    method.as_str(),
                    resource.kind(),
                    response.status.as_str(),
                );
                Ok(response)
            }
            Err(e) => {
                metrics::record_backend_request(
                    method.as_str(),
                    resource.kind(),
                    "transport_error",
                );
                Err(e)
            }
        }
    }

    fn unexpected(
        &self,
        resource: &BackendResource,
        request: &ApiRequest,
        response: ApiResponse,
    ) -> ClientError {
        let url = self.transport.url(&request.path);
        error!(
            method = %request.method,
            url = %url,
            status = %response.status,
            resource = %resource.identity(),
            request_body = request.body.as_deref().unwrap_or_default(),
            response_body = %response.body,
            "Unexpected MidoNet API response"
        );
        ClientError::UnexpectedStatus {
            resource: resource.identity(),
            method: request.method.to_string(),
            url,
            status: response.status.as_u16(),
            request_body: request.body.clone().unwrap_or_default(),
            response_body: response.body,
        }
    }
}

/// Build the request for `op` on `resource`. Create and update carry the JSON body.
fn build_request(op: Operation, resource: &BackendResource) -> Result<ApiRequest, ClientError> {
    let path = resource
        .path(op)
        .ok_or_else(|| ClientError::UnsupportedOperation {
            kind: resource.kind().to_string(),
            operation: op.to_string(),
        })?;

    let body = match op {
        Operation::Create | Operation::Update => Some(serde_json::to_string(resource).map_err(
            |source| ClientError::Serialize {
                resource: resource.identity(),
                source,
            },
        )?),
        Operation::Delete | Operation::Read => None,
    };

    Ok(ApiRequest {
        method: op.method(),
        path,
        media_type: Some(resource.media_type()),
        body,
    })
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
