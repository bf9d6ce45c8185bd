// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Error types for translation and reconciliation.
//!
//! This module provides specialized error types for:
//! - Parsing client keys into [`Key`](crate::converter::Key)s
//! - Converting cluster objects into backend resources
//! - MidoNet REST API operations
//!
//! Every error is classified as either retryable (the driver re-delivers the key
//! with backoff) or fatal (the driver stops and the process exits non-zero).

use thiserror::Error;

/// Errors parsing a flat client key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Client key is not `name` or `namespace/name`, or the name is empty
    #[error("invalid {kind} key '{key}': {reason}")]
    Invalid {
        /// Kind the key was parsed for
        kind: String,
        /// The rejected client key
        key: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Errors converting a cluster object into backend resources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Another object this one depends on is not available yet
    ///
    /// Returned when a pod's node is unknown or the node has no usable host id.
    /// The condition resolves itself once the dependency shows up.
    #[error("{key}: dependency not ready: {reason}")]
    DependencyNotReady {
        /// Key of the object being converted
        key: String,
        /// What is missing
        reason: String,
    },

    /// The object carries data that can never be translated
    ///
    /// Returned for addresses, CIDRs, MACs or protocols that fail to parse.
    #[error("{key}: malformed input: {reason}")]
    MalformedInput {
        /// Key of the object being converted
        key: String,
        /// What failed to parse
        reason: String,
    },
}

impl ConvertError {
    /// Shorthand for [`ConvertError::DependencyNotReady`].
    pub fn not_ready(key: impl ToString, reason: impl Into<String>) -> Self {
        Self::DependencyNotReady {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ConvertError::MalformedInput`].
    pub fn malformed(key: impl ToString, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors talking to the MidoNet REST API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Create returned 404 for a resource that has a parent
    ///
    /// The parent object has not been created yet (or was just deleted). Retrying
    /// after the parent's own reconciliation succeeds.
    #[error("parent {parent} of {resource} not found (HTTP 404 on {url})")]
    ParentNotReady {
        /// Resource identity (kind and item path)
        resource: String,
        /// Parent id
        parent: String,
        /// Create URL that returned 404
        url: String,
    },

    /// The API answered with a status the client has no handling for
    #[error("{method} {url} for {resource} returned {status}: request={request_body} response={response_body}")]
    UnexpectedStatus {
        /// Resource identity (kind and item path)
        resource: String,
        /// HTTP method
        method: String,
        /// Full request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Request body sent, empty for DELETE
        request_body: String,
        /// Response body received
        response_body: String,
    },

    /// The resource kind has no path for the operation
    #[error("{kind} does not support {operation}")]
    UnsupportedOperation {
        /// MidoNet kind
        kind: String,
        /// Requested operation
        operation: String,
    },

    /// Connection refused, timeout, or the response could not be read
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// HTTP method
        method: String,
        /// Full request URL
        url: String,
        /// Underlying transport error
        reason: String,
    },

    /// The resource body could not be encoded
    #[error("failed to serialize {resource}: {source}")]
    Serialize {
        /// Resource identity (kind and item path)
        resource: String,
        /// serde error
        #[source]
        source: serde_json::Error,
    },

    /// The client could not be built from its configuration
    #[error("invalid MidoNet client configuration: {0}")]
    InvalidConfig(String),
}

/// Any error the reconciliation core can return.
#[derive(Error, Debug)]
pub enum Error {
    /// Client key parsing error
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Conversion error
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// MidoNet API error
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl Error {
    /// Returns true if re-delivering the same event later can succeed.
    ///
    /// Retryable: a dependency or parent that is not there yet, and transport failures.
    /// Everything else (malformed input, unexpected API status, invalid keys,
    /// unsupported operations) is fatal.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Convert(ConvertError::DependencyNotReady { .. })
            | Self::Client(ClientError::ParentNotReady { .. } | ClientError::Transport { .. }) => {
                true
            }

            Self::Key(_)
            | Self::Convert(ConvertError::MalformedInput { .. })
            | Self::Client(
                ClientError::UnexpectedStatus { .. }
                | ClientError::UnsupportedOperation { .. }
                | ClientError::Serialize { .. }
                | ClientError::InvalidConfig(_),
            ) => false,
        }
    }

    /// Returns true if the error must stop the controller.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }

    /// Short machine-readable reason, used as a metrics label.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Key(KeyError::Invalid { .. }) => "InvalidKey",
            Self::Convert(ConvertError::DependencyNotReady { .. }) => "DependencyNotReady",
            Self::Convert(ConvertError::MalformedInput { .. }) => "MalformedInput",
            Self::Client(ClientError::ParentNotReady { .. }) => "ParentNotReady",
            Self::Client(ClientError::UnexpectedStatus { .. }) => "UnexpectedStatus",
            Self::Client(ClientError::UnsupportedOperation { .. }) => "UnsupportedOperation",
            Self::Client(ClientError::Transport { .. }) => "TransportError",
            Self::Client(ClientError::Serialize { .. }) => "SerializeError",
            Self::Client(ClientError::InvalidConfig(_)) => "InvalidConfig",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
