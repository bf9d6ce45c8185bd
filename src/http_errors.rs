// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! HTTP status code classification for MidoNet API responses.
//!
//! The MidoNet API signals idempotency conditions through status codes rather than
//! response bodies. This module maps each status to what the client does next.
//!
//! # Usage
//!
//! ```rust
//! use midonet_kube::http_errors::{classify_create, CreateOutcome};
//! use reqwest::StatusCode;
//!
//! assert_eq!(classify_create(StatusCode::CONFLICT, false), CreateOutcome::Conflict);
//! assert_eq!(
//!     classify_create(StatusCode::NOT_FOUND, true),
//!     CreateOutcome::ParentNotReady
//! );
//! ```

use reqwest::StatusCode;

/// What a create (POST) response means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Created
    Success,
    /// The parent collection does not exist yet
    ParentNotReady,
    /// The object already exists
    Conflict,
    /// No handling for this status
    Unexpected,
}

/// What a delete (DELETE) response means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Deleted
    Deleted,
    /// Already gone, e.g. removed by a cascade from its parent
    AlreadyGone,
    /// No handling for this status
    Unexpected,
}

/// Classify the status of a create request.
///
/// # Arguments
///
/// * `status` - HTTP status of the POST response
/// * `has_parent` - whether the resource is created under a parent collection
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Parent | Outcome |
/// |-----------|--------|---------|
/// | 2xx | any | `Success` |
/// | 404 | yes | `ParentNotReady` |
/// | 409 | any | `Conflict` |
/// | Other | any | `Unexpected` |
#[must_use]
pub fn classify_create(status: StatusCode, has_parent: bool) -> CreateOutcome {
    match status {
        s if s.is_success() => CreateOutcome::Success,
        StatusCode::NOT_FOUND if has_parent => CreateOutcome::ParentNotReady,
        StatusCode::CONFLICT => CreateOutcome::Conflict,
        _ => CreateOutcome::Unexpected,
    }
}

/// Classify the status of a delete request.
///
/// | HTTP Code | Outcome |
/// |-----------|---------|
/// | 2xx | `Deleted` |
/// | 404 | `AlreadyGone` |
/// | Other | `Unexpected` |
#[must_use]
pub fn classify_delete(status: StatusCode) -> DeleteOutcome {
    match status {
        s if s.is_success() => DeleteOutcome::Deleted,
        StatusCode::NOT_FOUND => DeleteOutcome::AlreadyGone,
        _ => DeleteOutcome::Unexpected,
    }
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
