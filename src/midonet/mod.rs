// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! MidoNet REST API access.
//!
//! - [`types`] and [`resources`] model the backend objects the controller manages
//! - [`transport`] sends raw requests
//! - [`client`] applies MidoNet's status-code semantics on top
//!
//! # Example
//!
//! ```rust,no_run
//! use midonet_kube::midonet::{ClientConfig, MidonetClient};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = MidonetClient::from_config(&ClientConfig {
//!     api: "http://midonet-api:8080/midonet-api".parse()?,
//!     timeout: Duration::from_secs(30),
//! })?;
//! client.push(&[]).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod resources;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::MidonetClient;
pub use resources::BackendResource;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use types::Operation;

use std::time::Duration;
use url::Url;

/// Connection settings of the MidoNet API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://midonet-api:8080/midonet-api`
    pub api: Url,
    /// Per-request timeout
    pub timeout: Duration,
}
