// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! Every flag falls back to a `MIDONETKUBE_` environment variable. [`Config::validate`]
//! checks the raw values once at startup and produces the typed settings the
//! library takes.

use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_ENABLED_CONTROLLERS, DEFAULT_TENANT,
    METRICS_SERVER_BIND_ADDRESS,
};
use crate::converter::ConverterConfig;
use crate::midonet::ClientConfig;
use clap::Parser;
use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Raw controller configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "midonet-kube", version, about = "Kubernetes to MidoNet translation controller")]
pub struct Config {
    /// MidoNet API base URL, e.g. `http://midonet-api:8080/midonet-api`
    #[arg(long, env = "MIDONETKUBE_MIDONET_API")]
    pub midonet_api: String,

    /// UUID of the pre-existing router connecting all node bridges
    #[arg(long, env = "MIDONETKUBE_CLUSTER_ROUTER")]
    pub cluster_router: String,

    /// MidoNet tenant owning created devices and chains
    #[arg(long, env = "MIDONETKUBE_TENANT", default_value = DEFAULT_TENANT)]
    pub tenant: String,

    /// Comma-separated controllers to run
    #[arg(
        long,
        env = "MIDONETKUBE_ENABLED_CONTROLLERS",
        default_value = DEFAULT_ENABLED_CONTROLLERS,
        value_delimiter = ','
    )]
    pub enabled_controllers: Vec<String>,

    /// MidoNet API request timeout in seconds
    #[arg(long, env = "MIDONETKUBE_API_TIMEOUT_SECS", default_value_t = DEFAULT_API_TIMEOUT_SECS)]
    pub api_timeout_secs: u64,

    /// Bind address of the metrics and health server
    #[arg(long, env = "MIDONETKUBE_METRICS_ADDR", default_value = METRICS_SERVER_BIND_ADDRESS)]
    pub metrics_addr: String,
}

/// Controllers that can be enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControllerKind {
    Node,
    Pod,
    Service,
    Endpoints,
}

impl ControllerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Pod => "pod",
            Self::Service => "service",
            Self::Endpoints => "endpoints",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControllerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "node" | "nodes" => Ok(Self::Node),
            "pod" | "pods" => Ok(Self::Pod),
            "service" | "services" => Ok(Self::Service),
            "endpoints" => Ok(Self::Endpoints),
            _ => Err(ConfigError::UnknownController(s.to_string())),
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid MidoNet API URL '{value}': {reason}")]
    InvalidApiUrl { value: String, reason: String },

    #[error("MidoNet API URL '{0}' must use http or https")]
    UnsupportedScheme(String),

    #[error("invalid cluster router UUID '{value}': {reason}")]
    InvalidClusterRouter { value: String, reason: String },

    #[error("tenant must not be empty")]
    EmptyTenant,

    #[error("API timeout must be at least one second")]
    InvalidTimeout,

    #[error("unknown controller '{0}' (expected node, pod, service or endpoints)")]
    UnknownController(String),

    #[error("no controllers enabled")]
    NoControllers,

    #[error("invalid metrics address '{value}': {reason}")]
    InvalidMetricsAddr { value: String, reason: String },
}

/// Configuration after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub client: ClientConfig,
    pub converter: ConverterConfig,
    pub controllers: BTreeSet<ControllerKind>,
    pub metrics_addr: SocketAddr,
}

impl ValidatedConfig {
    /// Whether `kind` is enabled.
    #[must_use]
    pub fn is_enabled(&self, kind: ControllerKind) -> bool {
        self.controllers.contains(&kind)
    }
}

impl Config {
    /// Check every value and build the typed settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let api = Url::parse(&self.midonet_api).map_err(|e| ConfigError::InvalidApiUrl {
            value: self.midonet_api.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(self.midonet_api.clone()));
        }

        let cluster_router =
            Uuid::parse_str(self.cluster_router.trim()).map_err(|e| {
                ConfigError::InvalidClusterRouter {
                    value: self.cluster_router.clone(),
                    reason: e.to_string(),
                }
            })?;

        let tenant = self.tenant.trim();
        if tenant.is_empty() {
            return Err(ConfigError::EmptyTenant);
        }

        if self.api_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let controllers = self
            .enabled_controllers
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.parse::<ControllerKind>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        if controllers.is_empty() {
            return Err(ConfigError::NoControllers);
        }

        let metrics_addr =
            self.metrics_addr
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::InvalidMetricsAddr {
                    value: self.metrics_addr.clone(),
                    reason: e.to_string(),
                })?;

        Ok(ValidatedConfig {
            client: ClientConfig {
                api,
                timeout: Duration::from_secs(self.api_timeout_secs),
            },
            converter: ConverterConfig {
                tenant: tenant.to_string(),
                cluster_router,
            },
            controllers,
            metrics_addr,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
