// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Cluster-wide MidoNet resources.
//!
//! Node and service resources refer to the cluster tunnel zone and the services
//! chain by id, so both are pushed once before any controller starts.

use super::ConverterConfig;
use crate::constants::{
    SERVICES_CHAIN_DISCRIMINATOR, SERVICES_CHAIN_NAME, TUNNEL_ZONE_DISCRIMINATOR, TUNNEL_ZONE_TYPE,
};
use crate::errors::ClientError;
use crate::identity::{id_for_tenant, sub_id};
use crate::midonet::resources::{Chain, TunnelZone};
use crate::midonet::{BackendResource, MidonetClient, Transport};
use tracing::info;
use uuid::Uuid;

/// Id of the tenant's tunnel zone.
#[must_use]
pub fn tunnel_zone_id(tenant: &str) -> Uuid {
    sub_id(id_for_tenant(tenant), TUNNEL_ZONE_DISCRIMINATOR)
}

/// Id of the chain holding one jump rule per service port.
#[must_use]
pub fn services_chain_id(cluster_router: Uuid) -> Uuid {
    sub_id(cluster_router, SERVICES_CHAIN_DISCRIMINATOR)
}

/// The cluster tunnel zone and the services chain.
#[must_use]
pub fn cluster_resources(config: &ConverterConfig) -> Vec<BackendResource> {
    vec![
        TunnelZone {
            id: tunnel_zone_id(&config.tenant),
            name: config.tenant.clone(),
            zone_type: TUNNEL_ZONE_TYPE.to_string(),
        }
        .into(),
        Chain {
            id: services_chain_id(config.cluster_router),
            tenant_id: config.tenant.clone(),
            name: SERVICES_CHAIN_NAME.to_string(),
        }
        .into(),
    ]
}

/// Push the cluster-wide resources.
///
/// # Errors
///
/// Returns the first [`ClientError`] from the push.
pub async fn bootstrap<T: Transport>(
    client: &MidonetClient<T>,
    config: &ConverterConfig,
) -> Result<(), ClientError> {
    info!(
        tenant = %config.tenant,
        cluster_router = %config.cluster_router,
        "Creating cluster-wide MidoNet resources"
    );
    client.push(&cluster_resources(config)).await
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod bootstrap_tests;
