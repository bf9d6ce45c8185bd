// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Endpoints translation.
//!
//! Every ready `address × port` of an `Endpoints` object becomes an `Endpoint`
//! sub-resource: a chain DNATing to the backend, and a rule in the service-port
//! chain jumping to it. Endpoints produce no primary resources.
//!
//! All jump rules match unconditionally, so the first endpoint in a service-port
//! chain receives all of its traffic.

use super::service::{ip_protocol, service_port_key};
use super::{Converter, ConverterConfig, Key, SubResource, SubResourceMap};
use crate::constants::{ENDPOINT_CHAIN_PREFIX, KIND_ENDPOINT};
use crate::errors::ConvertError;
use crate::identity::sub_id;
use crate::midonet::resources::{Chain, Rule};
use crate::midonet::types::NatTarget;
use crate::midonet::BackendResource;
use k8s_openapi::api::core::v1::Endpoints;
use std::net::Ipv4Addr;
use uuid::Uuid;

/// Converter for `Endpoints` objects.
#[derive(Debug, Default, Clone)]
pub struct EndpointsConverter;

impl EndpointsConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for EndpointsConverter {
    type Object = Endpoints;

    fn convert(
        &self,
        key: &Key,
        object: Option<&Endpoints>,
        _config: &ConverterConfig,
    ) -> Result<(Vec<BackendResource>, SubResourceMap), ConvertError> {
        let mut subs = SubResourceMap::new();
        let subsets = object.and_then(|e| e.subsets.as_ref()).into_iter().flatten();

        for subset in subsets {
            let addresses = subset
                .addresses
                .iter()
                .flatten()
                .filter(|a| !a.ip.contains(':'));
            for address in addresses {
                let ip: Ipv4Addr = address.ip.parse().map_err(|_| {
                    ConvertError::malformed(key, format!("invalid endpoint IP '{}'", address.ip))
                })?;
                for port in subset.ports.iter().flatten() {
                    let port_name = port.name.as_deref().unwrap_or_default();
                    let protocol = port.protocol.as_deref().unwrap_or("TCP");
                    ip_protocol(key, Some(protocol))?;
                    let number = u16::try_from(port.port).map_err(|_| {
                        ConvertError::malformed(key, format!("invalid port {}", port.port))
                    })?;

                    subs.insert(
                        key.sub(
                            KIND_ENDPOINT,
                            &format!("{port_name}/{ip}/{number}/{protocol}"),
                        ),
                        Box::new(Endpoint {
                            service_port_chain: service_port_key(
                                &key.namespace,
                                &key.name,
                                port_name,
                            )
                            .id(),
                            ip,
                            port: number,
                        }),
                    );
                }
            }
        }
        Ok((Vec::new(), subs))
    }
}

/// One backend of one service port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    service_port_chain: Uuid,
    ip: Ipv4Addr,
    port: u16,
}

impl SubResource for Endpoint {
    fn convert(
        &self,
        key: &Key,
        config: &ConverterConfig,
    ) -> Result<Vec<BackendResource>, ConvertError> {
        let chain_id = key.id();
        Ok(vec![
            Chain {
                id: chain_id,
                tenant_id: config.tenant.clone(),
                name: format!("{ENDPOINT_CHAIN_PREFIX}{}", key.client_key()),
            }
            .into(),
            Rule::jump(
                sub_id(chain_id, "Jump to Endpoint"),
                self.service_port_chain,
                chain_id,
            )
            .into(),
            Rule::dnat(
                sub_id(chain_id, "DNAT"),
                chain_id,
                NatTarget::single(self.ip, self.port),
            )
            .into(),
        ])
    }
}

#[cfg(test)]
#[path = "endpoints_tests.rs"]
mod endpoints_tests;
