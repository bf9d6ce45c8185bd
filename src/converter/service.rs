// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Service translation.
//!
//! Each port of a ClusterIP service gets its own chain. A rule in the cluster
//! services chain matches traffic to `clusterIP:port/protocol` and jumps to it;
//! the endpoints converter fills the chain with one jump per backend.

use super::bootstrap::services_chain_id;
use super::{Converter, ConverterConfig, Key, SubResource, SubResourceMap};
use crate::constants::{
    ETHERTYPE_IPV4, IP_PROTO_SCTP, IP_PROTO_TCP, IP_PROTO_UDP, KIND_SERVICE_PORT,
    SERVICE_CHAIN_PREFIX,
};
use crate::errors::ConvertError;
use crate::identity::sub_id;
use crate::midonet::resources::{Chain, Rule};
use crate::midonet::types::PortRange;
use crate::midonet::BackendResource;
use k8s_openapi::api::core::v1::Service;
use std::net::Ipv4Addr;
use tracing::debug;

/// Key of the chain of port `port_name` of service `namespace/service`.
#[must_use]
pub fn service_port_key(namespace: &str, service: &str, port_name: &str) -> Key {
    Key::new(KIND_SERVICE_PORT, namespace, format!("{service}/{port_name}"))
}

/// IP protocol number of a Kubernetes protocol name. Unset means TCP.
///
/// # Errors
///
/// Returns [`ConvertError::MalformedInput`] for an unknown protocol.
pub fn ip_protocol(key: &Key, protocol: Option<&str>) -> Result<u8, ConvertError> {
    match protocol.unwrap_or("TCP") {
        "TCP" => Ok(IP_PROTO_TCP),
        "UDP" => Ok(IP_PROTO_UDP),
        "SCTP" => Ok(IP_PROTO_SCTP),
        other => Err(ConvertError::malformed(
            key,
            format!("unknown protocol '{other}'"),
        )),
    }
}

/// Converter for `Service` objects.
#[derive(Debug, Default, Clone)]
pub struct ServiceConverter;

impl ServiceConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for ServiceConverter {
    type Object = Service;

    fn convert(
        &self,
        key: &Key,
        object: Option<&Service>,
        _config: &ConverterConfig,
    ) -> Result<(Vec<BackendResource>, SubResourceMap), ConvertError> {
        let mut subs = SubResourceMap::new();
        let Some(spec) = object.and_then(|s| s.spec.as_ref()) else {
            return Ok((Vec::new(), subs));
        };
        let cluster_ip = match spec.cluster_ip.as_deref() {
            None | Some("" | "None") => {
                debug!(key = %key, "Service has no cluster IP");
                return Ok((Vec::new(), subs));
            }
            Some(ip) if ip.contains(':') => {
                debug!(key = %key, cluster_ip = %ip, "Ignoring IPv6 cluster IP");
                return Ok((Vec::new(), subs));
            }
            Some(ip) => ip.parse::<Ipv4Addr>().map_err(|_| {
                ConvertError::malformed(key, format!("invalid cluster IP '{ip}'"))
            })?,
        };

        for port in spec.ports.iter().flatten() {
            let port_name = port.name.as_deref().unwrap_or_default();
            let number = u16::try_from(port.port).map_err(|_| {
                ConvertError::malformed(key, format!("invalid port {}", port.port))
            })?;
            let protocol = ip_protocol(key, port.protocol.as_deref())?;
            subs.insert(
                service_port_key(&key.namespace, &key.name, port_name),
                Box::new(ServicePort {
                    cluster_ip,
                    port: number,
                    protocol,
                }),
            );
        }
        Ok((Vec::new(), subs))
    }
}

/// Chain of one service port and the rule jumping into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePort {
    cluster_ip: Ipv4Addr,
    port: u16,
    protocol: u8,
}

impl SubResource for ServicePort {
    fn convert(
        &self,
        key: &Key,
        config: &ConverterConfig,
    ) -> Result<Vec<BackendResource>, ConvertError> {
        let chain_id = key.id();
        let discriminator = format!(
            "Jump to Service Port {}:{}/{}",
            self.cluster_ip, self.port, self.protocol
        );
        let mut jump = Rule::jump(
            sub_id(chain_id, &discriminator),
            services_chain_id(config.cluster_router),
            chain_id,
        );
        jump.dl_type = Some(ETHERTYPE_IPV4);
        jump.nw_dst_address = Some(self.cluster_ip);
        jump.nw_dst_length = Some(32);
        jump.nw_proto = Some(self.protocol);
        jump.tp_dst = Some(PortRange::single(self.port));

        Ok(vec![
            Chain {
                id: chain_id,
                tenant_id: config.tenant.clone(),
                name: format!("{SERVICE_CHAIN_PREFIX}{}", key.client_key()),
            }
            .into(),
            jump.into(),
        ])
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
