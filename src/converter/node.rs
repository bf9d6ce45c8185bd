// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Node translation.
//!
//! Every node with a pod CIDR gets a bridge for its pods, linked to the cluster
//! router through a router port that owns the pod subnet gateway address:
//!
//! ```text
//! cluster router --[router port]--link--[bridge port]-- node bridge -- pod ports
//! ```
//!
//! The cluster router routes the pod CIDR to the router port, and each routable
//! node status address to the node itself. A node with a host id annotation joins
//! the cluster tunnel zone with its internal IP.
//!
//! Traffic entering a node bridge goes through the services chain, where service
//! jump rules pick it up.

use super::bootstrap::{services_chain_id, tunnel_zone_id};
use super::{Converter, ConverterConfig, Key, SubResource, SubResourceMap};
use crate::annotations::{self, HOST_ID_ANNOTATION};
use crate::constants::{KIND_NODE, KIND_NODE_ADDRESS};
use crate::errors::ConvertError;
use crate::identity::{mac_for_key, sub_id};
use crate::midonet::resources::{Bridge, Port, PortLink, Route, TunnelZoneHost};
use crate::midonet::types::{Ipv4Subnet, PortType, RouteType};
use crate::midonet::BackendResource;
use k8s_openapi::api::core::v1::Node;
use std::net::Ipv4Addr;
use tracing::{debug, warn};
use uuid::Uuid;

const INTERNAL_IP: &str = "InternalIP";
const EXTERNAL_IP: &str = "ExternalIP";

/// Id of the bridge of node `name`.
#[must_use]
pub fn bridge_id(name: &str) -> Uuid {
    Key::new(KIND_NODE, "", name).id()
}

/// Id of the bridge-side port linking node `bridge` to the cluster router.
#[must_use]
pub fn bridge_port_id(bridge: Uuid) -> Uuid {
    sub_id(bridge, "Bridge Port")
}

/// Id of the router-side port linking node `bridge` to the cluster router.
#[must_use]
pub fn router_port_id(bridge: Uuid) -> Uuid {
    sub_id(bridge, "Router Port")
}

/// Converter for `Node` objects.
#[derive(Debug, Default, Clone)]
pub struct NodeConverter;

impl NodeConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for NodeConverter {
    type Object = Node;

    fn convert(
        &self,
        key: &Key,
        object: Option<&Node>,
        config: &ConverterConfig,
    ) -> Result<(Vec<BackendResource>, SubResourceMap), ConvertError> {
        let Some(node) = object else {
            return Ok((Vec::new(), SubResourceMap::new()));
        };
        let Some(subnet) = pod_subnet(key, node)? else {
            debug!(key = %key, "Node has no IPv4 pod CIDR yet");
            return Ok((Vec::new(), SubResourceMap::new()));
        };

        let bridge_id = key.id();
        let bridge_port_id = bridge_port_id(bridge_id);
        let router_port_id = router_port_id(bridge_id);
        let network = subnet.with_addr(subnet.network());

        let mut resources: Vec<BackendResource> = vec![
            Bridge {
                id: bridge_id,
                tenant_id: config.tenant.clone(),
                name: format!("node-{}", key.name),
                inbound_filter_id: Some(services_chain_id(config.cluster_router)),
                outbound_filter_id: None,
            }
            .into(),
            Port {
                parent: bridge_id,
                id: bridge_port_id,
                port_type: PortType::Bridge,
                port_subnet: Vec::new(),
                port_mac: None,
                inbound_filter_id: None,
                outbound_filter_id: None,
            }
            .into(),
            Port {
                parent: config.cluster_router,
                id: router_port_id,
                port_type: PortType::Router,
                port_subnet: vec![subnet.with_addr(subnet.host(1))],
                port_mac: Some(mac_for_key(&format!(
                    "{}/router-port",
                    key.translation_name()
                ))),
                inbound_filter_id: None,
                outbound_filter_id: None,
            }
            .into(),
            PortLink {
                parent: router_port_id,
                port_id: router_port_id,
                peer_id: bridge_port_id,
            }
            .into(),
            Route {
                parent: config.cluster_router,
                id: sub_id(bridge_id, &format!("Pod Subnet Route {network}")),
                dst_network_addr: network.addr,
                dst_network_length: network.prefix_len,
                next_hop_gateway: None,
                next_hop_port: router_port_id,
                src_network_addr: Ipv4Addr::UNSPECIFIED,
                src_network_length: 0,
                route_type: RouteType::Normal,
            }
            .into(),
        ];

        if let Some(membership) = tunnel_zone_host(key, node, config) {
            resources.push(membership.into());
        }

        let subs = node_addresses(key, node, router_port_id, subnet.host(2))?;
        Ok((resources, subs))
    }
}

/// First IPv4 pod CIDR of the node. IPv6 CIDRs are ignored.
fn pod_subnet(key: &Key, node: &Node) -> Result<Option<Ipv4Subnet>, ConvertError> {
    let Some(spec) = node.spec.as_ref() else {
        return Ok(None);
    };
    let mut candidates = spec
        .pod_cidrs
        .iter()
        .flatten()
        .chain(spec.pod_cidr.iter())
        .filter(|cidr| !cidr.contains(':'));

    match candidates.next() {
        Some(cidr) => cidr
            .parse::<Ipv4Subnet>()
            .map(Some)
            .map_err(|e| ConvertError::malformed(key, format!("pod CIDR: {e}"))),
        None => Ok(None),
    }
}

/// Host id from the node annotation, `None` when the annotation is absent.
pub(crate) fn host_id(node: &Node) -> Option<Result<Uuid, String>> {
    annotations::get(node.metadata.annotations.as_ref(), HOST_ID_ANNOTATION).map(|value| {
        Uuid::parse_str(value).map_err(|e| format!("invalid host id '{value}': {e}"))
    })
}

fn tunnel_zone_host(key: &Key, node: &Node, config: &ConverterConfig) -> Option<TunnelZoneHost> {
    let host_id = match host_id(node) {
        None => {
            debug!(key = %key, "Node has no host id annotation yet");
            return None;
        }
        Some(Err(reason)) => {
            warn!(key = %key, reason = %reason, "Ignoring node host id annotation");
            return None;
        }
        Some(Ok(id)) => id,
    };

    let internal_ip = node
        .status
        .as_ref()
        .and_then(|s| s.addresses.as_ref())
        .into_iter()
        .flatten()
        .filter(|a| a.type_ == INTERNAL_IP)
        .find_map(|a| a.address.parse::<Ipv4Addr>().ok());
    let Some(ip_address) = internal_ip else {
        debug!(key = %key, "Node has no IPv4 InternalIP, skipping tunnel zone membership");
        return None;
    };

    Some(TunnelZoneHost {
        parent: tunnel_zone_id(&config.tenant),
        host_id,
        ip_address,
    })
}

fn node_addresses(
    key: &Key,
    node: &Node,
    router_port_id: Uuid,
    node_ip: Ipv4Addr,
) -> Result<SubResourceMap, ConvertError> {
    let mut subs = SubResourceMap::new();
    let addresses = node
        .status
        .as_ref()
        .and_then(|s| s.addresses.as_ref())
        .into_iter()
        .flatten()
        .filter(|a| a.type_ == INTERNAL_IP || a.type_ == EXTERNAL_IP)
        .filter(|a| !a.address.contains(':'));

    for address in addresses {
        let ip: Ipv4Addr = address.address.parse().map_err(|_| {
            ConvertError::malformed(
                key,
                format!("invalid {} address '{}'", address.type_, address.address),
            )
        })?;
        subs.insert(
            key.sub(KIND_NODE_ADDRESS, &format!("{}/{ip}", address.type_)),
            Box::new(NodeAddress {
                router_port_id,
                node_ip,
                address: ip,
            }),
        );
    }
    Ok(subs)
}

/// Route sending a node status address to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    router_port_id: Uuid,
    node_ip: Ipv4Addr,
    address: Ipv4Addr,
}

impl SubResource for NodeAddress {
    fn convert(
        &self,
        key: &Key,
        config: &ConverterConfig,
    ) -> Result<Vec<BackendResource>, ConvertError> {
        Ok(vec![Route {
            parent: config.cluster_router,
            id: sub_id(key.id(), &format!("Route via {}", self.node_ip)),
            dst_network_addr: self.address,
            dst_network_length: 32,
            next_hop_gateway: Some(self.node_ip),
            next_hop_port: self.router_port_id,
            src_network_addr: Ipv4Addr::UNSPECIFIED,
            src_network_length: 0,
            route_type: RouteType::Normal,
        }
        .into()])
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod node_tests;
