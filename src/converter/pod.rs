// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Pod translation.
//!
//! A scheduled pod gets a port on its node's bridge, bound to the host-side
//! interface the CNI plugin creates for it. Once the pod has an IP and the CNI
//! plugin has published the interface MAC, the bridge learns both statically.

use super::node::{self, bridge_id};
use super::{Converter, ConverterConfig, Key, SubResource, SubResourceMap};
use crate::annotations::{self, MAC_ANNOTATION};
use crate::constants::KIND_POD_ARP;
use crate::errors::ConvertError;
use crate::identity::if_name_for_key;
use crate::midonet::resources::{HostInterfacePort, Ipv4MacPair, MacPort, Port};
use crate::midonet::types::{MacAddr, PortType};
use crate::midonet::BackendResource;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::runtime::reflector::{ObjectRef, Store};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Read-only access to known nodes.
pub trait NodeLookup: Send + Sync {
    /// The node named `name`, if known.
    fn node(&self, name: &str) -> Option<Arc<Node>>;
}

impl NodeLookup for Store<Node> {
    fn node(&self, name: &str) -> Option<Arc<Node>> {
        self.get(&ObjectRef::new(name))
    }
}

/// Converter for `Pod` objects.
#[derive(Debug, Clone)]
pub struct PodConverter<L> {
    nodes: L,
}

impl<L: NodeLookup> PodConverter<L> {
    #[must_use]
    pub fn new(nodes: L) -> Self {
        Self { nodes }
    }

    fn host_id(&self, key: &Key, node_name: &str) -> Result<Uuid, ConvertError> {
        let node = self.nodes.node(node_name).ok_or_else(|| {
            ConvertError::not_ready(key, format!("node {node_name} is not known yet"))
        })?;
        match node::host_id(&node) {
            Some(Ok(id)) => Ok(id),
            Some(Err(reason)) => Err(ConvertError::not_ready(
                key,
                format!("node {node_name}: {reason}"),
            )),
            None => Err(ConvertError::not_ready(
                key,
                format!("node {node_name} has no host id yet"),
            )),
        }
    }
}

impl<L: NodeLookup> Converter for PodConverter<L> {
    type Object = Pod;

    fn convert(
        &self,
        key: &Key,
        object: Option<&Pod>,
        _config: &ConverterConfig,
    ) -> Result<(Vec<BackendResource>, SubResourceMap), ConvertError> {
        let Some(pod) = object else {
            return Ok((Vec::new(), SubResourceMap::new()));
        };
        let spec = pod.spec.as_ref();
        let Some(node_name) = spec
            .and_then(|s| s.node_name.as_deref())
            .filter(|n| !n.is_empty())
        else {
            debug!(key = %key, "Pod is not scheduled yet");
            return Ok((Vec::new(), SubResourceMap::new()));
        };
        if spec.and_then(|s| s.host_network).unwrap_or(false) {
            debug!(key = %key, "Pod uses the host network");
            return Ok((Vec::new(), SubResourceMap::new()));
        }

        let host_id = self.host_id(key, node_name)?;
        let bridge_id = bridge_id(node_name);
        let port_id = key.id();

        let resources = vec![
            Port {
                parent: bridge_id,
                id: port_id,
                port_type: PortType::Bridge,
                port_subnet: Vec::new(),
                port_mac: None,
                inbound_filter_id: None,
                outbound_filter_id: None,
            }
            .into(),
            HostInterfacePort {
                parent: host_id,
                host_id,
                port_id,
                interface_name: if_name_for_key(&key.translation_name()),
            }
            .into(),
        ];

        let mut subs = SubResourceMap::new();
        if let Some(arp) = port_arp(key, pod, bridge_id, port_id)? {
            subs.insert(
                key.sub(KIND_POD_ARP, &format!("{}/{}", arp.ip, arp.mac)),
                Box::new(arp),
            );
        }
        Ok((resources, subs))
    }
}

fn port_arp(
    key: &Key,
    pod: &Pod,
    bridge_id: Uuid,
    port_id: Uuid,
) -> Result<Option<PortArp>, ConvertError> {
    let pod_ip = pod
        .status
        .as_ref()
        .and_then(|s| s.pod_ip.as_deref())
        .filter(|ip| !ip.is_empty() && !ip.contains(':'));
    let mac = annotations::get(pod.metadata.annotations.as_ref(), MAC_ANNOTATION);
    let (Some(pod_ip), Some(mac)) = (pod_ip, mac) else {
        debug!(key = %key, "Pod has no IPv4 address or MAC annotation yet");
        return Ok(None);
    };

    let ip: Ipv4Addr = pod_ip
        .parse()
        .map_err(|_| ConvertError::malformed(key, format!("invalid pod IP '{pod_ip}'")))?;
    let mac = mac
        .parse::<MacAddr>()
        .map_err(|e| ConvertError::malformed(key, e.to_string()))?;
    Ok(Some(PortArp {
        bridge_id,
        port_id,
        ip,
        mac,
    }))
}

/// Static ARP and MAC table entries of a pod on its node bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortArp {
    bridge_id: Uuid,
    port_id: Uuid,
    ip: Ipv4Addr,
    mac: MacAddr,
}

impl SubResource for PortArp {
    fn convert(
        &self,
        _key: &Key,
        _config: &ConverterConfig,
    ) -> Result<Vec<BackendResource>, ConvertError> {
        Ok(vec![
            Ipv4MacPair {
                parent: self.bridge_id,
                ip: self.ip,
                mac: self.mac,
            }
            .into(),
            MacPort {
                parent: self.bridge_id,
                mac_addr: self.mac,
                port_id: self.port_id,
            }
            .into(),
        ])
    }
}

#[cfg(test)]
#[path = "pod_tests.rs"]
mod pod_tests;
