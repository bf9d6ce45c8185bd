// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! MidoNet backend resource model.
//!
//! Every resource kind the controller manages is a plain struct whose JSON form is
//! the MidoNet REST body. [`BackendResource`] is the closed sum over those kinds and
//! exposes the capability set the client needs:
//!
//! - [`BackendResource::media_type`] - the kind's versioned content type
//! - [`BackendResource::path`] - the REST path for an [`Operation`], or `None` when the
//!   kind does not support it
//! - [`BackendResource::parent`] / [`BackendResource::set_parent`] - the containing
//!   object for kinds created under a parent collection
//!
//! Parent ids are never serialized; they only select the creation path.
//!
//! Resource models follow <https://docs.midonet.org/docs/v5.4/en/rest-api/content/resource-models.html>.

use super::types::{
    FlowAction, Ipv4Subnet, MacAddr, NatTarget, Operation, PortRange, PortType, RouteType,
    RuleType,
};
use crate::constants::MEDIA_TYPE_VENDOR;
use serde::Serialize;
use std::net::Ipv4Addr;
use uuid::Uuid;

/// Per-kind knowledge of the MidoNet REST API.
trait ApiResource {
    /// MidoNet kind name
    const KIND: &'static str;

    /// Media type version
    const VERSION: u8;

    /// Media type name when it differs from the kind name
    const MEDIA_NAME: Option<&'static str> = None;

    fn path(&self, op: Operation) -> Option<String>;

    fn parent(&self) -> Option<Uuid> {
        None
    }

    fn set_parent(&mut self, _id: Uuid) -> bool {
        false
    }
}

/// Implements the parent accessors for kinds with a `parent` field.
macro_rules! parented {
    () => {
        fn parent(&self) -> Option<Uuid> {
            Some(self.parent)
        }

        fn set_parent(&mut self, id: Uuid) -> bool {
            self.parent = id;
            true
        }
    };
}

/// Tunnel zone grouping the hosts that tunnel to each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TunnelZone {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: String,
}

impl ApiResource for TunnelZone {
    const KIND: &'static str = "TunnelZone";
    const VERSION: u8 = 1;

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some("/tunnel_zones".to_string()),
            Operation::Update | Operation::Delete | Operation::Read => {
                Some(format!("/tunnel_zones/{}", self.id))
            }
        }
    }
}

/// Membership of a host in a tunnel zone. Parent is the tunnel zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelZoneHost {
    #[serde(skip)]
    pub parent: Uuid,
    pub host_id: Uuid,
    pub ip_address: Ipv4Addr,
}

impl ApiResource for TunnelZoneHost {
    const KIND: &'static str = "TunnelZoneHost";
    const VERSION: u8 = 1;

    parented!();

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some(format!("/tunnel_zones/{}/hosts", self.parent)),
            Operation::Delete | Operation::Read => Some(format!(
                "/tunnel_zones/{}/hosts/{}",
                self.parent, self.host_id
            )),
            Operation::Update => None,
        }
    }
}

/// Virtual router.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_filter_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_filter_id: Option<Uuid>,
}

impl ApiResource for Router {
    const KIND: &'static str = "Router";
    const VERSION: u8 = 3;

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some("/routers".to_string()),
            Operation::Update | Operation::Delete | Operation::Read => {
                Some(format!("/routers/{}", self.id))
            }
        }
    }
}

/// Virtual L2 bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bridge {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_filter_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_filter_id: Option<Uuid>,
}

impl ApiResource for Bridge {
    const KIND: &'static str = "Bridge";
    const VERSION: u8 = 4;

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some("/bridges".to_string()),
            Operation::Update | Operation::Delete | Operation::Read => {
                Some(format!("/bridges/{}", self.id))
            }
        }
    }
}

/// Bridge or router port. Parent is the owning device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    #[serde(skip)]
    pub parent: Uuid,
    pub id: Uuid,
    #[serde(rename = "type")]
    pub port_type: PortType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port_subnet: Vec<Ipv4Subnet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_mac: Option<MacAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_filter_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_filter_id: Option<Uuid>,
}

impl ApiResource for Port {
    const KIND: &'static str = "Port";
    const VERSION: u8 = 3;

    parented!();

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => {
                let collection = match self.port_type {
                    PortType::Bridge => "bridges",
                    PortType::Router => "routers",
                };
                Some(format!("/{collection}/{}/ports", self.parent))
            }
            Operation::Update | Operation::Delete | Operation::Read => {
                Some(format!("/ports/{}", self.id))
            }
        }
    }
}

/// Link between two ports. Parent is the port the link is created on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortLink {
    #[serde(skip)]
    pub parent: Uuid,
    pub port_id: Uuid,
    pub peer_id: Uuid,
}

impl ApiResource for PortLink {
    const KIND: &'static str = "PortLink";
    const VERSION: u8 = 1;

    parented!();

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create | Operation::Delete => Some(format!("/ports/{}/link", self.parent)),
            Operation::Update | Operation::Read => None,
        }
    }
}

/// Router route. Parent is the router.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(skip)]
    pub parent: Uuid,
    pub id: Uuid,
    pub dst_network_addr: Ipv4Addr,
    pub dst_network_length: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hop_gateway: Option<Ipv4Addr>,
    pub next_hop_port: Uuid,
    pub src_network_addr: Ipv4Addr,
    pub src_network_length: u8,
    #[serde(rename = "type")]
    pub route_type: RouteType,
}

impl ApiResource for Route {
    const KIND: &'static str = "Route";
    const VERSION: u8 = 1;

    parented!();

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some(format!("/routers/{}/routes", self.parent)),
            Operation::Delete | Operation::Read => Some(format!("/routes/{}", self.id)),
            Operation::Update => None,
        }
    }
}

/// Rule chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
}

impl ApiResource for Chain {
    const KIND: &'static str = "Chain";
    const VERSION: u8 = 1;

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some("/chains".to_string()),
            Operation::Delete | Operation::Read => Some(format!("/chains/{}", self.id)),
            Operation::Update => None,
        }
    }
}

/// Chain rule. Parent is the chain.
///
/// Condition fields left `None` are omitted from the body and match anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(skip)]
    pub parent: Uuid,
    pub id: Uuid,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dl_type: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nw_dst_address: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nw_dst_length: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nw_proto: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_dst: Option<PortRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jump_chain_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_action: Option<FlowAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_targets: Option<Vec<NatTarget>>,
}

impl Rule {
    /// Rule in chain `from` jumping unconditionally to chain `to`.
    #[must_use]
    pub fn jump(id: Uuid, from: Uuid, to: Uuid) -> Self {
        Self {
            parent: from,
            id,
            rule_type: RuleType::Jump,
            dl_type: None,
            nw_dst_address: None,
            nw_dst_length: None,
            nw_proto: None,
            tp_dst: None,
            jump_chain_id: Some(to),
            flow_action: None,
            nat_targets: None,
        }
    }

    /// Rule in `chain` translating the destination to `target` and accepting the flow.
    #[must_use]
    pub fn dnat(id: Uuid, chain: Uuid, target: NatTarget) -> Self {
        Self {
            parent: chain,
            id,
            rule_type: RuleType::Dnat,
            dl_type: None,
            nw_dst_address: None,
            nw_dst_length: None,
            nw_proto: None,
            tp_dst: None,
            jump_chain_id: None,
            flow_action: Some(FlowAction::Accept),
            nat_targets: Some(vec![target]),
        }
    }
}

impl ApiResource for Rule {
    const KIND: &'static str = "Rule";
    const VERSION: u8 = 2;

    parented!();

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some(format!("/chains/{}/rules", self.parent)),
            Operation::Delete | Operation::Read => Some(format!("/rules/{}", self.id)),
            Operation::Update => None,
        }
    }
}

/// Host running a MidoNet agent. Hosts register themselves; the controller only reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Host {
    pub id: Uuid,
    pub name: String,
}

impl ApiResource for Host {
    const KIND: &'static str = "Host";
    const VERSION: u8 = 3;

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Read => Some(format!("/hosts/{}", self.id)),
            Operation::Create | Operation::Update | Operation::Delete => None,
        }
    }
}

/// Binding of a host interface to a virtual port. Parent is the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInterfacePort {
    #[serde(skip)]
    pub parent: Uuid,
    pub host_id: Uuid,
    pub port_id: Uuid,
    pub interface_name: String,
}

impl ApiResource for HostInterfacePort {
    const KIND: &'static str = "HostInterfacePort";
    const VERSION: u8 = 1;

    parented!();

    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some(format!("/hosts/{}/ports", self.parent)),
            Operation::Delete | Operation::Read => {
                Some(format!("/hosts/{}/ports/{}", self.parent, self.port_id))
            }
            Operation::Update => None,
        }
    }
}

/// Bridge MAC table entry. Parent is the bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacPort {
    #[serde(skip)]
    pub parent: Uuid,
    pub mac_addr: MacAddr,
    pub port_id: Uuid,
}

impl ApiResource for MacPort {
    const KIND: &'static str = "MACPort";
    const VERSION: u8 = 2;

    parented!();

    // Item path segment is `{mac with dashes}_{port id}`.
    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some(format!("/bridges/{}/mac_table", self.parent)),
            Operation::Delete | Operation::Read => Some(format!(
                "/bridges/{}/mac_table/{}_{}",
                self.parent,
                self.mac_addr.url_form(),
                self.port_id
            )),
            Operation::Update => None,
        }
    }
}

/// Bridge ARP table entry. Parent is the bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ipv4MacPair {
    #[serde(skip)]
    pub parent: Uuid,
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
}

impl ApiResource for Ipv4MacPair {
    const KIND: &'static str = "IPv4MACPair";
    const VERSION: u8 = 1;
    const MEDIA_NAME: Option<&'static str> = Some("IP4Mac");

    parented!();

    // Item path segment is `{ip}_{mac with dashes}`.
    fn path(&self, op: Operation) -> Option<String> {
        match op {
            Operation::Create => Some(format!("/bridges/{}/arp_table", self.parent)),
            Operation::Delete | Operation::Read => Some(format!(
                "/bridges/{}/arp_table/{}_{}",
                self.parent,
                self.ip,
                self.mac.url_form()
            )),
            Operation::Update => None,
        }
    }
}

/// Generates [`BackendResource`] with exhaustive dispatch over every kind.
macro_rules! backend_resources {
    ($($variant:ident),+ $(,)?) => {
        /// Any MidoNet resource the controller can push or delete.
        ///
        /// Serializes as the wrapped resource's own body.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum BackendResource {
            $($variant($variant),)+
        }

        impl BackendResource {
            /// MidoNet kind name (e.g. `Bridge`, `MACPort`).
            #[must_use]
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$variant as ApiResource>::KIND,)+
                }
            }

            /// Content type of the resource body.
            #[must_use]
            pub fn media_type(&self) -> String {
                match self {
                    $(Self::$variant(_) => media_type::<$variant>(),)+
                }
            }

            /// REST path for `op`, or `None` when the kind does not support it.
            #[must_use]
            pub fn path(&self, op: Operation) -> Option<String> {
                match self {
                    $(Self::$variant(r) => r.path(op),)+
                }
            }

            /// Parent id for kinds created under a parent collection.
            #[must_use]
            pub fn parent(&self) -> Option<Uuid> {
                match self {
                    $(Self::$variant(r) => r.parent(),)+
                }
            }

            /// Set the parent id. Returns `false` for kinds without a parent.
            pub fn set_parent(&mut self, id: Uuid) -> bool {
                match self {
                    $(Self::$variant(r) => r.set_parent(id),)+
                }
            }
        }

        $(
            impl From<$variant> for BackendResource {
                fn from(r: $variant) -> Self {
                    Self::$variant(r)
                }
            }
        )+
    };
}

backend_resources!(
    TunnelZone,
    TunnelZoneHost,
    Router,
    Bridge,
    Port,
    PortLink,
    Route,
    Chain,
    Rule,
    Host,
    HostInterfacePort,
    MacPort,
    Ipv4MacPair,
);

fn media_type<R: ApiResource>() -> String {
    let name = R::MEDIA_NAME.unwrap_or(R::KIND);
    format!("{MEDIA_TYPE_VENDOR}.{name}-v{}+json", R::VERSION)
}

impl BackendResource {
    /// Whether the kind supports `op`.
    #[must_use]
    pub fn supports(&self, op: Operation) -> bool {
        self.path(op).is_some()
    }

    /// Whether the resource is created under a parent.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    /// Stable identity of the backend object this resource describes.
    ///
    /// Two resources with the same identity address the same backend object,
    /// whatever their content.
    #[must_use]
    pub fn identity(&self) -> String {
        let path = self
            .path(Operation::Delete)
            .or_else(|| self.path(Operation::Read))
            .unwrap_or_default();
        format!("{} {path}", self.kind())
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
