// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Unit tests for the node converter.

#[cfg(test)]
mod tests {
    use crate::annotations::HOST_ID_ANNOTATION;
    use crate::converter::bootstrap::{services_chain_id, tunnel_zone_id};
    use crate::converter::node::*;
    use crate::converter::{Converter, ConverterConfig, Key};
    use crate::errors::ConvertError;
    use crate::identity::sub_id;
    use crate::midonet::types::Operation;
    use crate::midonet::BackendResource;
    use k8s_openapi::api::core::v1::{Node, NodeAddress, NodeSpec, NodeStatus};
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;
    use std::net::Ipv4Addr;
    use uuid::Uuid;

    const HOST: &str = "8a9a5a3c-9a0e-4c0c-a9e5-1c2b3d4e5f60";

    fn config() -> ConverterConfig {
        ConverterConfig {
            tenant: "midonet-kube".to_string(),
            cluster_router: Uuid::from_u128(0xabc),
        }
    }

    fn node(cidr: Option<&str>, host: Option<&str>, addresses: &[(&str, &str)]) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some("worker-1".to_string()),
                annotations: host.map(|h| BTreeMap::from([(HOST_ID_ANNOTATION.to_string(), h.to_string())])),
                ..Default::default()
            },
            spec: Some(NodeSpec {
                pod_cidr: cidr.map(str::to_string),
                ..Default::default()
            }),
            status: Some(NodeStatus {
                addresses: Some(
                    addresses
                        .iter()
                        .map(|(t, a)| NodeAddress {
                            type_: (*t).to_string(),
                            address: (*a).to_string(),
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
        }
    }

    fn key() -> Key {
        Key::from_client_key("Node", "worker-1").unwrap()
    }

    fn convert(node: &Node) -> Result<(Vec<BackendResource>, usize), ConvertError> {
        let (resources, subs) = NodeConverter::new().convert(&key(), Some(node), &config())?;
        Ok((resources, subs.len()))
    }

    #[test]
    fn test_nil_object_is_empty() {
        let (resources, subs) = NodeConverter::new().convert(&key(), None, &config()).unwrap();
        assert!(resources.is_empty());
        assert!(subs.is_empty());
    }

    #[test]
    fn test_no_pod_cidr_is_empty() {
        let (resources, subs) = convert(&node(None, Some(HOST), &[("InternalIP", "192.168.1.10")])).unwrap();
        assert!(resources.is_empty());
        assert_eq!(subs, 0);
    }

    #[test]
    fn test_node_topology() {
        let (resources, _) = convert(&node(Some("10.1.2.0/24"), None, &[])).unwrap();
        let kinds: Vec<&str> = resources.iter().map(BackendResource::kind).collect();
        assert_eq!(kinds, vec!["Bridge", "Port", "Port", "PortLink", "Route"]);

        let bridge = bridge_id("worker-1");
        assert_eq!(bridge, key().id());

        let BackendResource::Bridge(b) = &resources[0] else {
            panic!("expected bridge")
        };
        assert_eq!(b.name, "node-worker-1");
        assert_eq!(b.tenant_id, "midonet-kube");
        assert_eq!(
            b.inbound_filter_id,
            Some(services_chain_id(config().cluster_router))
        );
        assert_eq!(b.outbound_filter_id, None);

        let BackendResource::Port(bridge_port) = &resources[1] else {
            panic!("expected port")
        };
        assert_eq!(bridge_port.parent, bridge);
        assert_eq!(bridge_port.id, bridge_port_id(bridge));

        let BackendResource::Port(router_port) = &resources[2] else {
            panic!("expected port")
        };
        assert_eq!(router_port.parent, config().cluster_router);
        assert_eq!(router_port.id, router_port_id(bridge));
        assert_eq!(router_port.port_subnet[0].to_string(), "10.1.2.1/24");
        assert_eq!(&router_port.port_mac.unwrap().0[..3], &[0xac, 0xca, 0xba]);

        let BackendResource::PortLink(link) = &resources[3] else {
            panic!("expected link")
        };
        assert_eq!(link.port_id, router_port.id);
        assert_eq!(link.peer_id, bridge_port.id);

        let BackendResource::Route(route) = &resources[4] else {
            panic!("expected route")
        };
        assert_eq!(route.parent, config().cluster_router);
        assert_eq!(route.dst_network_addr, Ipv4Addr::new(10, 1, 2, 0));
        assert_eq!(route.dst_network_length, 24);
        assert_eq!(route.next_hop_port, router_port.id);
        assert_eq!(route.id, sub_id(bridge, "Pod Subnet Route 10.1.2.0/24"));
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let n = node(Some("10.1.2.0/24"), Some(HOST), &[("InternalIP", "192.168.1.10")]);
        assert_eq!(convert(&n).unwrap().0, convert(&n).unwrap().0);
    }

    #[test]
    fn test_tunnel_zone_membership() {
        let (resources, subs) = convert(&node(
            Some("10.1.2.0/24"),
            Some(HOST),
            &[("Hostname", "worker-1"), ("InternalIP", "192.168.1.10")],
        ))
        .unwrap();

        let BackendResource::TunnelZoneHost(member) = resources.last().unwrap() else {
            panic!("expected tunnel zone host")
        };
        assert_eq!(member.parent, tunnel_zone_id("midonet-kube"));
        assert_eq!(member.host_id, Uuid::parse_str(HOST).unwrap());
        assert_eq!(member.ip_address, Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(
            resources.last().unwrap().path(Operation::Delete),
            Some(format!(
                "/tunnel_zones/{}/hosts/{HOST}",
                tunnel_zone_id("midonet-kube")
            ))
        );
        // Hostname addresses are not routed
        assert_eq!(subs, 1);
    }

    #[test]
    fn test_bad_host_id_skips_membership() {
        let (resources, _) = convert(&node(
            Some("10.1.2.0/24"),
            Some("not-a-uuid"),
            &[("InternalIP", "192.168.1.10")],
        ))
        .unwrap();
        assert!(resources.iter().all(|r| r.kind() != "TunnelZoneHost"));
    }

    #[test]
    fn test_node_address_routes() {
        let n = node(
            Some("10.1.2.0/24"),
            None,
            &[("InternalIP", "192.168.1.10"), ("ExternalIP", "203.0.113.7")],
        );
        let (_, subs) = NodeConverter::new().convert(&key(), Some(&n), &config()).unwrap();

        let keys: Vec<String> = subs.keys().map(|k| k.name.clone()).collect();
        assert_eq!(
            keys,
            vec!["worker-1/ExternalIP/203.0.113.7", "worker-1/InternalIP/192.168.1.10"]
        );

        let (sub_key, sub) = subs.iter().next().unwrap();
        assert_eq!(sub_key.kind, "NodeAddress");
        let routes = sub.convert(sub_key, &config()).unwrap();
        assert_eq!(routes.len(), 1);
        let BackendResource::Route(route) = &routes[0] else {
            panic!("expected route")
        };
        assert_eq!(route.dst_network_addr, Ipv4Addr::new(203, 0, 113, 7));
        assert_eq!(route.dst_network_length, 32);
        assert_eq!(route.next_hop_gateway, Some(Ipv4Addr::new(10, 1, 2, 2)));
        assert_eq!(route.next_hop_port, router_port_id(key().id()));
        assert_eq!(route.id, sub_id(sub_key.id(), "Route via 10.1.2.2"));
    }

    #[test]
    fn test_unparsable_address_is_malformed() {
        let err = convert(&node(Some("10.1.2.0/24"), None, &[("InternalIP", "10.0.0.300")])).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
    }

    #[test]
    fn test_unparsable_pod_cidr_is_malformed() {
        let err = convert(&node(Some("10.1.2.0/40"), None, &[])).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
    }

    #[test]
    fn test_ipv6_only_is_ignored() {
        let (resources, subs) = convert(&node(Some("fd00:10::/64"), None, &[("InternalIP", "fd00::1")])).unwrap();
        assert!(resources.is_empty());
        assert_eq!(subs, 0);
    }
}
