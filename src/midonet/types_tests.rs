// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Unit tests for MidoNet value types.

#[cfg(test)]
mod tests {
    use crate::midonet::types::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_mac_display_lowercase_colons() {
        let mac = MacAddr([0xac, 0xca, 0xba, 0x0a, 0xff, 0x01]);
        assert_eq!(mac.to_string(), "ac:ca:ba:0a:ff:01");
        assert_eq!(mac.url_form(), "ac-ca-ba-0a-ff-01");
    }

    #[test]
    fn test_mac_parse_both_separators() {
        let colon: MacAddr = "AC:CA:BA:0A:FF:01".parse().unwrap();
        let dash: MacAddr = "ac-ca-ba-0a-ff-01".parse().unwrap();
        assert_eq!(colon, dash);
        assert_eq!(colon.0, [0xac, 0xca, 0xba, 0x0a, 0xff, 0x01]);
    }

    #[test]
    fn test_mac_parse_rejects_garbage() {
        assert!("ac:ca:ba:0a:ff".parse::<MacAddr>().is_err());
        assert!("ac:ca:ba:0a:ff:0g".parse::<MacAddr>().is_err());
        assert!("acc:ca:ba:0a:ff:01".parse::<MacAddr>().is_err());
        assert!("".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_mac_serializes_as_string() {
        let mac = MacAddr([0xac, 0xca, 0xba, 1, 2, 3]);
        assert_eq!(
            serde_json::to_string(&mac).unwrap(),
            "\"ac:ca:ba:01:02:03\""
        );
    }

    #[test]
    fn test_subnet_parse_and_hosts() {
        let subnet: Ipv4Subnet = "10.1.2.0/24".parse().unwrap();
        assert_eq!(subnet.prefix_len, 24);
        assert_eq!(subnet.network(), Ipv4Addr::new(10, 1, 2, 0));
        assert_eq!(subnet.host(1), Ipv4Addr::new(10, 1, 2, 1));
        assert_eq!(subnet.host(2), Ipv4Addr::new(10, 1, 2, 2));
    }

    #[test]
    fn test_subnet_network_clears_host_bits() {
        let subnet: Ipv4Subnet = "10.1.2.77/24".parse().unwrap();
        assert_eq!(subnet.network(), Ipv4Addr::new(10, 1, 2, 0));
        assert_eq!(subnet.to_string(), "10.1.2.77/24");
    }

    #[test]
    fn test_subnet_with_addr_keeps_prefix() {
        let subnet: Ipv4Subnet = "10.1.2.0/24".parse().unwrap();
        let port = subnet.with_addr(subnet.host(1));
        assert_eq!(port.to_string(), "10.1.2.1/24");
        assert_eq!(
            serde_json::to_string(&port).unwrap(),
            "\"10.1.2.1/24\""
        );
    }

    #[test]
    fn test_subnet_zero_prefix() {
        let subnet: Ipv4Subnet = "192.168.0.9/0".parse().unwrap();
        assert_eq!(subnet.network(), Ipv4Addr::UNSPECIFIED);
    }

    #[test]
    fn test_subnet_parse_rejects_garbage() {
        assert!("10.1.2.0".parse::<Ipv4Subnet>().is_err());
        assert!("10.1.2.0/33".parse::<Ipv4Subnet>().is_err());
        assert!("fd00::/64".parse::<Ipv4Subnet>().is_err());
        assert!("10.1.2/24".parse::<Ipv4Subnet>().is_err());
    }

    #[test]
    fn test_operation_methods() {
        assert_eq!(Operation::Create.method(), reqwest::Method::POST);
        assert_eq!(Operation::Update.method(), reqwest::Method::PUT);
        assert_eq!(Operation::Delete.method(), reqwest::Method::DELETE);
        assert_eq!(Operation::Read.method(), reqwest::Method::GET);
        assert_eq!(Operation::Create.to_string(), "POST");
    }

    #[test]
    fn test_rule_enums_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&RuleType::Jump).unwrap(), "\"jump\"");
        assert_eq!(
            serde_json::to_string(&RuleType::Dnat).unwrap(),
            "\"dnat\""
        );
        assert_eq!(
            serde_json::to_string(&FlowAction::Accept).unwrap(),
            "\"accept\""
        );
        assert_eq!(serde_json::to_string(&PortType::Bridge).unwrap(), "\"Bridge\"");
    }

    #[test]
    fn test_nat_target_camel_case() {
        let target = NatTarget::single(Ipv4Addr::new(10, 0, 0, 5), 8080);
        let json = serde_json::to_value(target).unwrap();
        assert_eq!(json["addressFrom"], "10.0.0.5");
        assert_eq!(json["addressTo"], "10.0.0.5");
        assert_eq!(json["portFrom"], 8080);
        assert_eq!(json["portTo"], 8080);
    }
}
