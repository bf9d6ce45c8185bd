// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Value types shared by the MidoNet resource model.

use reqwest::Method;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// REST operation on a backend resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// POST to the collection path
    Create,
    /// PUT to the item path
    Update,
    /// DELETE on the item path
    Delete,
    /// GET on the item path
    Read,
}

impl Operation {
    /// HTTP method used for this operation.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::Create => Method::POST,
            Self::Update => Method::PUT,
            Self::Delete => Method::DELETE,
            Self::Read => Method::GET,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method())
    }
}

/// Error returned when parsing a [`MacAddr`] or [`Ipv4Subnet`] fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {what} '{input}'")]
pub struct ParseError {
    /// What was being parsed ("MAC address", "IPv4 subnet")
    pub what: &'static str,
    /// The rejected input
    pub input: String,
}

/// 48-bit Ethernet address.
///
/// Displays in lowercase colon form (`ac:ca:ba:01:02:03`). Parsing accepts
/// both `:` and `-` separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Form used inside MidoNet URLs (`ac-ca-ba-01-02-03`).
    #[must_use]
    pub fn url_form(&self) -> String {
        self.to_string().replace(':', "-")
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError {
            what: "MAC address",
            input: s.to_string(),
        };
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(err());
        }
        let mut bytes = [0u8; 6];
        for (byte, part) in bytes.iter_mut().zip(parts) {
            if part.len() != 2 {
                return Err(err());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| err())?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// IPv4 address with a prefix length, e.g. a pod CIDR or a port subnet.
///
/// The address is kept as given, so `10.1.2.1/24` (a port address in its subnet)
/// and `10.1.2.0/24` (the network) are both representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Subnet {
    /// Address part
    pub addr: Ipv4Addr,
    /// Prefix length (0..=32)
    pub prefix_len: u8,
}

impl Ipv4Subnet {
    /// Network address (host bits cleared).
    #[must_use]
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask())
    }

    /// The `n`th address of the network, e.g. `host(1)` is the usual gateway.
    #[must_use]
    pub fn host(&self, n: u32) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network()).wrapping_add(n))
    }

    /// Same prefix length, different address.
    #[must_use]
    pub fn with_addr(&self, addr: Ipv4Addr) -> Self {
        Self {
            addr,
            prefix_len: self.prefix_len,
        }
    }

    fn mask(&self) -> u32 {
        if self.prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix_len))
        }
    }
}

impl fmt::Display for Ipv4Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl FromStr for Ipv4Subnet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError {
            what: "IPv4 subnet",
            input: s.to_string(),
        };
        let (addr, len) = s.split_once('/').ok_or_else(err)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| err())?;
        let prefix_len: u8 = len.parse().map_err(|_| err())?;
        if prefix_len > 32 {
            return Err(err());
        }
        Ok(Self { addr, prefix_len })
    }
}

impl Serialize for Ipv4Subnet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Device a port belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortType {
    /// Port on a bridge (L2)
    Bridge,
    /// Port on a router (L3)
    Router,
}

/// Route type. Only normal forwarding routes are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteType {
    Normal,
}

/// Rule type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Jump to another chain
    Jump,
    /// Destination NAT
    Dnat,
}

/// What happens to a packet after a NAT rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    Accept,
}

/// Transport port range matched by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    /// Range matching exactly one port.
    #[must_use]
    pub fn single(port: u16) -> Self {
        Self {
            start: port,
            end: port,
        }
    }
}

/// Translation target of a NAT rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NatTarget {
    pub address_from: Ipv4Addr,
    pub address_to: Ipv4Addr,
    pub port_from: u16,
    pub port_to: u16,
}

impl NatTarget {
    /// Target translating to exactly one address and port.
    #[must_use]
    pub fn single(addr: Ipv4Addr, port: u16) -> Self {
        Self {
            address_from: addr,
            address_to: addr,
            port_from: port,
            port_to: port,
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
