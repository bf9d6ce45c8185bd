// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Global constants for the midonet-kube controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

use uuid::{uuid, Uuid};

// ============================================================================
// Identity Constants
// ============================================================================

/// Namespace anchor for identifiers derived from Kubernetes object keys
pub const KUBERNETES_SPACE: Uuid = uuid!("CAC60164-F74C-404A-AB39-3C1320124A17");

/// Namespace anchor for identifiers derived from MidoNet tenant names
pub const TENANT_SPACE: Uuid = uuid!("3978567E-91C4-465C-A0D1-67575F6B4C7F");

/// Version folded into every translated key.
///
/// Changing it changes every backend identifier, which re-creates every backend
/// object (and interrupts traffic) on the next reconciliation.
pub const TRANSLATION_VERSION: &str = "1";

/// OUI prefix of generated MAC addresses (AC-CA-BA, Midokura Co., Ltd.)
pub const MAC_OUI: [u8; 3] = [0xac, 0xca, 0xba];

/// Prefix of host-side interface names bound to pod ports
pub const IF_NAME_PREFIX: &str = "mido";

/// Linux interface name length limit (IFNAMSIZ minus the trailing NUL)
pub const IF_NAME_MAX_LEN: usize = 15;

// ============================================================================
// Kubernetes Kind Constants
// ============================================================================

/// Kind name for `Node`
pub const KIND_NODE: &str = "Node";

/// Kind name for `Pod`
pub const KIND_POD: &str = "Pod";

/// Kind name for `Service`
pub const KIND_SERVICE: &str = "Service";

/// Kind name for `Endpoints`
pub const KIND_ENDPOINTS: &str = "Endpoints";

/// Sub-resource kind for a routed node status address
pub const KIND_NODE_ADDRESS: &str = "NodeAddress";

/// Sub-resource kind for a pod's ARP and MAC table entries
pub const KIND_POD_ARP: &str = "PodArp";

/// Sub-resource kind for one port of a service
pub const KIND_SERVICE_PORT: &str = "ServicePort";

/// Sub-resource kind for one address/port pair behind a service
pub const KIND_ENDPOINT: &str = "Endpoint";

// ============================================================================
// MidoNet API Constants
// ============================================================================

/// Vendor prefix of every MidoNet media type
pub const MEDIA_TYPE_VENDOR: &str = "application/vnd.org.midonet";

/// Tunnel zone type used for the cluster tunnel zone
pub const TUNNEL_ZONE_TYPE: &str = "vxlan";

/// Discriminator of the cluster tunnel zone under the tenant id
pub const TUNNEL_ZONE_DISCRIMINATOR: &str = "Default Tunnel Zone";

/// Discriminator of the services chain under the cluster router id
pub const SERVICES_CHAIN_DISCRIMINATOR: &str = "Services";

/// Name of the cluster-wide services chain
pub const SERVICES_CHAIN_NAME: &str = "KUBE-SERVICES";

/// Name prefix of per-service-port chains
pub const SERVICE_CHAIN_PREFIX: &str = "KUBE-SVC-";

/// Name prefix of per-endpoint chains
pub const ENDPOINT_CHAIN_PREFIX: &str = "KUBE-SEP-";

/// Ethertype for IPv4, used as rule `dlType`
pub const ETHERTYPE_IPV4: u16 = 0x0800;

/// IP protocol number for TCP
pub const IP_PROTO_TCP: u8 = 6;

/// IP protocol number for UDP
pub const IP_PROTO_UDP: u8 = 17;

/// IP protocol number for SCTP
pub const IP_PROTO_SCTP: u8 = 132;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors once backoff is exhausted (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Default MidoNet API request timeout (30 seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Default tenant owning every translated object
pub const DEFAULT_TENANT: &str = "midonet-kube";

/// Controllers enabled when none are configured
pub const DEFAULT_ENABLED_CONTROLLERS: &str = "node,pod,service,endpoints";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness endpoint served next to metrics
pub const HEALTH_SERVER_PATH: &str = "/healthz";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0:8080";
