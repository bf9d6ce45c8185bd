// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Deterministic identifiers for backend objects.
//!
//! Backend ids are never assigned by the server or stored anywhere. Every id is a
//! UUIDv5 of a human-meaningful key, so any controller instance recomputes the same
//! id from the same cluster state:
//!
//! - [`id_for_key`] hashes translated cluster-object keys under [`KUBERNETES_SPACE`]
//! - [`id_for_tenant`] hashes tenant names under [`TENANT_SPACE`]
//! - [`sub_id`] hashes a discriminator under an existing id, for objects that only
//!   exist as part of another (a node's router port, a service's jump rule)
//!
//! MAC addresses and interface names are derived the same way.

use crate::constants::{
    IF_NAME_MAX_LEN, IF_NAME_PREFIX, KUBERNETES_SPACE, MAC_OUI, TENANT_SPACE,
};
use crate::midonet::types::MacAddr;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Id of a translated cluster-object key.
#[must_use]
pub fn id_for_key(key: &str) -> Uuid {
    Uuid::new_v5(&KUBERNETES_SPACE, key.as_bytes())
}

/// Id of a MidoNet tenant.
#[must_use]
pub fn id_for_tenant(tenant: &str) -> Uuid {
    Uuid::new_v5(&TENANT_SPACE, tenant.as_bytes())
}

/// Id of an object derived from `parent`, distinguished by `discriminator`.
#[must_use]
pub fn sub_id(parent: Uuid, discriminator: &str) -> Uuid {
    Uuid::new_v5(&parent, discriminator.as_bytes())
}

/// Locally administered MAC for `key`: the MidoNet OUI followed by the first
/// three bytes of SHA-256(`key`).
#[must_use]
pub fn mac_for_key(key: &str) -> MacAddr {
    let digest = Sha256::digest(key.as_bytes());
    let [a, b, c] = MAC_OUI;
    MacAddr([a, b, c, digest[0], digest[1], digest[2]])
}

/// Host-side interface name for `key`, at most 15 characters.
#[must_use]
pub fn if_name_for_key(key: &str) -> String {
    let hex = id_for_key(key).simple().to_string();
    let take = IF_NAME_MAX_LEN - IF_NAME_PREFIX.len();
    format!("{IF_NAME_PREFIX}{}", &hex[..take])
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod identity_tests;
