// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Annotation keys read by the converters.
//!
//! Both annotations are written by node-local collaborators (the node annotator
//! and the CNI plugin). The controller only reads them.

/// Node annotation carrying the MidoNet host id of the node's agent
pub const HOST_ID_ANNOTATION: &str = "midonet.org/host-id";

/// Pod annotation carrying the MAC address the CNI plugin gave the pod interface
pub const MAC_ANNOTATION: &str = "midonet.org/mac-address";

/// Read an annotation from optional object metadata annotations.
#[must_use]
pub fn get<'a>(
    annotations: Option<&'a std::collections::BTreeMap<String, String>>,
    key: &str,
) -> Option<&'a str> {
    annotations
        .and_then(|a| a.get(key))
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}
