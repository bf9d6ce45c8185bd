// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use k8s_openapi::api::core::v1::{Node, NodeAddress, NodeSpec, NodeStatus, Pod, PodSpec, PodStatus};
use kube::api::ObjectMeta;
use midonet_kube::annotations::{HOST_ID_ANNOTATION, MAC_ANNOTATION};
use midonet_kube::converter::ConverterConfig;
use midonet_kube::midonet::{ClientConfig, MidonetClient};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const HOST_ID: &str = "8a9a5a3c-9a0e-4c0c-a9e5-1c2b3d4e5f60";
pub const POD_MAC: &str = "ac:ca:ba:11:22:33";
pub const API_PREFIX: &str = "/midonet-api";

/// Start a MidoNet API double accepting every create and delete.
pub async fn midonet_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    server
}

/// HTTP client pointed at `server`.
pub fn midonet_client(server: &MockServer) -> MidonetClient {
    MidonetClient::from_config(&ClientConfig {
        api: format!("{}{API_PREFIX}", server.uri()).parse().unwrap(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

pub fn converter_config() -> Arc<ConverterConfig> {
    Arc::new(ConverterConfig {
        tenant: "midonet-kube".to_string(),
        cluster_router: Uuid::from_u128(0x7),
    })
}

/// `"METHOD path"` of every request the server received, API prefix stripped.
pub async fn requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let path = r.url.path();
            format!("{} {}", r.method, path.strip_prefix(API_PREFIX).unwrap_or(path))
        })
        .collect()
}

pub fn node(name: &str) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            annotations: Some(BTreeMap::from([(
                HOST_ID_ANNOTATION.to_string(),
                HOST_ID.to_string(),
            )])),
            ..Default::default()
        },
        spec: Some(NodeSpec {
            pod_cidr: Some("10.1.2.0/24".to_string()),
            ..Default::default()
        }),
        status: Some(NodeStatus {
            addresses: Some(vec![NodeAddress {
                type_: "InternalIP".to_string(),
                address: "192.168.1.10".to_string(),
            }]),
            ..Default::default()
        }),
    }
}

pub fn pod(namespace: &str, name: &str, node: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: Some(BTreeMap::from([(
                MAC_ANNOTATION.to_string(),
                POD_MAC.to_string(),
            )])),
            ..Default::default()
        },
        spec: Some(PodSpec {
            node_name: Some(node.to_string()),
            ..Default::default()
        }),
        status: Some(PodStatus {
            pod_ip: Some("10.1.2.5".to_string()),
            ..Default::default()
        }),
    }
}
