// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Unit tests for the diff-and-push engine.

#[cfg(test)]
mod tests {
    use crate::converter::updater::*;
    use crate::converter::{DesiredResources, Key};
    use crate::errors::{ClientError, Error};
    use crate::midonet::resources::{Bridge, Chain, Rule, TunnelZoneHost};
    use crate::midonet::testing::FakeBackend;
    use crate::midonet::{BackendResource, MidonetClient, Operation};
    use kube::core::GroupVersionKind;
    use reqwest::{Method, StatusCode};
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use uuid::Uuid;

    fn gvk() -> GroupVersionKind {
        GroupVersionKind::gvk("", "v1", "Service")
    }

    fn parent() -> Key {
        Key::new("Service", "default", "web")
    }

    fn chain(n: u128) -> BackendResource {
        Chain {
            id: Uuid::from_u128(n),
            tenant_id: "midonet-kube".to_string(),
            name: format!("chain-{n}"),
        }
        .into()
    }

    fn rule(n: u128, chain: u128) -> BackendResource {
        Rule::jump(Uuid::from_u128(n), Uuid::from_u128(chain), Uuid::from_u128(1)).into()
    }

    fn member(tunnel_zone: Uuid, ip_address: Ipv4Addr) -> BackendResource {
        TunnelZoneHost {
            parent: tunnel_zone,
            host_id: Uuid::from_u128(0x40),
            ip_address,
        }
        .into()
    }

    fn post(resource: &BackendResource) -> String {
        format!("POST {}", resource.path(Operation::Create).unwrap())
    }

    fn delete(resource: &BackendResource) -> String {
        format!("DELETE {}", resource.path(Operation::Delete).unwrap())
    }

    fn map(entries: Vec<(Key, Vec<BackendResource>)>) -> DesiredResources {
        entries.into_iter().collect()
    }

    fn updater() -> (Arc<FakeBackend>, DiffUpdater<Arc<FakeBackend>>) {
        let backend = Arc::new(FakeBackend::new());
        let updater = DiffUpdater::new(MidonetClient::new(backend.clone()));
        (backend, updater)
    }

    // ===== plan =====

    #[test]
    fn test_plan_pushes_parent_key_first() {
        let sub_a = Key::new("Endpoint", "default", "web/a");
        let next = map(vec![
            (sub_a.clone(), vec![chain(2)]),
            (parent(), vec![chain(1)]),
        ]);
        // "Endpoint" sorts before "Service", but the parent still goes first
        let plan = plan(&parent(), &DesiredResources::new(), &next);
        assert_eq!(plan.push, vec![chain(1), chain(2)]);
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_plan_deletes_vanished_keys_children_first_in_reverse() {
        let sub = Key::new("ServicePort", "default", "web/http");
        let prev = map(vec![
            (parent(), vec![chain(1), rule(10, 1)]),
            (sub, vec![chain(2), rule(20, 2)]),
        ]);
        let plan = plan(&parent(), &prev, &DesiredResources::new());
        assert!(plan.push.is_empty());
        assert_eq!(
            plan.delete,
            vec![rule(20, 2), chain(2), rule(10, 1), chain(1)]
        );
    }

    #[test]
    fn test_plan_deletes_resources_vanished_within_a_key() {
        let prev = map(vec![(parent(), vec![chain(1), rule(10, 1), rule(11, 1)])]);
        let next = map(vec![(parent(), vec![chain(1), rule(12, 1)])]);
        let plan = plan(&parent(), &prev, &next);
        assert_eq!(plan.push, vec![chain(1), rule(12, 1)]);
        assert_eq!(plan.delete, vec![rule(11, 1), rule(10, 1)]);
    }

    #[test]
    fn test_plan_replaces_changed_resource_without_update_path() {
        let renamed = BackendResource::from(Chain {
            id: Uuid::from_u128(1),
            tenant_id: "midonet-kube".to_string(),
            name: "renamed".to_string(),
        });
        let prev = map(vec![(parent(), vec![chain(1), rule(10, 1)])]);
        let next = map(vec![(parent(), vec![renamed.clone(), rule(10, 1)])]);
        let plan = plan(&parent(), &prev, &next);
        assert_eq!(plan.replace, vec![chain(1)]);
        assert_eq!(plan.push, vec![renamed, rule(10, 1)]);
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_plan_changed_tunnel_zone_host_is_replaced() {
        let tz = Uuid::from_u128(0x72);
        let old = member(tz, Ipv4Addr::new(192, 168, 0, 1));
        let new = member(tz, Ipv4Addr::new(192, 168, 0, 2));
        assert_eq!(old.identity(), new.identity());

        let prev = map(vec![(parent(), vec![old.clone()])]);
        let next = map(vec![(parent(), vec![new.clone()])]);
        let plan = plan(&parent(), &prev, &next);
        assert_eq!(plan.replace, vec![old]);
        assert_eq!(plan.push, vec![new]);
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_plan_changed_updatable_resource_is_pushed_only() {
        let bridge = |name: &str| {
            BackendResource::from(Bridge {
                id: Uuid::from_u128(3),
                tenant_id: "midonet-kube".to_string(),
                name: name.to_string(),
                inbound_filter_id: None,
                outbound_filter_id: None,
            })
        };
        let prev = map(vec![(parent(), vec![bridge("old")])]);
        let next = map(vec![(parent(), vec![bridge("new")])]);
        let plan = plan(&parent(), &prev, &next);
        assert!(plan.replace.is_empty());
        assert_eq!(plan.push, vec![bridge("new")]);
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_plan_same_map_deletes_nothing() {
        let both = map(vec![(parent(), vec![chain(1), rule(10, 1)])]);
        let plan = plan(&parent(), &both, &both);
        assert!(plan.replace.is_empty());
        assert_eq!(plan.push.len(), 2);
        assert!(plan.delete.is_empty());
    }

    // ===== DiffUpdater =====

    #[tokio::test]
    async fn test_update_pushes_and_retains() {
        let (backend, updater) = updater();
        let resources = map(vec![(parent(), vec![chain(1)])]);

        updater
            .update(&gvk(), &parent(), None, resources.clone())
            .await
            .unwrap();

        assert_eq!(backend.calls(), vec![post(&chain(1))]);
        assert_eq!(updater.applied(&gvk(), &parent()), Some(resources));
    }

    #[tokio::test]
    async fn test_second_update_deletes_only_the_difference() {
        let (backend, updater) = updater();
        updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![chain(1), chain(2)])]))
            .await
            .unwrap();
        backend.clear();

        updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![chain(1)])]))
            .await
            .unwrap();

        assert_eq!(backend.calls(), vec![post(&chain(1)), delete(&chain(2))]);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_state() {
        let (backend, updater) = updater();
        let first = map(vec![(parent(), vec![chain(1)])]);
        updater
            .update(&gvk(), &parent(), None, first.clone())
            .await
            .unwrap();

        backend.fail(Method::POST, "/chains");
        let err = updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![chain(2)])]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Client(ClientError::Transport { .. })));
        assert!(err.is_retryable());
        assert_eq!(updater.applied(&gvk(), &parent()), Some(first));

        // Re-delivery diffs against the same previous state
        backend.clear();
        updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![chain(2)])]))
            .await
            .unwrap();
        assert_eq!(backend.calls(), vec![post(&chain(2)), delete(&chain(1))]);
    }

    #[tokio::test]
    async fn test_delete_removes_everything_and_forgets() {
        let (backend, updater) = updater();
        updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![chain(1), rule(10, 1)])]))
            .await
            .unwrap();
        backend.clear();

        updater.delete(&gvk(), &parent()).await.unwrap();

        assert_eq!(
            backend.calls(),
            vec![delete(&rule(10, 1)), delete(&chain(1))]
        );
        assert!(!updater.is_tracked(&gvk(), &parent()));
    }

    #[tokio::test]
    async fn test_delete_of_unknown_object_is_a_no_op() {
        let (backend, updater) = updater();
        updater.delete(&gvk(), &parent()).await.unwrap();
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_update_is_not_tracked() {
        let (_, updater) = updater();
        updater
            .update(&gvk(), &parent(), None, DesiredResources::new())
            .await
            .unwrap();
        assert!(!updater.is_tracked(&gvk(), &parent()));
    }

    #[tokio::test]
    async fn test_kinds_are_tracked_separately() {
        let (backend, updater) = updater();
        let endpoints = GroupVersionKind::gvk("", "v1", "Endpoints");
        updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![chain(1)])]))
            .await
            .unwrap();
        updater
            .update(&endpoints, &parent(), None, map(vec![(parent(), vec![chain(2)])]))
            .await
            .unwrap();
        backend.clear();

        updater.delete(&endpoints, &parent()).await.unwrap();

        assert_eq!(backend.calls(), vec![delete(&chain(2))]);
        assert!(updater.is_tracked(&gvk(), &parent()));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_state() {
        let (backend, updater) = updater();
        updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![chain(1)])]))
            .await
            .unwrap();
        backend.respond(
            Method::DELETE,
            format!("/chains/{}", Uuid::from_u128(1)),
            StatusCode::INTERNAL_SERVER_ERROR,
        );

        let err = updater.delete(&gvk(), &parent()).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(updater.is_tracked(&gvk(), &parent()));
    }

    #[tokio::test]
    async fn test_changed_tunnel_zone_host_is_deleted_then_recreated() {
        let (backend, updater) = updater();
        let tz = Uuid::from_u128(0x72);
        let old = member(tz, Ipv4Addr::new(192, 168, 0, 1));
        let new = member(tz, Ipv4Addr::new(192, 168, 0, 2));
        updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![old.clone()])]))
            .await
            .unwrap();
        backend.clear();

        updater
            .update(&gvk(), &parent(), None, map(vec![(parent(), vec![new.clone()])]))
            .await
            .unwrap();

        assert_eq!(backend.calls(), vec![delete(&old), post(&new)]);
        let body: serde_json::Value =
            serde_json::from_str(backend.requests()[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["ipAddress"], "192.168.0.2");
    }

    #[tokio::test]
    async fn test_tracked_lists_keys_of_one_kind() {
        let (_, updater) = updater();
        let other = Key::new("Service", "default", "api");
        let endpoints = GroupVersionKind::gvk("", "v1", "Endpoints");
        for (gvk, key) in [(gvk(), parent()), (gvk(), other.clone()), (endpoints.clone(), parent())] {
            updater
                .update(&gvk, &key, None, map(vec![(key.clone(), vec![chain(1)])]))
                .await
                .unwrap();
        }

        assert_eq!(updater.tracked(&gvk()), vec![other, parent()]);
        assert_eq!(updater.tracked(&endpoints), vec![parent()]);

        updater.delete(&endpoints, &parent()).await.unwrap();
        assert!(updater.tracked(&endpoints).is_empty());
    }
}
