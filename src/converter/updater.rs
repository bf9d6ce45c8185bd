// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Diff-and-push engine.
//!
//! The updater remembers, per `(GroupVersionKind, top-level key)`, the resource map
//! it last applied successfully. Every update pushes the whole new map (creates are
//! idempotent) and deletes what disappeared since the last successful update.
//!
//! # Ordering
//!
//! - Pushes go parent key first, then sub-keys in key order, each list in order,
//!   so containers exist before what they contain.
//! - Deletes go sub-keys before the parent key, each list in reverse order.
//! - A kept resource whose content changed and whose kind has no update path is
//!   deleted before the push recreates it, in delete order.
//!
//! The retained map only changes after every call succeeded, so a failed update is
//! re-diffed against the same previous state when the event is re-delivered.
//! Nothing is persisted: after a restart the previous state is empty and the first
//! update of every object only pushes.

use super::{DesiredResources, Key};
use crate::errors::Error;
use crate::midonet::{BackendResource, HttpTransport, MidonetClient, Operation, Transport};
use async_trait::async_trait;
use dashmap::DashMap;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::GroupVersionKind;
use std::collections::HashMap;
use tracing::{debug, info};

/// Applies desired resource maps for top-level objects.
#[async_trait]
pub trait Updater: Send + Sync {
    /// Make the backend match `resources` for the object `parent` of kind `gvk`.
    ///
    /// `object` identifies the cluster object the map was computed from, for logging.
    ///
    /// # Errors
    ///
    /// Returns the first client error. Nothing is retained on error.
    async fn update(
        &self,
        gvk: &GroupVersionKind,
        parent: &Key,
        object: Option<ObjectReference>,
        resources: DesiredResources,
    ) -> Result<(), Error>;

    /// Delete everything applied for the object `parent` of kind `gvk`.
    ///
    /// # Errors
    ///
    /// Returns the first client error. The retained map is kept on error.
    async fn delete(&self, gvk: &GroupVersionKind, parent: &Key) -> Result<(), Error>;

    /// Top-level keys of kind `gvk` with retained resources, in key order.
    fn tracked(&self, gvk: &GroupVersionKind) -> Vec<Key>;
}

/// Calls needed to go from one resource map to the next.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Plan {
    /// Previous versions of changed resources that cannot be updated in place,
    /// deleted before the push
    pub replace: Vec<BackendResource>,
    /// Resources to create (or update), in order
    pub push: Vec<BackendResource>,
    /// Resources to delete, in order
    pub delete: Vec<BackendResource>,
}

/// Compute the calls turning `prev` into `next` for the object `parent`.
#[must_use]
pub fn plan(parent: &Key, prev: &DesiredResources, next: &DesiredResources) -> Plan {
    let mut push: Vec<BackendResource> = next.get(parent).cloned().unwrap_or_default();
    push.extend(
        next.iter()
            .filter(|(key, _)| *key != parent)
            .flat_map(|(_, resources)| resources.iter().cloned()),
    );

    let mut replace = Vec::new();
    let mut delete = Vec::new();
    let prev_keys = prev
        .keys()
        .filter(|key| *key != parent)
        .rev()
        .chain(prev.get_key_value(parent).map(|(key, _)| key));
    for key in prev_keys {
        let kept: HashMap<String, &BackendResource> = next
            .get(key)
            .into_iter()
            .flatten()
            .map(|resource| (resource.identity(), resource))
            .collect();
        for resource in prev[key].iter().rev() {
            match kept.get(&resource.identity()) {
                None => delete.push(resource.clone()),
                Some(current)
                    if *current != resource && !resource.supports(Operation::Update) =>
                {
                    replace.push(resource.clone());
                }
                Some(_) => {}
            }
        }
    }

    Plan {
        replace,
        push,
        delete,
    }
}

/// [`Updater`] diffing against an in-memory record of what was applied.
#[derive(Debug)]
pub struct DiffUpdater<T = HttpTransport> {
    client: MidonetClient<T>,
    applied: DashMap<(GroupVersionKind, Key), DesiredResources>,
}

impl<T: Transport> DiffUpdater<T> {
    #[must_use]
    pub fn new(client: MidonetClient<T>) -> Self {
        Self {
            client,
            applied: DashMap::new(),
        }
    }

    /// The MidoNet client resources are applied with.
    #[must_use]
    pub fn client(&self) -> &MidonetClient<T> {
        &self.client
    }

    /// The map last applied for `parent`, if any.
    #[must_use]
    pub fn applied(&self, gvk: &GroupVersionKind, parent: &Key) -> Option<DesiredResources> {
        self.applied
            .get(&(gvk.clone(), parent.clone()))
            .map(|entry| entry.value().clone())
    }

    /// Whether anything is retained for `parent`.
    #[must_use]
    pub fn is_tracked(&self, gvk: &GroupVersionKind, parent: &Key) -> bool {
        self.applied.contains_key(&(gvk.clone(), parent.clone()))
    }

    async fn apply(
        &self,
        gvk: &GroupVersionKind,
        parent: &Key,
        next: DesiredResources,
    ) -> Result<(), Error> {
        let store_key = (gvk.clone(), parent.clone());
        // Clone out so no map guard is held across the API calls
        let prev = self
            .applied
            .get(&store_key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let Plan {
            replace,
            push,
            delete,
        } = plan(parent, &prev, &next);
        debug!(
            kind = %gvk.kind,
            key = %parent,
            replace = replace.len(),
            push = push.len(),
            delete = delete.len(),
            "Applying MidoNet resources"
        );

        self.client.delete(&replace).await?;
        self.client.push(&push).await?;
        self.client.delete(&delete).await?;

        if next.is_empty() {
            self.applied.remove(&store_key);
        } else {
            self.applied.insert(store_key, next);
        }

        info!(
            kind = %gvk.kind,
            key = %parent,
            replaced = replace.len(),
            pushed = push.len(),
            deleted = delete.len(),
            "MidoNet resources in sync"
        );
        Ok(())
    }
}

#[async_trait]
impl<T: Transport> Updater for DiffUpdater<T> {
    async fn update(
        &self,
        gvk: &GroupVersionKind,
        parent: &Key,
        object: Option<ObjectReference>,
        resources: DesiredResources,
    ) -> Result<(), Error> {
        if let Some(object) = &object {
            debug!(
                key = %parent,
                uid = object.uid.as_deref().unwrap_or_default(),
                resource_version = object.resource_version.as_deref().unwrap_or_default(),
                "Updating from object"
            );
        }
        self.apply(gvk, parent, resources).await
    }

    async fn delete(&self, gvk: &GroupVersionKind, parent: &Key) -> Result<(), Error> {
        self.apply(gvk, parent, DesiredResources::new()).await
    }

    fn tracked(&self, gvk: &GroupVersionKind) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .applied
            .iter()
            .filter(|entry| entry.key().0 == *gvk)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod updater_tests;
