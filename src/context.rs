// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Shared context for all controllers.
//!
//! Every controller gets the same [`Context`]:
//! - Kubernetes client
//! - reflector stores other converters look objects up in
//! - converter configuration
//! - the updater, which owns the record of applied resources

use crate::converter::{Converter, ConverterConfig, DiffUpdater, Handler};
use k8s_openapi::api::core::v1::Node;
use kube::runtime::reflector::{self, Store};
use kube::{Client, Resource};
use std::sync::Arc;

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for watches
    pub client: Client,

    /// Reflector stores for cross-controller lookups
    pub stores: Stores,

    /// Settings every converter reads
    pub config: Arc<ConverterConfig>,

    /// Updater shared by all handlers
    pub updater: Arc<DiffUpdater>,
}

/// Reflector stores read by converters.
#[derive(Clone)]
pub struct Stores {
    /// Nodes, read by the pod converter for host ids
    pub nodes: Store<Node>,
}

impl Context {
    /// Build the context and the writer feeding [`Stores::nodes`].
    ///
    /// The writer goes to the node controller, or to a bare reflector when that
    /// controller is disabled.
    #[must_use]
    pub fn new(
        client: Client,
        config: ConverterConfig,
        updater: DiffUpdater,
    ) -> (Self, reflector::store::Writer<Node>) {
        let (nodes, node_writer) = reflector::store::<Node>();
        let context = Self {
            client,
            stores: Stores { nodes },
            config: Arc::new(config),
            updater: Arc::new(updater),
        };
        (context, node_writer)
    }

    /// Handler running `converter` against the shared updater.
    #[must_use]
    pub fn handler<C>(&self, converter: C) -> Handler<C, DiffUpdater>
    where
        C: Converter,
        C::Object: Resource<DynamicType = ()> + Send + Sync,
    {
        Handler::new(converter, self.updater.clone(), self.config.clone())
    }
}
