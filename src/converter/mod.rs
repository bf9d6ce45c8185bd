// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Translation of cluster objects into MidoNet resources.
//!
//! A [`Converter`] turns one cluster object into a primary resource list and a
//! [`SubResourceMap`] of independently keyed units, each of which converts to its
//! own resources. The [`handler::Handler`] expands both into one [`DesiredResources`]
//! map and hands it to an [`updater::Updater`], which diffs it against what was
//! applied last time.
//!
//! # Modules
//!
//! - [`key`] - object and sub-resource keys
//! - [`node`], [`pod`], [`service`], [`endpoints`] - per-kind converters
//! - [`handler`] - per-event orchestration
//! - [`updater`] - diff-and-push engine
//! - [`bootstrap`] - cluster-wide resources created at startup

pub mod bootstrap;
pub mod endpoints;
pub mod handler;
pub mod key;
pub mod node;
pub mod pod;
pub mod service;
pub mod updater;

pub use handler::Handler;
pub use key::Key;
pub use updater::{DiffUpdater, Updater};

use crate::errors::ConvertError;
use crate::midonet::BackendResource;
use std::collections::BTreeMap;
use std::fmt::Debug;
use uuid::Uuid;

/// Settings every converter reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// MidoNet tenant owning every created device and chain
    pub tenant: String,
    /// Pre-existing router connecting all node bridges
    pub cluster_router: Uuid,
}

/// Desired backend resources per key. Only non-empty lists are entered.
pub type DesiredResources = BTreeMap<Key, Vec<BackendResource>>;

/// Sub-resources of one object, keyed by sub-resource key.
pub type SubResourceMap = BTreeMap<Key, Box<dyn SubResource>>;

/// A unit of conversion produced by a [`Converter`].
pub trait SubResource: Send + Sync + Debug {
    /// Convert into backend resources.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if the sub-resource cannot be translated.
    fn convert(
        &self,
        key: &Key,
        config: &ConverterConfig,
    ) -> Result<Vec<BackendResource>, ConvertError>;
}

/// Translation of one cluster object kind.
pub trait Converter: Send + Sync {
    /// Cluster object type
    type Object;

    /// Convert `object`, or nothing when `None`.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::DependencyNotReady`] if another object is needed and not known yet
    /// - [`ConvertError::MalformedInput`] if the object cannot be translated
    fn convert(
        &self,
        key: &Key,
        object: Option<&Self::Object>,
        config: &ConverterConfig,
    ) -> Result<(Vec<BackendResource>, SubResourceMap), ConvertError>;
}
