// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Per-event orchestration: key, convert, expand sub-resources, apply.

use super::{Converter, ConverterConfig, DesiredResources, Key, Updater};
use crate::errors::Error;
use crate::metrics;
use kube::core::GroupVersionKind;
use kube::Resource;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Handles update and delete events of one cluster object kind.
///
/// # Example
///
/// ```rust,no_run
/// use midonet_kube::converter::{ConverterConfig, DiffUpdater, Handler};
/// use midonet_kube::converter::service::ServiceConverter;
/// use midonet_kube::midonet::{ClientConfig, MidonetClient};
/// use std::sync::Arc;
///
/// # async fn example(client_config: ClientConfig, config: ConverterConfig) -> anyhow::Result<()> {
/// let updater = Arc::new(DiffUpdater::new(MidonetClient::from_config(&client_config)?));
/// let handler = Handler::new(ServiceConverter::new(), updater, Arc::new(config));
/// handler.delete("default/web").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Handler<C, U> {
    converter: C,
    updater: Arc<U>,
    config: Arc<ConverterConfig>,
    gvk: GroupVersionKind,
}

impl<C, U> Handler<C, U>
where
    C: Converter,
    C::Object: Resource<DynamicType = ()> + Send + Sync,
    U: Updater,
{
    #[must_use]
    pub fn new(converter: C, updater: Arc<U>, config: Arc<ConverterConfig>) -> Self {
        let gvk = GroupVersionKind::gvk(
            &<C::Object as Resource>::group(&()),
            &<C::Object as Resource>::version(&()),
            &<C::Object as Resource>::kind(&()),
        );
        Self {
            converter,
            updater,
            config,
            gvk,
        }
    }

    /// Kind of the handled objects.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.gvk.kind
    }

    /// Client keys of the objects with resources currently applied.
    #[must_use]
    pub fn tracked(&self) -> Vec<String> {
        self.updater
            .tracked(&self.gvk)
            .iter()
            .map(Key::client_key)
            .collect()
    }

    /// Handle an add or modify of the object at `client_key`.
    ///
    /// `object` is `None` when the object was not found, which converts to nothing
    /// and so deletes whatever was applied for it.
    ///
    /// # Errors
    ///
    /// - [`Error::Key`] if `client_key` is malformed
    /// - [`Error::Convert`] if the object or one of its sub-resources cannot be converted
    /// - [`Error::Client`] if applying the result failed
    ///
    /// Nothing is applied when conversion fails.
    pub async fn update(&self, client_key: &str, object: Option<&C::Object>) -> Result<(), Error> {
        let start = Instant::now();
        let result = self.apply(client_key, object).await;
        self.record(&result, start);
        result
    }

    /// Handle a delete of the object at `client_key`.
    ///
    /// # Errors
    ///
    /// - [`Error::Key`] if `client_key` is malformed
    /// - [`Error::Client`] if deleting backend resources failed
    pub async fn delete(&self, client_key: &str) -> Result<(), Error> {
        let start = Instant::now();
        let result = self.forget(client_key).await;
        self.record(&result, start);
        result
    }

    async fn forget(&self, client_key: &str) -> Result<(), Error> {
        let key = Key::from_client_key(&self.gvk.kind, client_key)?;
        self.updater.delete(&self.gvk, &key).await
    }

    async fn apply(&self, client_key: &str, object: Option<&C::Object>) -> Result<(), Error> {
        let key = Key::from_client_key(&self.gvk.kind, client_key)?;
        let desired = self.desired(&key, object)?;
        debug!(
            key = %key,
            keys = desired.len(),
            "Converted object"
        );

        let object_ref = object.map(|o| o.object_ref(&()));
        self.updater
            .update(&self.gvk, &key, object_ref, desired)
            .await
    }

    /// Convert the object and every sub-resource into one map.
    fn desired(&self, key: &Key, object: Option<&C::Object>) -> Result<DesiredResources, Error> {
        let (primary, subs) = self.converter.convert(key, object, &self.config)?;

        let mut desired = DesiredResources::new();
        if !primary.is_empty() {
            desired.insert(key.clone(), primary);
        }
        for (sub_key, sub) in subs {
            let resources = sub.convert(&sub_key, &self.config)?;
            if !resources.is_empty() {
                desired.insert(sub_key, resources);
            }
        }
        Ok(desired)
    }

    fn record(&self, result: &Result<(), Error>, start: Instant) {
        match result {
            Ok(()) => metrics::record_reconciliation_success(&self.gvk.kind, start.elapsed()),
            Err(_) => metrics::record_reconciliation_error(&self.gvk.kind, start.elapsed()),
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod handler_tests;
