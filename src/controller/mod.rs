// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Watch loops feeding cluster events into the handlers.
//!
//! Each kind runs one loop over a `watcher` + `reflector` stream. Events of a kind
//! are handled one at a time, so at most one reconciliation per key is in flight.
//!
//! - `Apply` / `InitApply` → [`Handler::update`]
//! - `Delete` → [`Handler::delete`]
//! - `InitDone` → [`Handler::delete`] for every tracked key the listing since `Init`
//!   did not contain, so objects deleted while the watch was down are cleaned up
//! - retryable error → the key is re-delivered after a per-key exponential backoff;
//!   re-delivery reads the object back from the store and deletes when it is gone
//! - fatal error → the loop returns the error

pub mod retry;

use crate::converter::{Converter, Handler, Updater};
use crate::errors::Error;
use crate::metrics;
use futures::{Stream, StreamExt};
use kube::runtime::reflector::{self, ObjectRef, Store};
use kube::runtime::watcher;
use kube::runtime::WatchStreamExt;
use kube::{Api, Resource, ResourceExt};
use retry::KeyBackoffs;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Flat client key of an object: `namespace/name`, or `name` when cluster-scoped.
#[must_use]
pub fn client_key<K: Resource>(object: &K) -> String {
    match object.namespace() {
        Some(namespace) => format!("{namespace}/{}", object.name_any()),
        None => object.name_any(),
    }
}

/// Store reference for a flat client key.
#[must_use]
pub fn object_ref<K>(client_key: &str) -> ObjectRef<K>
where
    K: Resource<DynamicType = ()>,
{
    match client_key.split_once('/') {
        Some((namespace, name)) => ObjectRef::new(name).within(namespace),
        None => ObjectRef::new(client_key),
    }
}

/// Watch every object of kind `K` and hand its events to `handler`.
///
/// The watch populates `writer`, so stores read from it by other controllers stay
/// current while this loop runs.
///
/// # Errors
///
/// Returns the first fatal handler error.
pub async fn run_controller<K, C, U>(
    api: Api<K>,
    writer: reflector::store::Writer<K>,
    handler: Handler<C, U>,
) -> anyhow::Result<()>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    C: Converter<Object = K>,
    U: Updater,
{
    info!(kind = handler.kind(), "Starting controller");
    let store = writer.as_reader();
    let stream = reflector::reflector(
        writer,
        watcher::watcher(api, watcher::Config::default()).default_backoff(),
    );
    run_events(Box::pin(stream), store, &handler).await
}

/// Keep `writer` populated without handling events, for kinds other controllers
/// look up while their own controller is disabled.
///
/// # Errors
///
/// Returns an error if the watch stream ends.
pub async fn run_reflector<K>(api: Api<K>, writer: reflector::store::Writer<K>) -> anyhow::Result<()>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let kind = K::kind(&()).to_string();
    info!(kind = %kind, "Starting reflector");
    reflector::reflector(
        writer,
        watcher::watcher(api, watcher::Config::default()).default_backoff(),
    )
    .for_each(|event| {
        if let Err(e) = event {
            warn!(kind = %kind, error = %e, "Watch error");
        }
        futures::future::ready(())
    })
    .await;
    anyhow::bail!("{kind} reflector stream ended")
}

/// Handle watch events until the stream ends or a fatal error occurs.
///
/// `store` is read when a failed key is re-delivered.
///
/// # Errors
///
/// Returns the first fatal handler error.
pub async fn run_events<K, C, U, S>(
    mut events: S,
    store: Store<K>,
    handler: &Handler<C, U>,
) -> anyhow::Result<()>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
    C: Converter<Object = K>,
    U: Updater,
    S: Stream<Item = Result<watcher::Event<K>, watcher::Error>> + Unpin,
{
    let kind = handler.kind().to_string();
    let (retry_tx, mut retry_rx) = mpsc::unbounded_channel::<String>();
    let mut backoffs = KeyBackoffs::new();
    // Keys seen since the last `Init`, while a listing is in progress
    let mut listed: Option<HashSet<String>> = None;

    loop {
        let outcomes = tokio::select! {
            event = events.next() => match event {
                Some(Ok(watcher::Event::Apply(object) | watcher::Event::InitApply(object))) => {
                    let key = client_key(&object);
                    debug!(kind = %kind, key = %key, "Object applied");
                    if let Some(listed) = listed.as_mut() {
                        listed.insert(key.clone());
                    }
                    let result = handler.update(&key, Some(&object)).await;
                    vec![(key, result)]
                }
                Some(Ok(watcher::Event::Delete(object))) => {
                    let key = client_key(&object);
                    debug!(kind = %kind, key = %key, "Object deleted");
                    let result = handler.delete(&key).await;
                    vec![(key, result)]
                }
                Some(Ok(watcher::Event::Init)) => {
                    debug!(kind = %kind, "Listing started");
                    listed = Some(HashSet::new());
                    continue;
                }
                Some(Ok(watcher::Event::InitDone)) => {
                    let Some(listed) = listed.take() else {
                        continue;
                    };
                    info!(kind = %kind, objects = listed.len(), "Initial listing handled");
                    prune(handler, &listed).await
                }
                Some(Err(e)) => {
                    warn!(kind = %kind, error = %e, "Watch error");
                    continue;
                }
                None => {
                    info!(kind = %kind, "Watch stream ended");
                    return Ok(());
                }
            },
            Some(key) = retry_rx.recv() => {
                let result = match store.get(&object_ref::<K>(&key)) {
                    Some(object) => {
                        debug!(kind = %kind, key = %key, "Re-delivering object");
                        handler.update(&key, Some(&object)).await
                    }
                    None => {
                        debug!(kind = %kind, key = %key, "Re-delivering delete of vanished object");
                        handler.delete(&key).await
                    }
                };
                vec![(key, result)]
            }
        };

        for (key, result) in outcomes {
            match result {
                Ok(()) => backoffs.reset(&key),
                Err(e) if e.is_retryable() => {
                    let delay = backoffs.next(&key);
                    metrics::record_reconciliation_requeue(&kind, e.reason());
                    warn!(
                        kind = %kind,
                        key = %key,
                        reason = e.reason(),
                        error = %e,
                        retry_after = ?delay,
                        "Retryable error, will re-deliver"
                    );
                    schedule(retry_tx.clone(), key, delay);
                }
                Err(e) => return Err(fatal(&kind, &key, e)),
            }
        }
    }
}

/// Delete every tracked object missing from a completed listing. Stops after the
/// first fatal error.
async fn prune<C, U>(
    handler: &Handler<C, U>,
    listed: &HashSet<String>,
) -> Vec<(String, Result<(), Error>)>
where
    C: Converter,
    C::Object: Resource<DynamicType = ()> + Send + Sync,
    U: Updater,
{
    let mut outcomes = Vec::new();
    for key in handler.tracked() {
        if listed.contains(&key) {
            continue;
        }
        info!(kind = handler.kind(), key = %key, "Object gone after re-list, deleting");
        let result = handler.delete(&key).await;
        let stop = result.as_ref().is_err_and(Error::is_fatal);
        outcomes.push((key, result));
        if stop {
            break;
        }
    }
    outcomes
}

fn schedule(retry_tx: mpsc::UnboundedSender<String>, key: String, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        // The loop is gone when the send fails, nothing left to retry for
        let _ = retry_tx.send(key);
    });
}

fn fatal(kind: &str, key: &str, e: Error) -> anyhow::Error {
    error!(
        kind = %kind,
        key = %key,
        reason = e.reason(),
        error = %e,
        "Fatal error, stopping controller"
    );
    anyhow::Error::new(e).context(format!("{kind} {key}"))
}
