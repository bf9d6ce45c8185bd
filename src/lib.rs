// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! # midonet-kube - Kubernetes to MidoNet translation controller
//!
//! midonet-kube watches Nodes, Pods, Services and Endpoints and keeps the virtual
//! network of a MidoNet deployment in line with them: a bridge per node linked to
//! the cluster router, a bridge port per pod bound to its host interface, and rule
//! chains load-balancing service traffic to endpoints.
//!
//! ## Overview
//!
//! Every event runs the same pipeline:
//!
//! 1. a per-kind converter translates the object into backend resources with
//!    deterministic identifiers
//! 2. the updater diffs the result against what it applied last time
//! 3. the MidoNet client creates what is new and deletes what vanished
//!
//! ## Modules
//!
//! - [`converter`] - per-kind translation, event handling and the diff engine
//! - [`midonet`] - MidoNet resource model and REST client
//! - [`identity`] - deterministic identifiers, MAC addresses and interface names
//! - [`controller`] - watch loops and retry backoff
//! - [`context`] - shared context and reflector stores for controllers
//! - [`config`] - command-line and environment configuration
//! - [`errors`] - typed errors and their retry classification
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use midonet_kube::converter::Key;
//! use midonet_kube::identity::{if_name_for_key, mac_for_key};
//!
//! let key = Key::from_client_key("Pod", "default/web-0").unwrap();
//! let port_id = key.id();
//! let if_name = if_name_for_key(&key.translation_name());
//! let mac = mac_for_key(&key.translation_name());
//! assert_eq!(if_name.len(), 15);
//! # let _ = (port_id, mac);
//! ```

pub mod annotations;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod converter;
pub mod errors;
pub mod http_errors;
pub mod identity;
pub mod metrics;
pub mod midonet;
