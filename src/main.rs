// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use clap::Parser;
use k8s_openapi::api::core::v1::{Endpoints, Node, Pod, Service};
use kube::runtime::reflector;
use kube::{Api, Client, Resource};
use midonet_kube::{
    config::{Config, ControllerKind, ValidatedConfig},
    constants::{HEALTH_SERVER_PATH, METRICS_SERVER_PATH, TOKIO_WORKER_THREADS},
    context::Context,
    controller,
    converter::{
        bootstrap::bootstrap, endpoints::EndpointsConverter, node::NodeConverter,
        pod::PodConverter, service::ServiceConverter, Converter, DiffUpdater,
    },
    metrics,
    midonet::MidonetClient,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::net::SocketAddr;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("midonet-kube")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG (default info) and RUST_LOG_FORMAT (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let config = Config::parse()
        .validate()
        .context("invalid configuration")?;

    info!(
        midonet_api = %config.client.api,
        tenant = %config.converter.tenant,
        cluster_router = %config.converter.cluster_router,
        controllers = ?config.controllers,
        "Starting midonet-kube controller"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let midonet = MidonetClient::from_config(&config.client)?;
    bootstrap(&midonet, &config.converter)
        .await
        .context("failed to create cluster-wide MidoNet resources")?;

    let (ctx, node_writer) = Context::new(client, config.converter.clone(), DiffUpdater::new(midonet));

    info!("Starting all controllers");

    // Controllers should never exit - if one fails, we log it and exit the main process
    tokio::select! {
        result = run_metrics_server(config.metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
        result = run_node_controller(&ctx, node_writer, &config) => {
            error!("CRITICAL: Node controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Node controller exited unexpectedly without error")
        }
        result = when_enabled(&config, ControllerKind::Pod, run_controller::<Pod, _>(&ctx, PodConverter::new(ctx.stores.nodes.clone()))) => {
            error!("CRITICAL: Pod controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Pod controller exited unexpectedly without error")
        }
        result = when_enabled(&config, ControllerKind::Service, run_controller::<Service, _>(&ctx, ServiceConverter::new())) => {
            error!("CRITICAL: Service controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Service controller exited unexpectedly without error")
        }
        result = when_enabled(&config, ControllerKind::Endpoints, run_controller::<Endpoints, _>(&ctx, EndpointsConverter::new())) => {
            error!("CRITICAL: Endpoints controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Endpoints controller exited unexpectedly without error")
        }
        () = shutdown_signal() => {
            info!("Shutdown signal received, stopping");
            Ok(())
        }
    }
}

/// Run `controller` if `kind` is enabled, otherwise never complete.
async fn when_enabled<F>(config: &ValidatedConfig, kind: ControllerKind, controller: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    if config.is_enabled(kind) {
        controller.await
    } else {
        debug!(controller = %kind, "Controller disabled");
        std::future::pending().await
    }
}

/// Run the controller of kind `K` with its own store.
async fn run_controller<K, C>(ctx: &Context, converter: C) -> Result<()>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    C: Converter<Object = K>,
{
    let (_, writer) = reflector::store::<K>();
    controller::run_controller(Api::<K>::all(ctx.client.clone()), writer, ctx.handler(converter))
        .await
}

/// Run the Node controller, or only its reflector when disabled. Pods look nodes
/// up in the store either way.
async fn run_node_controller(
    ctx: &Context,
    writer: reflector::store::Writer<Node>,
    config: &ValidatedConfig,
) -> Result<()> {
    let api = Api::<Node>::all(ctx.client.clone());
    if config.is_enabled(ControllerKind::Node) {
        controller::run_controller(api, writer, ctx.handler(NodeConverter::new())).await
    } else {
        controller::run_reflector(api, writer).await
    }
}

/// Serve Prometheus metrics and a liveness endpoint.
async fn run_metrics_server(addr: SocketAddr) -> Result<()> {
    let app = Router::new()
        .route(METRICS_SERVER_PATH, get(serve_metrics))
        .route(HEALTH_SERVER_PATH, get(|| async { "ok" }));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics server to {addr}"))?;
    info!(address = %addr, "Serving metrics");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn serve_metrics() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "Failed to gather metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
