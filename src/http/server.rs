//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router: `/_mounts` listing plus the page catch-all
//! - Wire up middleware (request id, tracing, timeout)
//! - Fill in listener fields from the `x-ui-interface` header before decoding
//! - Run the request cycle against the current mount table snapshot
//! - Apply reloaded configs while serving
//! - Stop gracefully on shutdown

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::MountsConfig;
use crate::http::dispatch::{Outcome, RequestCycle};
use crate::http::request::{interface_header, is_ajax, request_id, UuidRequestId};
use crate::lifecycle::{build_mount_table, build_page_registry, Shutdown, StartupError};
use crate::page::{InMemoryPageStore, PageRegistry};
use crate::request::RequestParameters;
use crate::routing::{MountInfo, MountRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub mounts: Arc<MountRegistry>,
    pub registry: Arc<ArcSwap<PageRegistry>>,
    pub pages: Arc<InMemoryPageStore>,
}

impl AppState {
    /// Build the page registry and mount table for `config`.
    pub fn from_config(config: &MountsConfig) -> Result<Self, StartupError> {
        let registry = build_page_registry(&config.pages)?;
        let table = build_mount_table(config, &registry)?;
        Ok(Self {
            mounts: Arc::new(MountRegistry::new(table)),
            registry: Arc::new(ArcSwap::from_pointee(registry)),
            pages: Arc::new(InMemoryPageStore::new(config.settings.page_store_capacity)),
        })
    }

    /// Swap in the pages and mounts of a reloaded config.
    /// On error the current ones stay in place. Stored pages are kept.
    pub fn apply(&self, config: &MountsConfig) -> Result<(), StartupError> {
        let registry = build_page_registry(&config.pages)?;
        let table = build_mount_table(config, &registry)?;
        self.registry.store(Arc::new(registry));
        self.mounts.replace(table);
        Ok(())
    }
}

/// HTTP server hosting the mounted pages.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: &MountsConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(config)?;
        let router = Self::build_router(config, state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &MountsConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request),
                    )
                }),
            )
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id());

        Router::new()
            .route("/_mounts", get(mounts_handler))
            .route("/{*path}", any(page_handler))
            .route("/", any(page_handler))
            .with_state(state)
            .layer(middleware)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve on `listener` until `shutdown` fires, applying configs from
    /// `updates` as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        updates: Option<mpsc::UnboundedReceiver<MountsConfig>>,
        shutdown: &Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(updates) = updates {
            tokio::spawn(reload_loop(self.state.clone(), updates, shutdown.subscribe()));
        }

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn reload_loop(
    state: AppState,
    mut updates: mpsc::UnboundedReceiver<MountsConfig>,
    mut stop: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                match state.apply(&config) {
                    Ok(()) => tracing::info!(mounts = config.mounts.len(), "Config reloaded"),
                    Err(e) => tracing::error!(error = %e, "Failed to apply config, keeping current mounts"),
                }
            }
            _ = stop.recv() => break,
        }
    }
    tracing::debug!("Config reload loop stopped");
}

async fn mounts_handler(State(state): State<AppState>) -> Json<Vec<MountInfo>> {
    Json(state.mounts.load().list())
}

async fn page_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let mut parameters =
        RequestParameters::with_query(request.uri().path(), request.uri().query());
    parameters.ajax = is_ajax(&request);
    // A callback sent outside the URL addresses the stored page itself.
    if let Some(raw) = interface_header(&request) {
        if let Err(err) = parameters.apply_interface_parameter(raw) {
            tracing::debug!(error = %err, "Rejecting malformed listener callback header");
            return Outcome::NotFound(err.to_string()).into_response();
        }
    }

    let mounts = state.mounts.load();
    let registry = state.registry.load();
    let outcome = RequestCycle::new(&mounts, state.pages.as_ref(), &registry).process(parameters);

    tracing::debug!(status = outcome.status().as_u16(), "Request processed");
    outcome.into_response()
}
