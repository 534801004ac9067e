// ABOUTME: HTTP server assembly and lifecycle for the Leaky Bucket API
// ABOUTME: Builds shared resources, the axum router with its layers, and runs the refill scheduler alongside
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! # Server
//!
//! [`ServerResources`] is created once at startup and shared with every handler
//! through `Arc`. [`Server::run`] binds the listener, starts the replenishment
//! scheduler when enabled, and serves until Ctrl+C or SIGTERM. The scheduler is
//! stopped after the listener drains, so an in-flight refill run completes.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::constants::http::{REQUEST_ID_HEADER, REQUEST_TIMEOUT_SECS};
use crate::database_plugins::factory::Database;
use crate::errors::{AppError, AppResult};
use crate::middleware::setup_cors;
use crate::routes::{AuthRoutes, CompanyRoutes, HealthRoutes, PolicyRoutes, UserRoutes};
use crate::tokens::{ProvisioningEngine, RefillScheduler};
use axum::Router;
use http::header::HeaderName;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state handed to every route handler
pub struct ServerResources {
    /// Storage backend
    pub database: Database,
    /// JWT issuance and password hashing
    pub auth_manager: AuthManager,
    /// Signup and removal workflows
    pub provisioning: ProvisioningEngine<Database>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire the shared resources over an already opened database
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        Self {
            auth_manager: AuthManager::new(&config.auth),
            provisioning: ProvisioningEngine::new(database.clone()),
            database,
            config,
        }
    }
}

/// Assemble every route group with tracing, request id, timeout, and CORS layers
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(CompanyRoutes::routes(resources.clone()))
        .merge(PolicyRoutes::routes(resources.clone()))
        .merge(UserRoutes::routes(resources.clone()))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(setup_cors(&resources.config.cors))
}

/// The Leaky Bucket HTTP server
pub struct Server {
    resources: Arc<ServerResources>,
}

impl Server {
    /// Open the configured database, run migrations, and prepare resources
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database.url.to_connection_string()).await?;
        info!(backend = database.backend_info(), "Database ready");

        Ok(Self::new(ServerResources::new(database, Arc::new(config))))
    }

    /// Create a server over prepared resources
    #[must_use]
    pub fn new(resources: ServerResources) -> Self {
        Self {
            resources: Arc::new(resources),
        }
    }

    /// Shared resources, for tests and diagnostics
    #[must_use]
    pub const fn resources(&self) -> &Arc<ServerResources> {
        &self.resources
    }

    /// Serve until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server fails
    pub async fn run(self) -> AppResult<()> {
        let config = &self.resources.config;
        let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
            .parse()
            .map_err(|e| AppError::config(format!("Invalid bind address: {e}")))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind to {addr}: {e}")))?;

        self.run_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve on an existing listener until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while serving
    pub async fn run_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let refill = self.resources.config.refill;
        let scheduler = if refill.enabled {
            Some(RefillScheduler::new(self.resources.database.clone(), refill).spawn())
        } else {
            info!("Token replenishment scheduler disabled");
            None
        };

        let app = build_router(&self.resources);
        if let Ok(addr) = listener.local_addr() {
            info!("HTTP server listening on http://{addr}");
        }

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(handle) = scheduler {
            handle.shutdown().await;
        }

        served.map_err(|e| {
            error!("Server error: {e}");
            AppError::internal(format!("HTTP server failed: {e}"))
        })?;

        info!("Server shut down cleanly");
        Ok(())
    }
}

/// Resolve on Ctrl+C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
