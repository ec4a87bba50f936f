//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use raffle_types::RaffleRepository;

use super::auth::{admin_middleware, hash_admin_key};
use super::handlers::{self, AppState};
use crate::PaymentService;

/// HTTP Server for the Raffle API.
pub struct HttpServer<R: RaffleRepository> {
    state: Arc<AppState<R>>,
}

impl<R: RaffleRepository> HttpServer<R> {
    /// Creates a new HTTP server with the given service.
    ///
    /// Administrator routes stay locked until a key is set with
    /// [`HttpServer::with_admin_key`].
    pub fn new(service: PaymentService<R>) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                admin_key_hash: None,
            }),
        }
    }

    /// Creates a new HTTP server whose administrator routes accept `admin_key`.
    pub fn with_admin_key(service: PaymentService<R>, admin_key: &str) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                admin_key_hash: Some(hash_admin_key(admin_key)),
            }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let admin = Router::new()
            .route(
                "/api/tickets/{id}",
                put(handlers::update_payment::<R>).delete(handlers::delete_payment::<R>),
            )
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                admin_middleware::<R>,
            ));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route("/api/users", post(handlers::register_user::<R>))
            .route(
                "/api/users/{email}/cart",
                get(handlers::get_cart::<R>).post(handlers::add_to_cart::<R>),
            )
            .route(
                "/api/users/{email}/payments",
                get(handlers::get_payments_history::<R>).post(handlers::save_payment::<R>),
            )
            .route(
                "/api/users/{email}/payments/{id}",
                get(handlers::get_one_paid_payment::<R>),
            )
            .route("/api/items", post(handlers::create_item::<R>))
            .route("/api/nyxciphers", post(handlers::create_nyxcipher::<R>))
            .merge(admin)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
