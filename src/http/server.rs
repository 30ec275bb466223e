//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router and wire handlers to shared state
//! - Apply middleware (request ID, tracing, timeout, body limit, CORS)
//! - Rate limit the credential endpoints
//! - Run background upkeep alongside the listener and drain on shutdown

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::AuthService;
use crate::blockchain::ChainGateway;
use crate::config::ServerConfig;
use crate::http::middleware::{request_timeout, require_auth, track_metrics};
use crate::http::{auth, transactions, wallet};
use crate::lifecycle::startup::{spawn_flush_task, spawn_prune_task};
use crate::lifecycle::Shutdown;
use crate::security::{rate_limit_middleware, RateLimiter};
use crate::store::{UserStore, WalletStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub wallets: WalletStore,
    pub gateway: Arc<dyn ChainGateway>,
}

/// HTTP server for the wallet API.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    state: AppState,
    users: UserStore,
}

impl HttpServer {
    pub fn new(
        config: ServerConfig,
        gateway: Arc<dyn ChainGateway>,
        users: UserStore,
        wallets: WalletStore,
    ) -> Self {
        let auth = Arc::new(AuthService::new(&config.auth, users.clone()));
        let state = AppState {
            auth,
            wallets,
            gateway,
        };

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
            users,
        }
    }

    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        let public = Router::new()
            .route("/", get(index))
            .route("/health", get(health))
            .route("/auth/logout", post(auth::logout))
            .route("/auth/check-balance", post(wallet::check_balance));

        let credentials = Router::new()
            .route("/auth/signup", post(auth::signup))
            .route("/auth/login", post(auth::login))
            .route_layer(from_fn_with_state(limiter, rate_limit_middleware));

        let protected = Router::new()
            .route("/auth/dashboard", get(auth::dashboard))
            .route("/auth/profile", patch(auth::update_profile))
            .route(
                "/auth/wallets",
                get(wallet::list_wallets).post(wallet::register_wallet),
            )
            .route("/auth/deposit", post(wallet::deposit))
            .route("/auth/send-transaction", post(transactions::record_transfer))
            .route(
                "/auth/wallet/{address}/transactions",
                get(transactions::wallet_history),
            )
            .route("/auth/transactions", get(transactions::list_transfers))
            .route("/auth/transaction/{id}", delete(transactions::delete_transfer))
            .route("/api/send-transaction", post(wallet::send_on_chain))
            .route("/api/airdrop", post(wallet::airdrop))
            .route_layer(from_fn_with_state(state.auth.clone(), require_auth));

        Router::new()
            .merge(public)
            .merge(credentials)
            .merge(protected)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |req: &Request<Body>| {
                            let request_id = req
                                .headers()
                                .get("x-request-id")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("unknown");
                            tracing::info_span!(
                                "request",
                                method = %req.method(),
                                uri = %req.uri(),
                                request_id = %request_id,
                            )
                        },
                    ))
                    .layer(from_fn(track_metrics))
                    .layer(from_fn_with_state(
                        Duration::from_secs(config.listener.request_timeout_secs),
                        request_timeout,
                    ))
                    .layer(DefaultBodyLimit::max(config.listener.max_body_size))
                    .layer(CorsLayer::permissive()),
            )
    }

    /// Serve until `shutdown` fires, then wait for the final store flush.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let prune = spawn_prune_task(
            self.state.auth.clone(),
            self.config.auth.prune_interval_secs,
            shutdown.subscribe(),
        );
        let flush = spawn_flush_task(
            self.users.clone(),
            self.state.wallets.clone(),
            self.config.storage.flush_interval_secs,
            shutdown.subscribe(),
        );

        let mut shutdown_rx = shutdown.subscribe();
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        for (task, handle) in [("prune", prune), ("flush", flush)] {
            if let Err(e) = handle.await {
                tracing::error!(task, error = %e, "Background task panicked");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn index() -> &'static str {
    "Wallet API working"
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let chain_reachable = state.gateway.is_healthy().await;
    Json(json!({
        "status": "ok",
        "chain_reachable": chain_reachable,
    }))
}
