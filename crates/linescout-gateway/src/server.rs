// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::middleware as axum_middleware;
use axum::routing::{get, post, put};
use axum::Router;
use linescout_billing::{QuoteLedger, WalletLedger};
use linescout_config::model::{ChatConfig, LineScoutConfig, PaymentsConfig};
use linescout_core::LineScoutError;
use linescout_notify::Notifier;
use linescout_storage::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers::{
    conversations, handoffs, health, notifications, providers, quotes, reorders, wallet,
};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub notifier: Notifier,
    pub quotes: QuoteLedger,
    pub wallet: WalletLedger,
    pub chat: Arc<ChatConfig>,
    pub payments: Arc<PaymentsConfig>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, notifier: Notifier, config: &LineScoutConfig) -> Self {
        Self {
            quotes: QuoteLedger::new(db.clone()),
            wallet: WalletLedger::new(db.clone(), &config.payments),
            db,
            notifier,
            chat: Arc::new(config.chat.clone()),
            payments: Arc::new(config.payments.clone()),
            started_at: Instant::now(),
        }
    }
}

/// Bind address for [`start_server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Assemble the full router: public health check plus authenticated `/v1` API.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/conversations",
            post(conversations::open_conversation).get(conversations::list_conversations),
        )
        .route(
            "/v1/conversations/{id}",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        .route("/v1/conversations/{id}/human", post(conversations::request_human))
        .route("/v1/conversations/{id}/cancel", post(conversations::cancel_conversation))
        .route(
            "/v1/conversations/{id}/messages",
            get(conversations::list_messages).post(conversations::post_message),
        )
        .route("/v1/conversations/{id}/read", post(conversations::mark_read))
        .route("/v1/conversations/{id}/payments", post(conversations::record_payment))
        .route("/v1/conversations/{id}/handoff", post(conversations::open_handoff))
        .route("/v1/handoffs/pending", get(handoffs::list_pending))
        .route("/v1/handoffs/mine", get(handoffs::list_mine))
        .route("/v1/handoffs/{id}/claim", post(handoffs::claim))
        .route("/v1/handoffs/{id}/status", post(handoffs::update_status))
        .route(
            "/v1/handoffs/{id}/quotes",
            post(handoffs::create_quote).get(handoffs::list_quotes),
        )
        .route("/v1/quotes/{id}/summary", get(quotes::get_summary))
        .route("/v1/quotes/{id}/payments", post(quotes::record_payment))
        .route("/v1/payments/confirm", post(quotes::confirm_payment))
        .route("/v1/notifications", get(notifications::list))
        .route("/v1/notifications/read-all", post(notifications::mark_all_read))
        .route("/v1/notifications/{id}/read", post(notifications::mark_read))
        .route("/v1/wallet", get(wallet::get_wallet))
        .route("/v1/payouts", get(wallet::list_payouts).post(wallet::request_payout))
        .route("/v1/admin/payouts/{id}/status", post(wallet::update_payout_status))
        .route("/v1/payment-provider", get(providers::get_provider))
        .route("/v1/admin/payment-provider", put(providers::set_provider))
        .route("/v1/reorders", get(reorders::list).post(reorders::create))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` resolves, then drain in-flight requests.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: AppState,
    shutdown: F,
) -> Result<(), LineScoutError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LineScoutError::Config(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| LineScoutError::Internal(format!("server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
