// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent-facing handoff endpoints: the claim pool, lifecycle and quotes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use linescout_core::{
    now_timestamp, Handoff, HandoffStatus, LineScoutError, Quote, Role, TargetRole, User,
};
use linescout_storage::queries::quotes::{self, NewQuote};
use linescout_storage::queries::handoffs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{load_handoff, require_handoff_participant, require_role};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::server::AppState;

/// Request body for POST /v1/handoffs/{id}/status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: HandoffStatus,
}

/// Request body for POST /v1/handoffs/{id}/quotes.
#[derive(Debug, Deserialize)]
pub struct CreateQuoteRequest {
    pub product_total: f64,
    #[serde(default)]
    pub shipping_total: f64,
    pub deposit_percent: f64,
    /// Defaults to the configured chat currency.
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HandoffListResponse {
    pub handoffs: Vec<Handoff>,
}

#[derive(Debug, Serialize)]
pub struct QuoteListResponse {
    pub quotes: Vec<Quote>,
}

/// GET /v1/handoffs/pending
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<HandoffListResponse>, ApiError> {
    require_role(&user, Role::Agent)?;
    let handoffs = handoffs::list_pending_handoffs(&state.db).await?;
    Ok(Json(HandoffListResponse { handoffs }))
}

/// GET /v1/handoffs/mine
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<HandoffListResponse>, ApiError> {
    require_role(&user, Role::Agent)?;
    let handoffs = handoffs::list_agent_handoffs(&state.db, &user.id).await?;
    Ok(Json(HandoffListResponse { handoffs }))
}

/// POST /v1/handoffs/{id}/claim
///
/// First agent wins; later claims answer 409.
pub async fn claim(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<Handoff>, ApiError> {
    require_role(&user, Role::Agent)?;
    let handoff = handoffs::claim_handoff(&state.db, &id, &user.id, &now_timestamp()).await?;

    if let Err(e) = state
        .notifier
        .notify(
            &handoff.user_id,
            TargetRole::User,
            "handoff_claimed",
            "An agent picked up your project",
            &format!("{} is now working on: {}", user.display_name, handoff.summary),
        )
        .await
    {
        warn!(handoff_id = %id, error = %e, "failed to notify user of claim");
    }
    Ok(Json(handoff))
}

/// POST /v1/handoffs/{id}/status
///
/// Moves the handoff one step forward (or cancels it). Reaching `paid`
/// credits the agent's commission on product payments confirmed so far;
/// later confirmations top it up.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Handoff>, ApiError> {
    let handoff = load_handoff(&state, &id).await?;
    let is_assigned = handoff.agent_id.as_deref() == Some(user.id.as_str());
    if !is_assigned && !user.is_admin() {
        return Err(
            LineScoutError::forbidden("only the assigned agent can update this handoff").into(),
        );
    }

    let now = now_timestamp();
    let handoff = handoffs::update_handoff_status(&state.db, &id, body.status, &now).await?;

    if handoff.status == HandoffStatus::Paid
        && let Err(e) = state
            .wallet
            .credit_handoff_commission(&handoff, "status:paid", &now)
            .await
    {
        warn!(handoff_id = %id, error = %e, "commission credit failed");
    }
    Ok(Json(handoff))
}

/// POST /v1/handoffs/{id}/quotes
pub async fn create_quote(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<Quote>), ApiError> {
    require_role(&user, Role::Agent)?;
    let handoff = load_handoff(&state, &id).await?;

    let new_quote = NewQuote {
        product_total: body.product_total,
        shipping_total: body.shipping_total,
        deposit_percent: body.deposit_percent,
        currency: body.currency.unwrap_or_else(|| state.chat.currency.clone()),
        notes: body.notes,
    };
    let quote = quotes::create_quote(&state.db, &id, &user.id, new_quote, &now_timestamp()).await?;

    let summary = format!(
        "{} {:.2} for products and {:.2} for shipping",
        quote.currency, quote.product_total, quote.shipping_total
    );
    if let Err(e) = state
        .notifier
        .notify(
            &handoff.user_id,
            TargetRole::User,
            "quote_created",
            "You have a new quote",
            &summary,
        )
        .await
    {
        warn!(quote_id = %quote.id, error = %e, "failed to notify user of quote");
    }
    Ok((StatusCode::CREATED, Json(quote)))
}

/// GET /v1/handoffs/{id}/quotes
pub async fn list_quotes(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<QuoteListResponse>, ApiError> {
    let handoff = load_handoff(&state, &id).await?;
    require_handoff_participant(&user, &handoff)?;
    let quotes = quotes::list_quotes_for_handoff(&state.db, &id).await?;
    Ok(Json(QuoteListResponse { quotes }))
}
