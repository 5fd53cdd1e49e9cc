// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wallet balance and payout endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use linescout_billing::{PayoutDetails, WalletBalance};
use linescout_core::{
    now_timestamp, PayoutRequest, PayoutStatus, TargetRole, User, WalletTransaction,
};
use linescout_storage::queries::{payouts, users, wallet};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::require_admin;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub balance: WalletBalance,
    pub transactions: Vec<WalletTransaction>,
}

#[derive(Debug, Serialize)]
pub struct PayoutListResponse {
    pub payouts: Vec<PayoutRequest>,
}

/// Request body for POST /v1/admin/payouts/{id}/status.
#[derive(Debug, Deserialize)]
pub struct PayoutStatusRequest {
    pub status: PayoutStatus,
}

/// GET /v1/wallet
pub async fn get_wallet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<WalletResponse>, ApiError> {
    let balance = state.wallet.balance(&user.id).await?;
    let transactions = wallet::list_wallet_transactions(&state.db, &user.id).await?;
    Ok(Json(WalletResponse {
        balance,
        transactions,
    }))
}

/// GET /v1/payouts
///
/// Admins see every request; everyone else sees their own.
pub async fn list_payouts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<PayoutListResponse>, ApiError> {
    let owner = (!user.is_admin()).then_some(user.id.as_str());
    let payouts = payouts::list_payout_requests(&state.db, owner).await?;
    Ok(Json(PayoutListResponse { payouts }))
}

/// POST /v1/payouts
pub async fn request_payout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(body): ApiJson<PayoutDetails>,
) -> Result<(StatusCode, Json<PayoutRequest>), ApiError> {
    let payout = state
        .wallet
        .request_payout(&user.id, body, &now_timestamp())
        .await?;
    Ok((StatusCode::CREATED, Json(payout)))
}

/// POST /v1/admin/payouts/{id}/status
pub async fn update_payout_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PayoutStatusRequest>,
) -> Result<Json<PayoutRequest>, ApiError> {
    require_admin(&user)?;
    let payout =
        payouts::update_payout_status(&state.db, &id, body.status, &now_timestamp()).await?;
    info!(payout_id = %id, status = %payout.status, "payout status updated");

    let inbox = users::get_user(&state.db, &payout.owner_id)
        .await?
        .map_or(TargetRole::Agent, |owner| owner.role.inbox());
    let text = format!("Your payout of {:.2} is now {}", payout.amount, payout.status);
    if let Err(e) = state
        .notifier
        .notify(&payout.owner_id, inbox, "payout_status", "Payout update", &text)
        .await
    {
        warn!(payout_id = %id, error = %e, "failed to notify payout owner");
    }
    Ok(Json(payout))
}
