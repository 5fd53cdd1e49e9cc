// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment provider selection.

use axum::extract::State;
use axum::{Extension, Json};
use linescout_billing::{resolve_provider, ProviderSource, ResolvedProvider};
use linescout_core::{now_timestamp, LineScoutError, PaymentProvider, User};
use linescout_storage::queries::payment_settings::{self, GLOBAL_SCOPE};
use linescout_storage::queries::users;
use serde::Deserialize;
use tracing::info;

use super::require_admin;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::server::AppState;

/// Request body for PUT /v1/admin/payment-provider.
#[derive(Debug, Deserialize)]
pub struct SetProviderRequest {
    pub provider: PaymentProvider,
    /// Owner to override; omitted sets the global provider.
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// GET /v1/payment-provider
///
/// The provider the caller should pay with: their own override, else the
/// global setting, else the configured default.
pub async fn get_provider(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<ResolvedProvider>, ApiError> {
    let resolved = resolve_provider(&state.db, &user.id, state.payments.default_provider).await?;
    Ok(Json(resolved))
}

/// PUT /v1/admin/payment-provider
pub async fn set_provider(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(body): ApiJson<SetProviderRequest>,
) -> Result<Json<ResolvedProvider>, ApiError> {
    require_admin(&user)?;
    let (scope, source) = match body.owner_id.as_deref().map(str::trim) {
        None => (GLOBAL_SCOPE.to_string(), ProviderSource::Global),
        Some("") => return Err(LineScoutError::validation("owner_id must not be empty").into()),
        Some(owner_id) => {
            if users::get_user(&state.db, owner_id).await?.is_none() {
                return Err(LineScoutError::not_found("user", owner_id).into());
            }
            (owner_id.to_string(), ProviderSource::Owner)
        }
    };
    payment_settings::set_payment_provider(&state.db, &scope, body.provider, &now_timestamp())
        .await?;
    info!(%scope, provider = %body.provider, "payment provider updated");
    Ok(Json(ResolvedProvider {
        provider: body.provider,
        source,
    }))
}
