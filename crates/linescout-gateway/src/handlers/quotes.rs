// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quote payment endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use linescout_billing::{resolve_provider, QuotePaymentSummary};
use linescout_core::{
    now_timestamp, LineScoutError, PaymentProvider, PaymentPurpose, Quote, QuotePayment,
    TargetRole, User,
};
use linescout_storage::queries::quotes::{self, ConfirmedPayment, NewQuotePayment};
use serde::Deserialize;
use tracing::{info, warn};

use super::{load_handoff, require_admin, require_handoff_participant};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::server::AppState;

/// Request body for POST /v1/quotes/{id}/payments.
#[derive(Debug, Deserialize)]
pub struct QuotePaymentRequest {
    pub purpose: PaymentPurpose,
    pub amount: f64,
    pub reference: String,
    #[serde(default)]
    pub provider: Option<PaymentProvider>,
}

/// Request body for POST /v1/payments/confirm.
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub reference: String,
}

async fn load_quote(state: &AppState, id: &str) -> Result<Quote, LineScoutError> {
    quotes::get_quote(&state.db, id)
        .await?
        .ok_or_else(|| LineScoutError::not_found("quote", id))
}

/// GET /v1/quotes/{id}/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<QuotePaymentSummary>, ApiError> {
    let quote = load_quote(&state, &id).await?;
    let handoff = load_handoff(&state, &quote.handoff_id).await?;
    require_handoff_participant(&user, &handoff)?;
    Ok(Json(state.quotes.summary(&id).await?))
}

/// POST /v1/quotes/{id}/payments
///
/// Records an unpaid payment intent. Replaying a reference returns the
/// existing payment.
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<QuotePaymentRequest>,
) -> Result<(StatusCode, Json<QuotePayment>), ApiError> {
    let reference = body.reference.trim();
    if reference.is_empty() {
        return Err(LineScoutError::validation("payment reference must not be empty").into());
    }
    let quote = load_quote(&state, &id).await?;
    let handoff = load_handoff(&state, &quote.handoff_id).await?;
    if handoff.user_id != user.id {
        return Err(LineScoutError::forbidden("only the buyer can pay this quote").into());
    }

    let provider = match body.provider {
        Some(provider) => provider,
        None => {
            resolve_provider(&state.db, &user.id, state.payments.default_provider)
                .await?
                .provider
        }
    };
    let payment = quotes::record_quote_payment(
        &state.db,
        NewQuotePayment {
            quote_id: id.clone(),
            purpose: body.purpose,
            amount: body.amount,
            provider,
            reference: reference.to_string(),
        },
        &now_timestamp(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST /v1/payments/confirm
///
/// Marks a payment paid once the provider has settled it. Confirming twice is
/// a no-op and only the first confirmation notifies the agent. A product
/// payment confirmed after the handoff reached `paid` tops up the agent's
/// commission.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(body): ApiJson<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmedPayment>, ApiError> {
    require_admin(&user)?;
    let now = now_timestamp();
    let confirmed = quotes::confirm_quote_payment(&state.db, body.reference.trim(), &now).await?;
    if !confirmed.newly_paid {
        return Ok(Json(confirmed));
    }

    let payment = &confirmed.payment;
    info!(
        quote_id = %payment.quote_id,
        reference = %payment.reference,
        purpose = %payment.purpose,
        amount = payment.amount,
        "quote payment confirmed"
    );
    let quote = load_quote(&state, &payment.quote_id).await?;
    let handoff = load_handoff(&state, &quote.handoff_id).await?;
    let trigger = format!("payment:{}", payment.reference);
    if payment.purpose.is_product()
        && handoff.status.earns_commission()
        && let Err(e) = state
            .wallet
            .credit_handoff_commission(&handoff, &trigger, &now)
            .await
    {
        warn!(handoff_id = %handoff.id, error = %e, "commission top-up failed");
    }

    let text = format!(
        "{} {:.2} received for {}",
        quote.currency, payment.amount, payment.purpose
    );
    if let Err(e) = state
        .notifier
        .notify(
            &quote.agent_id,
            TargetRole::Agent,
            "payment_confirmed",
            "Payment confirmed",
            &text,
        )
        .await
    {
        warn!(quote_id = %quote.id, error = %e, "failed to notify agent of payment");
    }
    Ok(Json(confirmed))
}
