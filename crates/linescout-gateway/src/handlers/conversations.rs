// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation, message, chat payment and handoff-opening endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use linescout_billing::resolve_provider;
use linescout_core::{
    format_timestamp, now_timestamp, ChatPayment, Conversation, Handoff, LineScoutError, Message,
    PaymentProvider, Role, RouteType, SenderType, TargetRole, User,
};
use linescout_storage::queries::{chat_payments, conversations, handoffs, messages};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
    conversation_participant, load_conversation, require_owner, require_role, LimitQuery,
    Participant,
};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::server::AppState;

const MAX_MESSAGE_CHARS: usize = 4000;

/// Request body for POST /v1/conversations.
#[derive(Debug, Deserialize)]
pub struct OpenConversationRequest {
    pub route_type: RouteType,
}

/// Request body for POST /v1/conversations/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
    /// Admins may post as the AI assistant; everyone else posts as themselves.
    #[serde(default)]
    pub sender_type: Option<SenderType>,
}

/// Request body for POST /v1/conversations/{id}/payments.
#[derive(Debug, Deserialize)]
pub struct ChatPaymentRequest {
    /// Provider transaction reference; repeats are idempotent.
    pub reference: String,
    /// Amount the provider settled. Defaults to the configured paid chat
    /// price and may not be lower.
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub provider: Option<PaymentProvider>,
}

/// Request body for POST /v1/conversations/{id}/handoff.
#[derive(Debug, Deserialize)]
pub struct OpenHandoffRequest {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ReadReceiptResponse {
    pub marked: usize,
}

/// POST /v1/conversations
///
/// Returns the caller's active conversation for the route, creating it if
/// needed (201 on create, 200 on reuse).
pub async fn open_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(body): ApiJson<OpenConversationRequest>,
) -> Result<(StatusCode, Json<Conversation>), ApiError> {
    require_role(&user, Role::User)?;
    let (conversation, created) = conversations::get_or_create_conversation(
        &state.db,
        &user.id,
        body.route_type,
        &now_timestamp(),
    )
    .await?;
    let status = if created {
        info!(conversation_id = %conversation.id, user_id = %user.id, "conversation opened");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(conversation)))
}

/// GET /v1/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<ConversationListResponse>, ApiError> {
    require_role(&user, Role::User)?;
    let conversations = conversations::list_conversations_for_user(&state.db, &user.id).await?;
    Ok(Json(ConversationListResponse { conversations }))
}

/// GET /v1/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = load_conversation(&state, &id).await?;
    conversation_participant(&state, &user, &conversation).await?;
    Ok(Json(conversation))
}

/// DELETE /v1/conversations/{id}
///
/// Only unpaid conversations without a handoff may be deleted.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conversation = load_conversation(&state, &id).await?;
    require_owner(&user, &conversation)?;
    conversations::delete_conversation(&state.db, &id).await?;
    info!(conversation_id = %id, "conversation deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/conversations/{id}/human
///
/// Opens the free limited window with a human agent.
pub async fn request_human(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = load_conversation(&state, &id).await?;
    require_owner(&user, &conversation)?;

    let now = chrono::Utc::now();
    let window = chrono::Duration::minutes(i64::from(state.chat.limited_chat_minutes));
    let ends_at = format_timestamp(now + window);
    let conversation =
        conversations::request_limited_human(&state.db, &id, &ends_at, &format_timestamp(now))
            .await?;
    info!(conversation_id = %id, %ends_at, "limited human chat started");
    Ok(Json(conversation))
}

/// POST /v1/conversations/{id}/cancel
pub async fn cancel_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = load_conversation(&state, &id).await?;
    require_owner(&user, &conversation)?;
    let conversation = conversations::cancel_conversation(&state.db, &id, &now_timestamp()).await?;
    Ok(Json(conversation))
}

/// GET /v1/conversations/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let conversation = load_conversation(&state, &id).await?;
    conversation_participant(&state, &user, &conversation).await?;
    let messages = messages::list_messages(&state.db, &id, query.resolve(100, 500)).await?;
    Ok(Json(MessageListResponse { messages }))
}

/// Who a participant speaks as.
fn sender_for(
    participant: Participant,
    requested: Option<SenderType>,
) -> Result<SenderType, LineScoutError> {
    let own = match participant {
        Participant::Owner => SenderType::User,
        Participant::Agent => SenderType::Agent,
        Participant::Admin => SenderType::System,
    };
    match requested {
        None => Ok(own),
        Some(requested) if requested == own => Ok(own),
        Some(SenderType::Ai) if participant == Participant::Admin => Ok(SenderType::Ai),
        Some(requested) => Err(LineScoutError::forbidden(format!(
            "cannot post as {requested}"
        ))),
    }
}

/// POST /v1/conversations/{id}/messages
///
/// Whether the message is accepted depends on the conversation's chat mode.
pub async fn post_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(LineScoutError::validation("message content must not be empty").into());
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(LineScoutError::validation(format!(
            "message content exceeds {MAX_MESSAGE_CHARS} characters"
        ))
        .into());
    }

    let conversation = load_conversation(&state, &id).await?;
    let participant = conversation_participant(&state, &user, &conversation).await?;
    let sender = sender_for(participant, body.sender_type)?;
    let sender_id = (sender != SenderType::Ai).then_some(user.id.as_str());

    let message =
        messages::insert_message(&state.db, &id, sender, sender_id, content, &now_timestamp())
            .await?;

    if sender == SenderType::Agent
        && let Err(e) = state
            .notifier
            .notify(
                &conversation.user_id,
                TargetRole::User,
                "agent_message",
                "New message from your agent",
                content,
            )
            .await
    {
        warn!(conversation_id = %id, error = %e, "failed to notify user of agent message");
    }

    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /v1/conversations/{id}/read
///
/// Marks the other side's messages read.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<ReadReceiptResponse>, ApiError> {
    let conversation = load_conversation(&state, &id).await?;
    let reader = match conversation_participant(&state, &user, &conversation).await? {
        Participant::Owner => SenderType::User,
        Participant::Agent => SenderType::Agent,
        Participant::Admin => {
            return Err(LineScoutError::forbidden("admins do not send read receipts").into());
        }
    };
    let marked = messages::mark_messages_read(&state.db, &id, reader, &now_timestamp()).await?;
    Ok(Json(ReadReceiptResponse { marked }))
}

/// POST /v1/conversations/{id}/payments
///
/// Records a paid-chat payment and unlocks paid human chat.
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ChatPaymentRequest>,
) -> Result<(StatusCode, Json<ChatPayment>), ApiError> {
    let reference = body.reference.trim();
    if reference.is_empty() {
        return Err(LineScoutError::validation("payment reference must not be empty").into());
    }
    let conversation = load_conversation(&state, &id).await?;
    require_owner(&user, &conversation)?;

    let provider = match body.provider {
        Some(provider) => provider,
        None => {
            resolve_provider(&state.db, &user.id, state.payments.default_provider)
                .await?
                .provider
        }
    };
    let amount = chat_payment_amount(body.amount, state.chat.paid_chat_price)?;

    let payment = chat_payments::record_chat_payment(
        &state.db,
        &id,
        amount,
        provider,
        reference,
        &now_timestamp(),
    )
    .await?;
    info!(conversation_id = %id, %provider, reference, "chat payment recorded");
    Ok((StatusCode::CREATED, Json(payment)))
}

/// The amount to record for a paid-chat payment: the settled amount, which
/// must cover `price`.
fn chat_payment_amount(settled: Option<f64>, price: f64) -> Result<f64, LineScoutError> {
    let Some(amount) = settled else {
        return Ok(price);
    };
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LineScoutError::validation("payment amount must be positive"));
    }
    if amount < price {
        return Err(LineScoutError::validation(format!(
            "payment of {amount} is below the chat price of {price}"
        )));
    }
    Ok(amount)
}

/// POST /v1/conversations/{id}/handoff
///
/// Hands a paid conversation over to the agent pool.
pub async fn open_handoff(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<OpenHandoffRequest>,
) -> Result<(StatusCode, Json<Handoff>), ApiError> {
    let conversation = load_conversation(&state, &id).await?;
    require_owner(&user, &conversation)?;
    let handoff =
        handoffs::create_handoff(&state.db, &id, body.summary.trim(), &now_timestamp()).await?;
    info!(handoff_id = %handoff.id, conversation_id = %id, "handoff opened");
    Ok((StatusCode::CREATED, Json(handoff)))
}
