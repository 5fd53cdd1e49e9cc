// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers, grouped by resource.
//!
//! Handlers authorize the caller here, then delegate state checks to storage,
//! which applies them atomically with the write.

pub mod conversations;
pub mod handoffs;
pub mod health;
pub mod notifications;
pub mod providers;
pub mod quotes;
pub mod reorders;
pub mod wallet;

use linescout_core::{ChatMode, Conversation, Handoff, LineScoutError, Role, User};
use linescout_storage::queries;
use serde::Deserialize;

use crate::server::AppState;

/// How the caller relates to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Participant {
    Owner,
    Agent,
    Admin,
}

pub(crate) fn require_role(user: &User, role: Role) -> Result<(), LineScoutError> {
    if user.role == role {
        Ok(())
    } else {
        Err(LineScoutError::forbidden(format!("requires the {role} role")))
    }
}

pub(crate) fn require_admin(user: &User) -> Result<(), LineScoutError> {
    require_role(user, Role::Admin)
}

pub(crate) async fn load_conversation(
    state: &AppState,
    id: &str,
) -> Result<Conversation, LineScoutError> {
    queries::conversations::get_conversation(&state.db, id)
        .await?
        .ok_or_else(|| LineScoutError::not_found("conversation", id))
}

pub(crate) async fn load_handoff(state: &AppState, id: &str) -> Result<Handoff, LineScoutError> {
    queries::handoffs::get_handoff(&state.db, id)
        .await?
        .ok_or_else(|| LineScoutError::not_found("handoff", id))
}

/// Resolve the caller's role in a conversation.
///
/// Once a handoff exists only its assigned agent takes part. Before that, any
/// agent may join a conversation that has left AI-only mode.
pub(crate) async fn conversation_participant(
    state: &AppState,
    user: &User,
    conversation: &Conversation,
) -> Result<Participant, LineScoutError> {
    if conversation.user_id == user.id {
        return Ok(Participant::Owner);
    }
    match user.role {
        Role::Admin => Ok(Participant::Admin),
        Role::Agent => {
            let allowed = match &conversation.handoff_id {
                Some(handoff_id) => {
                    let handoff = load_handoff(state, handoff_id).await?;
                    handoff.agent_id.as_deref() == Some(user.id.as_str())
                }
                None => conversation.chat_mode != ChatMode::AiOnly,
            };
            if allowed {
                Ok(Participant::Agent)
            } else {
                Err(LineScoutError::forbidden("not assigned to this conversation"))
            }
        }
        Role::User => Err(LineScoutError::forbidden("not your conversation")),
    }
}

/// Owner-only access to a conversation.
pub(crate) fn require_owner(
    user: &User,
    conversation: &Conversation,
) -> Result<(), LineScoutError> {
    if conversation.user_id == user.id {
        Ok(())
    } else {
        Err(LineScoutError::forbidden("only the conversation owner can do this"))
    }
}

/// Buyer, assigned agent or admin.
pub(crate) fn require_handoff_participant(
    user: &User,
    handoff: &Handoff,
) -> Result<(), LineScoutError> {
    let is_agent = handoff.agent_id.as_deref() == Some(user.id.as_str());
    if handoff.user_id == user.id || is_agent || user.is_admin() {
        Ok(())
    } else {
        Err(LineScoutError::forbidden("not a participant of this handoff"))
    }
}

/// `?limit=` query shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LimitQuery {
    pub(crate) fn resolve(&self, default: usize, max: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, max)
    }
}
