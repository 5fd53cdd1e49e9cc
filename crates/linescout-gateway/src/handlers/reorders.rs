// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repeat orders of delivered projects.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use linescout_core::{now_timestamp, Reorder, Role, TargetRole, User};
use linescout_storage::queries::reorders;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::require_role;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::server::AppState;

/// Request body for POST /v1/reorders.
#[derive(Debug, Deserialize)]
pub struct CreateReorderRequest {
    pub handoff_id: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReorderListResponse {
    pub reorders: Vec<Reorder>,
}

/// GET /v1/reorders
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<ReorderListResponse>, ApiError> {
    require_role(&user, Role::User)?;
    let reorders = reorders::list_reorders_for_user(&state.db, &user.id).await?;
    Ok(Json(ReorderListResponse { reorders }))
}

/// POST /v1/reorders
///
/// Opens a fresh conversation for a delivered handoff and lets the agent who
/// fulfilled it know a repeat order is waiting.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(body): ApiJson<CreateReorderRequest>,
) -> Result<(StatusCode, Json<Reorder>), ApiError> {
    require_role(&user, Role::User)?;
    let note = body.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let reorder =
        reorders::create_reorder(&state.db, &user.id, &body.handoff_id, note, &now_timestamp())
            .await?;
    info!(
        reorder_id = %reorder.id,
        source_handoff_id = %reorder.source_handoff_id,
        "reorder created"
    );

    if let Some(agent_id) = reorder.preferred_agent_id.as_deref() {
        let text = match reorder.note.as_deref() {
            Some(note) => format!("A past buyer wants to reorder: {note}"),
            None => "A past buyer wants to reorder a delivered project".to_string(),
        };
        if let Err(e) = state
            .notifier
            .notify(agent_id, TargetRole::Agent, "reorder_requested", "Reorder requested", &text)
            .await
        {
            warn!(reorder_id = %reorder.id, error = %e, "failed to notify preferred agent");
        }
    }
    Ok((StatusCode::CREATED, Json(reorder)))
}
