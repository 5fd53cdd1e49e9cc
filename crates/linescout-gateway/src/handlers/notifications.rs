// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The caller's notification inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use linescout_core::{now_timestamp, Notification, User};
use linescout_storage::queries::notifications;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::AppState;

/// Query string for GET /v1/notifications.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
    pub marked: usize,
}

/// GET /v1/notifications
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let inbox = user.role.inbox();
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let unread_count = notifications::unread_count(&state.db, &user.id, inbox).await?;
    let items =
        notifications::list_notifications(&state.db, &user.id, inbox, query.unread, limit).await?;
    Ok(Json(NotificationListResponse {
        notifications: items,
        unread_count,
    }))
}

/// POST /v1/notifications/{id}/read
///
/// Someone else's notification reads as not found.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    notifications::mark_notification_read(&state.db, &id, &user.id, &now_timestamp()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<MarkAllResponse>, ApiError> {
    let marked =
        notifications::mark_all_read(&state.db, &user.id, user.role.inbox(), &now_timestamp())
            .await?;
    Ok(Json(MarkAllResponse { marked }))
}
