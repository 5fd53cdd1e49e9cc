// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures shared by the query module tests.

use linescout_core::{Handoff, Role, RouteType, User};

use crate::database::Database;
use crate::queries::conversations::{get_or_create_conversation, mark_conversation_paid};
use crate::queries::handoffs::{claim_handoff, create_handoff};
use crate::queries::users::create_user;

pub(crate) const SEED_TIME: &str = "2026-01-01T00:00:00.000Z";

pub(crate) async fn setup_db() -> Database {
    Database::open_in_memory().await.unwrap()
}

pub(crate) fn make_user(id: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        display_name: format!("Test {id}"),
        phone: None,
        role,
        created_at: SEED_TIME.to_string(),
    }
}

/// Database with buyers `u1`/`u2`, agents `a1`/`a2` and admin `admin`.
pub(crate) async fn seeded_db() -> Database {
    let db = setup_db().await;
    for (id, role) in [
        ("u1", Role::User),
        ("u2", Role::User),
        ("a1", Role::Agent),
        ("a2", Role::Agent),
        ("admin", Role::Admin),
    ] {
        create_user(&db, &make_user(id, role)).await.unwrap();
    }
    db
}

/// A pending handoff on a freshly paid white-label conversation of `user_id`.
pub(crate) async fn paid_handoff(db: &Database, user_id: &str) -> Handoff {
    let (conversation, _) =
        get_or_create_conversation(db, user_id, RouteType::WhiteLabel, SEED_TIME)
            .await
            .unwrap();
    mark_conversation_paid(db, &conversation.id, SEED_TIME)
        .await
        .unwrap();
    create_handoff(db, &conversation.id, "Custom packaging run", SEED_TIME)
        .await
        .unwrap()
}

/// [`paid_handoff`] already claimed by `agent_id`.
pub(crate) async fn claimed_handoff(db: &Database, user_id: &str, agent_id: &str) -> Handoff {
    let handoff = paid_handoff(db, user_id).await;
    claim_handoff(db, &handoff.id, agent_id, SEED_TIME)
        .await
        .unwrap()
}
