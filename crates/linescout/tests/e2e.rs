// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end API tests over the full router.
//!
//! Each test creates an isolated TestHarness with a temp SQLite database,
//! seeded principals and a mock messenger. Tests are order-insensitive.

use axum::http::{Method, StatusCode};
use linescout_test_utils::{TestHarness, TestPrincipal};
use serde_json::{json, Value};

// ---- helpers ----

async fn open_conversation(h: &TestHarness, who: &TestPrincipal, route: &str) -> Value {
    let resp = h
        .post("/v1/conversations", who, json!({ "route_type": route }))
        .await;
    assert!(resp.status.is_success(), "open failed: {:?}", resp.body);
    resp.body
}

/// A paid machine-sourcing conversation owned by `u1`, with a pending handoff.
async fn pending_handoff(h: &TestHarness) -> (String, String) {
    let conversation = open_conversation(h, &h.user, "machine_sourcing").await;
    let conversation_id = conversation["id"].as_str().unwrap().to_string();

    let paid = h
        .post(
            &format!("/v1/conversations/{conversation_id}/payments"),
            &h.user,
            json!({ "reference": format!("chat-{conversation_id}") }),
        )
        .await;
    assert_eq!(paid.status, StatusCode::CREATED, "{:?}", paid.body);

    let handoff = h
        .post(
            &format!("/v1/conversations/{conversation_id}/handoff"),
            &h.user,
            json!({ "summary": "500 branded tote bags" }),
        )
        .await;
    assert_eq!(handoff.status, StatusCode::CREATED, "{:?}", handoff.body);
    (conversation_id, handoff.str("id").to_string())
}

/// As [`pending_handoff`], claimed by `a1`.
async fn claimed_handoff(h: &TestHarness) -> (String, String) {
    let (conversation_id, handoff_id) = pending_handoff(h).await;
    let resp = h
        .post_empty(&format!("/v1/handoffs/{handoff_id}/claim"), &h.agent)
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{:?}", resp.body);
    (conversation_id, handoff_id)
}

/// 100 000 products + 20 000 shipping, 30% deposit.
async fn create_quote(h: &TestHarness, handoff_id: &str) -> String {
    let resp = h
        .post(
            &format!("/v1/handoffs/{handoff_id}/quotes"),
            &h.agent,
            json!({
                "product_total": 100000.0,
                "shipping_total": 20000.0,
                "deposit_percent": 30.0,
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.body);
    resp.str("id").to_string()
}

async fn pay_and_confirm(
    h: &TestHarness,
    quote_id: &str,
    purpose: &str,
    amount: f64,
    reference: &str,
) {
    let resp = h
        .post(
            &format!("/v1/quotes/{quote_id}/payments"),
            &h.user,
            json!({ "purpose": purpose, "amount": amount, "reference": reference }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.body);
    let resp = h
        .post("/v1/payments/confirm", &h.admin, json!({ "reference": reference }))
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{:?}", resp.body);
}

async fn set_status(
    h: &TestHarness,
    who: &TestPrincipal,
    handoff_id: &str,
    status: &str,
) -> StatusCode {
    h.post(
        &format!("/v1/handoffs/{handoff_id}/status"),
        who,
        json!({ "status": status }),
    )
    .await
    .status
}

fn kinds(body: &Value) -> Vec<String> {
    body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap().to_string())
        .collect()
}

// ---- authentication and authorization ----

#[tokio::test]
async fn missing_or_unknown_token_is_unauthorized() {
    let h = TestHarness::new().await.unwrap();

    let resp = h.request(Method::GET, "/v1/conversations", None, None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body, json!({ "error": "unauthorized" }));

    let resp = h
        .request(Method::GET, "/v1/conversations", Some("not-a-token"), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = h.request(Method::GET, "/health", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn routes_enforce_roles() {
    let h = TestHarness::new().await.unwrap();

    let resp = h
        .post("/v1/conversations", &h.agent, json!({ "route_type": "white_label" }))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    assert_eq!(h.get("/v1/handoffs/pending", &h.user).await.status, StatusCode::FORBIDDEN);
    assert_eq!(h.get("/v1/reorders", &h.agent).await.status, StatusCode::FORBIDDEN);

    let resp = h
        .post("/v1/payments/confirm", &h.user, json!({ "reference": "x" }))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = h
        .put("/v1/admin/payment-provider", &h.agent, json!({ "provider": "paypal" }))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn conversations_are_private_to_participants() {
    let h = TestHarness::new().await.unwrap();
    let conversation = open_conversation(&h, &h.user, "machine_sourcing").await;
    let path = format!("/v1/conversations/{}", conversation["id"].as_str().unwrap());

    assert_eq!(h.get(&path, &h.user).await.status, StatusCode::OK);
    assert_eq!(h.get(&path, &h.admin).await.status, StatusCode::OK);
    assert_eq!(h.get(&path, &h.other_user).await.status, StatusCode::FORBIDDEN);
    // AI-only chats are not open to agents.
    assert_eq!(h.get(&path, &h.agent).await.status, StatusCode::FORBIDDEN);
    assert_eq!(
        h.get("/v1/conversations/missing", &h.user).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn only_the_assigned_agent_sees_a_claimed_conversation() {
    let h = TestHarness::new().await.unwrap();
    let (conversation_id, _) = claimed_handoff(&h).await;
    let path = format!("/v1/conversations/{conversation_id}/messages");

    assert_eq!(h.get(&path, &h.agent).await.status, StatusCode::OK);
    assert_eq!(h.get(&path, &h.other_agent).await.status, StatusCode::FORBIDDEN);
}

// ---- validation ----

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
    let h = TestHarness::new().await.unwrap();

    let resp = h
        .post("/v1/conversations", &h.user, json!({ "route_type": "spaceship" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body["error"].is_string());

    let resp = h.post("/v1/conversations", &h.user, json!("oops")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let conversation = open_conversation(&h, &h.user, "white_label").await;
    let id = conversation["id"].as_str().unwrap();
    let resp = h
        .post(
            &format!("/v1/conversations/{id}/messages"),
            &h.user,
            json!({ "content": "   " }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = h
        .post(
            &format!("/v1/conversations/{id}/payments"),
            &h.user,
            json!({ "reference": "r1", "amount": -5.0 }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

// ---- conversations ----

#[tokio::test]
async fn open_conversation_is_get_or_create() {
    let h = TestHarness::new().await.unwrap();

    let first = h
        .post("/v1/conversations", &h.user, json!({ "route_type": "machine_sourcing" }))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.str("chat_mode"), "ai_only");
    assert_eq!(first.str("payment_status"), "unpaid");

    let again = h
        .post("/v1/conversations", &h.user, json!({ "route_type": "machine_sourcing" }))
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.str("id"), first.str("id"));

    let other_route = open_conversation(&h, &h.user, "white_label").await;
    assert_ne!(other_route["id"], first.body["id"]);

    let list = h.get("/v1/conversations", &h.user).await;
    assert_eq!(list.body["conversations"].as_array().unwrap().len(), 2);
    let list = h.get("/v1/conversations", &h.other_user).await;
    assert!(list.body["conversations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn only_unpaid_unlinked_conversations_can_be_deleted() {
    let h = TestHarness::new().await.unwrap();

    let conversation = open_conversation(&h, &h.other_user, "white_label").await;
    let path = format!("/v1/conversations/{}", conversation["id"].as_str().unwrap());
    assert_eq!(h.delete(&path, &h.user).await.status, StatusCode::FORBIDDEN);
    assert_eq!(h.delete(&path, &h.other_user).await.status, StatusCode::NO_CONTENT);
    assert_eq!(h.get(&path, &h.other_user).await.status, StatusCode::NOT_FOUND);

    let (paid_id, _) = pending_handoff(&h).await;
    let resp = h.delete(&format!("/v1/conversations/{paid_id}"), &h.user).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn limited_human_chat_lifecycle() {
    let h = TestHarness::new().await.unwrap();
    let conversation = open_conversation(&h, &h.other_user, "white_label").await;
    let id = conversation["id"].as_str().unwrap().to_string();
    let messages = format!("/v1/conversations/{id}/messages");
    let read = format!("/v1/conversations/{id}/read");

    // The assistant may answer before any human is involved.
    let resp = h
        .post(
            &messages,
            &h.admin,
            json!({ "content": "Hi, what do you need?", "sender_type": "ai" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.str("sender_type"), "ai");

    let human = format!("/v1/conversations/{id}/human");
    let resp = h.post_empty(&human, &h.other_user).await;
    assert_eq!(resp.status, StatusCode::OK, "{:?}", resp.body);
    assert_eq!(resp.str("chat_mode"), "limited_human");
    assert!(resp.body["limited_ends_at"].is_string());

    // A second request is refused; the window is already open.
    let resp = h.post_empty(&human, &h.other_user).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let resp = h.post(&messages, &h.agent, json!({ "content": "Hello, I can help." })).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.str("sender_type"), "agent");

    let resp = h
        .post(&messages, &h.admin, json!({ "content": "late reply", "sender_type": "ai" }))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "assistant is silenced after takeover");

    let resp = h.post_empty(&read, &h.other_user).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["marked"], json!(2));

    let cancel = format!("/v1/conversations/{id}/cancel");
    let resp = h.post_empty(&cancel, &h.other_user).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.str("project_status"), "cancelled");

    let resp = h.post(&messages, &h.agent, json!({ "content": "still there?" })).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    let resp = h.post(&messages, &h.other_user, json!({ "content": "bye" })).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(h.post_empty(&read, &h.other_user).await.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn posting_as_someone_else_is_forbidden() {
    let h = TestHarness::new().await.unwrap();
    let conversation = open_conversation(&h, &h.user, "white_label").await;
    let id = conversation["id"].as_str().unwrap();
    let messages = format!("/v1/conversations/{id}/messages");

    let resp = h
        .post(&messages, &h.user, json!({ "content": "hi", "sender_type": "agent" }))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = h.post(&messages, &h.user, json!({ "content": "hi" })).await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let list = h.get(&messages, &h.user).await;
    assert_eq!(list.body["messages"].as_array().unwrap().len(), 1);
}

// ---- chat payments and handoffs ----

#[tokio::test]
async fn chat_payment_is_idempotent_and_unlocks_paid_chat() {
    let h = TestHarness::new().await.unwrap();
    let conversation = open_conversation(&h, &h.user, "machine_sourcing").await;
    let id = conversation["id"].as_str().unwrap().to_string();
    let path = format!("/v1/conversations/{id}/payments");

    let resp = h
        .post(
            &format!("/v1/conversations/{id}/handoff"),
            &h.user,
            json!({ "summary": "bags" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "unpaid conversations cannot hand off");

    let first = h.post(&path, &h.user, json!({ "reference": "ps_chat_1" })).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["amount"], json!(h.config.chat.paid_chat_price));
    assert_eq!(first.str("provider"), "paystack");

    let replay = h.post(&path, &h.user, json!({ "reference": "ps_chat_1" })).await;
    assert_eq!(replay.status, StatusCode::CREATED);
    assert_eq!(replay.str("id"), first.str("id"));

    let conversation = h.get(&format!("/v1/conversations/{id}"), &h.user).await;
    assert_eq!(conversation.str("payment_status"), "paid");
    assert_eq!(conversation.str("chat_mode"), "paid_human");

    let other = open_conversation(&h, &h.user, "white_label").await;
    let resp = h
        .post(
            &format!("/v1/conversations/{}/payments", other["id"].as_str().unwrap()),
            &h.user,
            json!({ "reference": "ps_chat_1" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "reference belongs to another conversation");
}

#[tokio::test]
async fn chat_payment_below_the_price_is_rejected() {
    let h = TestHarness::new().await.unwrap();
    let conversation = open_conversation(&h, &h.user, "white_label").await;
    let id = conversation["id"].as_str().unwrap().to_string();
    let path = format!("/v1/conversations/{id}/payments");

    let resp = h
        .post(&path, &h.user, json!({ "reference": "cheap", "amount": 0.01 }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{:?}", resp.body);

    let conversation = h.get(&format!("/v1/conversations/{id}"), &h.user).await;
    assert_eq!(conversation.str("payment_status"), "unpaid");
    assert_eq!(conversation.str("chat_mode"), "ai_only");

    let price = h.config.chat.paid_chat_price;
    let resp = h
        .post(&path, &h.user, json!({ "reference": "full", "amount": price }))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.body);
    let conversation = h.get(&format!("/v1/conversations/{id}"), &h.user).await;
    assert_eq!(conversation.str("payment_status"), "paid");
}

#[tokio::test]
async fn second_claim_conflicts() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = pending_handoff(&h).await;

    let pending = h.get("/v1/handoffs/pending", &h.agent).await;
    assert_eq!(pending.body["handoffs"].as_array().unwrap().len(), 1);

    let claim = format!("/v1/handoffs/{handoff_id}/claim");
    let resp = h.post_empty(&claim, &h.agent).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.str("agent_id"), "a1");
    assert_eq!(resp.str("status"), "claimed");

    let resp = h.post_empty(&claim, &h.other_agent).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    let resp = h.post_empty("/v1/handoffs/missing/claim", &h.other_agent).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let pending = h.get("/v1/handoffs/pending", &h.agent).await;
    assert!(pending.body["handoffs"].as_array().unwrap().is_empty());
    let mine = h.get("/v1/handoffs/mine", &h.agent).await;
    assert_eq!(mine.body["handoffs"].as_array().unwrap().len(), 1);
    let theirs = h.get("/v1/handoffs/mine", &h.other_agent).await;
    assert!(theirs.body["handoffs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_claims_have_one_winner() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = pending_handoff(&h).await;
    let claim = format!("/v1/handoffs/{handoff_id}/claim");

    let (a, b) = tokio::join!(
        h.post_empty(&claim, &h.agent),
        h.post_empty(&claim, &h.other_agent)
    );
    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn claim_notifies_the_buyer() {
    let h = TestHarness::new().await.unwrap();
    let (conversation_id, _) = claimed_handoff(&h).await;

    let inbox = h.get("/v1/notifications", &h.user).await;
    assert_eq!(kinds(&inbox.body), vec!["handoff_claimed"]);
    assert_eq!(inbox.body["unread_count"], json!(1));

    assert_eq!(h.messenger.emails_to("u1@example.com").await.len(), 1);
    assert_eq!(h.messenger.sent_sms().await.len(), 1);

    let resp = h
        .post(
            &format!("/v1/conversations/{conversation_id}/messages"),
            &h.agent,
            json!({ "content": "Found three factories." }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let inbox = h.get("/v1/notifications?unread=true", &h.user).await;
    assert_eq!(kinds(&inbox.body), vec!["agent_message", "handoff_claimed"]);

    let read = h
        .post_empty(&format!("/v1/conversations/{conversation_id}/read"), &h.user)
        .await;
    assert_eq!(read.body["marked"], json!(1));
}

#[tokio::test]
async fn handoff_status_moves_forward_only() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = claimed_handoff(&h).await;

    let (a1, a2, admin) = (&h.agent, &h.other_agent, &h.admin);
    let cases = [
        (a2, "manufacturer_found", StatusCode::FORBIDDEN),
        (a1, "paid", StatusCode::CONFLICT),
        (a1, "claimed", StatusCode::BAD_REQUEST),
        (a1, "lost", StatusCode::BAD_REQUEST),
        (a1, "manufacturer_found", StatusCode::OK),
        (admin, "cancelled", StatusCode::OK),
        (a1, "paid", StatusCode::CONFLICT),
    ];
    for (who, status, expected) in cases {
        assert_eq!(
            set_status(&h, who, &handoff_id, status).await,
            expected,
            "{} -> {status}",
            who.id()
        );
    }
}

// ---- quotes and payments ----

#[tokio::test]
async fn quotes_are_issued_by_the_assigned_agent() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = claimed_handoff(&h).await;
    let path = format!("/v1/handoffs/{handoff_id}/quotes");

    let resp = h
        .post(&path, &h.other_agent, json!({ "product_total": 10.0, "deposit_percent": 50.0 }))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = h
        .post(&path, &h.agent, json!({ "product_total": 10.0, "deposit_percent": 150.0 }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let quote_id = create_quote(&h, &handoff_id).await;
    let list = h.get(&path, &h.user).await;
    assert_eq!(list.body["quotes"][0]["id"], json!(quote_id));
    assert_eq!(list.body["quotes"][0]["currency"], json!(h.config.chat.currency));
    assert_eq!(h.get(&path, &h.other_user).await.status, StatusCode::FORBIDDEN);

    let inbox = h.get("/v1/notifications", &h.user).await;
    assert!(kinds(&inbox.body).contains(&"quote_created".to_string()));
}

#[tokio::test]
async fn quote_payments_sum_by_purpose() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = claimed_handoff(&h).await;
    let quote_id = create_quote(&h, &handoff_id).await;
    let summary_path = format!("/v1/quotes/{quote_id}/summary");

    let summary = h.get(&summary_path, &h.user).await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["deposit_due"], json!(30000.0));
    assert_eq!(summary.body["total_paid"], json!(0.0));

    // An unconfirmed intent does not count.
    let resp = h
        .post(
            &format!("/v1/quotes/{quote_id}/payments"),
            &h.user,
            json!({ "purpose": "deposit", "amount": 30000.0, "reference": "ps_dep" }),
        )
        .await;
    assert_eq!(resp.str("status"), "unpaid");
    assert_eq!(h.get(&summary_path, &h.user).await.body["deposit_paid"], json!(0.0));

    pay_and_confirm(&h, &quote_id, "deposit", 30000.0, "ps_dep").await;
    let summary = h.get(&summary_path, &h.agent).await;
    assert_eq!(summary.body["deposit_paid"], json!(30000.0));
    assert_eq!(summary.body["deposit_outstanding"], json!(0.0));
    assert_eq!(summary.body["product_outstanding"], json!(70000.0));
    assert_eq!(summary.body["fully_paid"], json!(false));

    pay_and_confirm(&h, &quote_id, "product_balance", 70000.0, "ps_bal").await;
    pay_and_confirm(&h, &quote_id, "shipping", 20000.0, "ps_ship").await;
    let summary = h.get(&summary_path, &h.user).await;
    assert_eq!(summary.body["total_paid"], json!(120000.0));
    assert_eq!(summary.body["shipping_outstanding"], json!(0.0));
    assert_eq!(summary.body["fully_paid"], json!(true));

    assert_eq!(h.get(&summary_path, &h.other_user).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn payment_confirmation_is_idempotent() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = claimed_handoff(&h).await;
    let quote_id = create_quote(&h, &handoff_id).await;
    let pay_path = format!("/v1/quotes/{quote_id}/payments");
    let body = json!({ "purpose": "deposit", "amount": 30000.0, "reference": "ps_once" });

    let first = h.post(&pay_path, &h.user, body.clone()).await;
    let replay = h.post(&pay_path, &h.user, body).await;
    assert_eq!(first.str("id"), replay.str("id"));

    let resp = h
        .post(
            &pay_path,
            &h.user,
            json!({ "purpose": "shipping", "amount": 1.0, "reference": "ps_once" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "reference reused for another purpose");
    let resp = h
        .post(
            &pay_path,
            &h.other_user,
            json!({ "purpose": "deposit", "amount": 1.0, "reference": "ps_other" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let confirm = json!({ "reference": "ps_once" });
    let first = h.post("/v1/payments/confirm", &h.admin, confirm.clone()).await;
    assert_eq!(first.body["newly_paid"], json!(true));
    assert_eq!(first.body["payment"]["status"], json!("paid"));
    let again = h.post("/v1/payments/confirm", &h.admin, confirm).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["newly_paid"], json!(false));

    let inbox = h.get("/v1/notifications", &h.agent).await;
    let confirmations = kinds(&inbox.body)
        .into_iter()
        .filter(|k| k == "payment_confirmed")
        .count();
    assert_eq!(confirmations, 1, "only the first confirmation notifies");

    let resp = h
        .post("/v1/payments/confirm", &h.admin, json!({ "reference": "nope" }))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancelled_handoff_cancels_its_quotes() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = claimed_handoff(&h).await;
    let quote_id = create_quote(&h, &handoff_id).await;

    assert_eq!(set_status(&h, &h.agent, &handoff_id, "cancelled").await, StatusCode::OK);

    let list = h.get(&format!("/v1/handoffs/{handoff_id}/quotes"), &h.user).await;
    assert_eq!(list.body["quotes"][0]["status"], json!("cancelled"));
    let resp = h
        .post(
            &format!("/v1/quotes/{quote_id}/payments"),
            &h.user,
            json!({ "purpose": "deposit", "amount": 30000.0, "reference": "late" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn payment_on_cancelled_quote_is_not_confirmed() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = claimed_handoff(&h).await;
    let quote_id = create_quote(&h, &handoff_id).await;
    let resp = h
        .post(
            &format!("/v1/quotes/{quote_id}/payments"),
            &h.user,
            json!({ "purpose": "deposit", "amount": 30000.0, "reference": "pre_cancel" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(set_status(&h, &h.agent, &handoff_id, "cancelled").await, StatusCode::OK);

    let resp = h
        .post("/v1/payments/confirm", &h.admin, json!({ "reference": "pre_cancel" }))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "{:?}", resp.body);

    let summary = h.get(&format!("/v1/quotes/{quote_id}/summary"), &h.user).await;
    assert_eq!(summary.body["deposit_paid"], json!(0.0));
}

// ---- wallet and payouts ----

/// Drive a handoff to `paid` with the full product value confirmed.
async fn commissioned_agent(h: &TestHarness) -> String {
    let (_, handoff_id) = claimed_handoff(h).await;
    let quote_id = create_quote(h, &handoff_id).await;
    pay_and_confirm(h, &quote_id, "deposit", 30000.0, "c_dep").await;
    pay_and_confirm(h, &quote_id, "product_balance", 70000.0, "c_bal").await;
    for status in ["manufacturer_found", "paid"] {
        assert_eq!(set_status(h, &h.agent, &handoff_id, status).await, StatusCode::OK);
    }
    handoff_id
}

#[tokio::test]
async fn paid_handoff_credits_agent_commission() {
    let h = TestHarness::new().await.unwrap();
    commissioned_agent(&h).await;

    let wallet = h.get("/v1/wallet", &h.agent).await;
    assert_eq!(wallet.status, StatusCode::OK);
    assert_eq!(wallet.body["balance"]["credits"], json!(5000.0));
    assert_eq!(wallet.body["balance"]["available"], json!(5000.0));
    assert_eq!(wallet.body["transactions"].as_array().unwrap().len(), 1);

    let buyer = h.get("/v1/wallet", &h.user).await;
    assert_eq!(buyer.body["balance"]["available"], json!(0.0));
}

#[tokio::test]
async fn payments_confirmed_after_paid_earn_commission() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = claimed_handoff(&h).await;
    let quote_id = create_quote(&h, &handoff_id).await;
    pay_and_confirm(&h, &quote_id, "deposit", 30000.0, "early_dep").await;
    for status in ["manufacturer_found", "paid"] {
        assert_eq!(set_status(&h, &h.agent, &handoff_id, status).await, StatusCode::OK);
    }
    let wallet = h.get("/v1/wallet", &h.agent).await;
    assert_eq!(wallet.body["balance"]["credits"], json!(1500.0));

    pay_and_confirm(&h, &quote_id, "product_balance", 70000.0, "late_bal").await;
    pay_and_confirm(&h, &quote_id, "shipping", 20000.0, "late_ship").await;
    for status in ["shipped", "delivered"] {
        assert_eq!(set_status(&h, &h.agent, &handoff_id, status).await, StatusCode::OK);
    }

    let wallet = h.get("/v1/wallet", &h.agent).await;
    assert_eq!(wallet.body["balance"]["credits"], json!(5000.0), "5% of 100 000");
    assert_eq!(wallet.body["transactions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn paid_before_any_payment_is_credited_on_confirmation() {
    let h = TestHarness::new().await.unwrap();
    let (_, handoff_id) = claimed_handoff(&h).await;
    let quote_id = create_quote(&h, &handoff_id).await;
    for status in ["manufacturer_found", "paid"] {
        assert_eq!(set_status(&h, &h.agent, &handoff_id, status).await, StatusCode::OK);
    }
    let wallet = h.get("/v1/wallet", &h.agent).await;
    assert_eq!(wallet.body["balance"]["credits"], json!(0.0));

    pay_and_confirm(&h, &quote_id, "deposit", 30000.0, "after_dep").await;
    let wallet = h.get("/v1/wallet", &h.agent).await;
    assert_eq!(wallet.body["balance"]["credits"], json!(1500.0));
}

#[tokio::test]
async fn payouts_never_exceed_the_balance() {
    let h = TestHarness::new().await.unwrap();
    commissioned_agent(&h).await;
    let details = |amount: f64| {
        json!({
            "amount": amount,
            "bank_name": "First Bank",
            "account_number": "0123456789",
            "account_name": "A1 Sourcing",
        })
    };

    let resp = h.post("/v1/payouts", &h.agent, details(6000.0)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let resp = h.post("/v1/payouts", &h.agent, details(500.0)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST, "below the minimum payout");

    let first = h.post("/v1/payouts", &h.agent, details(2000.0)).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.str("status"), "pending");

    let wallet = h.get("/v1/wallet", &h.agent).await;
    assert_eq!(wallet.body["balance"]["reserved"], json!(2000.0));
    assert_eq!(wallet.body["balance"]["available"], json!(3000.0));

    let resp = h.post("/v1/payouts", &h.agent, details(3500.0)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let mine = h.get("/v1/payouts", &h.agent).await;
    assert_eq!(mine.body["payouts"].as_array().unwrap().len(), 1);
    let theirs = h.get("/v1/payouts", &h.other_agent).await;
    assert!(theirs.body["payouts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_moves_payouts_through_review() {
    let h = TestHarness::new().await.unwrap();
    commissioned_agent(&h).await;
    let payout = h
        .post(
            "/v1/payouts",
            &h.agent,
            json!({
                "amount": 4000.0,
                "bank_name": "First Bank",
                "account_number": "0123456789",
                "account_name": "A1 Sourcing",
            }),
        )
        .await;
    let status_path = format!("/v1/admin/payouts/{}/status", payout.str("id"));

    let resp = h.post(&status_path, &h.agent, json!({ "status": "approved" })).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    let resp = h.post(&status_path, &h.admin, json!({ "status": "paid" })).await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "must be approved first");

    let resp = h.post(&status_path, &h.admin, json!({ "status": "rejected" })).await;
    assert_eq!(resp.status, StatusCode::OK);
    let wallet = h.get("/v1/wallet", &h.agent).await;
    assert_eq!(
        wallet.body["balance"]["available"],
        json!(5000.0),
        "rejection releases funds"
    );

    let inbox = h.get("/v1/notifications", &h.agent).await;
    assert!(kinds(&inbox.body).contains(&"payout_status".to_string()));

    let all = h.get("/v1/payouts", &h.admin).await;
    assert_eq!(all.body["payouts"].as_array().unwrap().len(), 1);
}

// ---- notifications ----

#[tokio::test]
async fn notifications_are_marked_read_by_their_owner() {
    let h = TestHarness::new().await.unwrap();
    claimed_handoff(&h).await;

    let inbox = h.get("/v1/notifications", &h.user).await;
    let id = inbox.body["notifications"][0]["id"].as_str().unwrap().to_string();
    let path = format!("/v1/notifications/{id}/read");

    assert_eq!(h.post_empty(&path, &h.other_user).await.status, StatusCode::NOT_FOUND);
    assert_eq!(h.post_empty(&path, &h.user).await.status, StatusCode::NO_CONTENT);

    let inbox = h.get("/v1/notifications?unread=true", &h.user).await;
    assert!(inbox.body["notifications"].as_array().unwrap().is_empty());
    assert_eq!(inbox.body["unread_count"], json!(0));

    let resp = h.post_empty("/v1/notifications/read-all", &h.user).await;
    assert_eq!(resp.body["marked"], json!(0));
}

#[tokio::test]
async fn delivery_failures_do_not_fail_requests() {
    let h = TestHarness::new().await.unwrap();
    h.messenger.set_failing(true);
    claimed_handoff(&h).await;

    assert!(h.messenger.sent_emails().await.is_empty());
    let inbox = h.get("/v1/notifications", &h.user).await;
    assert_eq!(kinds(&inbox.body), vec!["handoff_claimed"]);
}

// ---- payment provider ----

#[tokio::test]
async fn payment_provider_resolves_owner_then_global_then_default() {
    let h = TestHarness::new().await.unwrap();

    let resp = h.get("/v1/payment-provider", &h.user).await;
    assert_eq!(resp.body, json!({ "provider": "paystack", "source": "default" }));

    let resp = h
        .put("/v1/admin/payment-provider", &h.admin, json!({ "provider": "paypal" }))
        .await;
    assert_eq!(resp.body, json!({ "provider": "paypal", "source": "global" }));

    let resp = h
        .put(
            "/v1/admin/payment-provider",
            &h.admin,
            json!({ "provider": "paystack", "owner_id": "u1" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let resp = h
        .put(
            "/v1/admin/payment-provider",
            &h.admin,
            json!({ "provider": "paystack", "owner_id": "ghost" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = h.get("/v1/payment-provider", &h.user).await;
    assert_eq!(resp.body, json!({ "provider": "paystack", "source": "owner" }));
    let resp = h.get("/v1/payment-provider", &h.other_user).await;
    assert_eq!(resp.body, json!({ "provider": "paypal", "source": "global" }));

    let conversation = open_conversation(&h, &h.other_user, "white_label").await;
    let resp = h
        .post(
            &format!("/v1/conversations/{}/payments", conversation["id"].as_str().unwrap()),
            &h.other_user,
            json!({ "reference": "pp_1" }),
        )
        .await;
    assert_eq!(resp.str("provider"), "paypal");
}

// ---- reorders ----

#[tokio::test]
async fn delivered_projects_can_be_reordered() {
    let h = TestHarness::new().await.unwrap();
    let handoff_id = commissioned_agent(&h).await;
    let body = json!({ "handoff_id": handoff_id, "note": "same again, blue" });

    let resp = h.post("/v1/reorders", &h.user, body.clone()).await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "not delivered yet");

    assert_eq!(set_status(&h, &h.agent, &handoff_id, "shipped").await, StatusCode::OK);
    assert_eq!(set_status(&h, &h.agent, &handoff_id, "delivered").await, StatusCode::OK);

    let resp = h.post("/v1/reorders", &h.other_user, body.clone()).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let reorder = h.post("/v1/reorders", &h.user, body).await;
    assert_eq!(reorder.status, StatusCode::CREATED, "{:?}", reorder.body);
    assert_eq!(reorder.str("preferred_agent_id"), "a1");
    assert_eq!(reorder.str("status"), "requested");

    let inbox = h.get("/v1/notifications", &h.agent).await;
    assert_eq!(kinds(&inbox.body)[0], "reorder_requested");
    let other = h.get("/v1/notifications", &h.other_agent).await;
    assert!(kinds(&other.body).is_empty());

    let conversation = h
        .get(&format!("/v1/conversations/{}", reorder.str("conversation_id")), &h.user)
        .await;
    assert_eq!(conversation.str("chat_mode"), "ai_only");
    assert_eq!(conversation.str("title"), "Reorder: 500 branded tote bags");

    let list = h.get("/v1/reorders", &h.user).await;
    assert_eq!(list.body["reorders"].as_array().unwrap().len(), 1);
}
