// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures for billing tests: a claimed handoff with one quote.

use linescout_core::{PaymentProvider, PaymentPurpose, Quote, Role, RouteType, User};
use linescout_storage::queries::conversations::{get_or_create_conversation, mark_conversation_paid};
use linescout_storage::queries::handoffs::{claim_handoff, create_handoff};
use linescout_storage::queries::quotes::{
    confirm_quote_payment, create_quote, record_quote_payment, NewQuote, NewQuotePayment,
};
use linescout_storage::queries::users::create_user;
use linescout_storage::Database;

pub(crate) const T0: &str = "2026-03-01T00:00:00.000Z";

/// Buyer `u1`, agent `a1`, and a 1000 + 200 quote with a 30% deposit.
pub(crate) async fn quoted_fixture() -> (Database, Quote) {
    let db = Database::open_in_memory().await.unwrap();
    for (id, role) in [("u1", Role::User), ("a1", Role::Agent)] {
        let user = User {
            id: id.into(),
            email: format!("{id}@example.com"),
            display_name: id.into(),
            phone: None,
            role,
            created_at: T0.into(),
        };
        create_user(&db, &user).await.unwrap();
    }
    let (conversation, _) = get_or_create_conversation(&db, "u1", RouteType::WhiteLabel, T0)
        .await
        .unwrap();
    mark_conversation_paid(&db, &conversation.id, T0).await.unwrap();
    let handoff = create_handoff(&db, &conversation.id, "Branded bottles", T0)
        .await
        .unwrap();
    claim_handoff(&db, &handoff.id, "a1", T0).await.unwrap();
    let pricing = NewQuote {
        product_total: 1000.0,
        shipping_total: 200.0,
        deposit_percent: 30.0,
        currency: "NGN".into(),
        notes: None,
    };
    let quote = create_quote(&db, &handoff.id, "a1", pricing, T0).await.unwrap();
    (db, quote)
}

pub(crate) async fn quoted_db() -> (Database, String) {
    let (db, quote) = quoted_fixture().await;
    (db, quote.id)
}

pub(crate) async fn pay(
    db: &Database,
    quote_id: &str,
    purpose: PaymentPurpose,
    amount: f64,
    reference: &str,
) {
    let intent = NewQuotePayment {
        quote_id: quote_id.into(),
        purpose,
        amount,
        provider: PaymentProvider::Paystack,
        reference: reference.into(),
    };
    record_quote_payment(db, intent, T0).await.unwrap();
}

pub(crate) async fn confirm(db: &Database, reference: &str) {
    confirm_quote_payment(db, reference, T0).await.unwrap();
}
