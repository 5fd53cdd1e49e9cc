// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent commission on product payments.
//!
//! A handoff's commission is credited in instalments: one when it reaches
//! `paid`, then one per product payment confirmed afterwards. Every
//! instalment shares the handoff's reference prefix, so the amount already
//! credited is the sum over that prefix.

/// Reference prefix shared by every commission credit on a handoff.
pub fn commission_prefix(handoff_id: &str) -> String {
    format!("commission:{handoff_id}:")
}

/// Wallet reference of the instalment triggered by `trigger`, such as
/// `status:paid` or `payment:<reference>`.
pub fn commission_reference(handoff_id: &str, trigger: &str) -> String {
    format!("{}{trigger}", commission_prefix(handoff_id))
}

/// The agent's cut of `product_paid`, rounded to two decimals.
///
/// Negative inputs count as zero.
pub fn agent_commission(product_paid: f64, percent: f64) -> f64 {
    round_cents(product_paid.max(0.0) * percent.clamp(0.0, 100.0) / 100.0)
}

/// What remains to be credited when `owed` is due and `credited` was paid out.
pub fn commission_top_up(owed: f64, credited: f64) -> f64 {
    round_cents(owed - credited).max(0.0)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
