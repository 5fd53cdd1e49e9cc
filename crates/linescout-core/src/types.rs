// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model shared across storage, billing and the gateway.
//!
//! Enums are stored as snake_case text columns; `Display`/`FromStr` and serde
//! use the same spelling so a value reads identically in SQL, JSON and logs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
        )]
        #[strum(serialize_all = "snake_case")]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }
    };
}

text_enum! {
    /// Account role. Agents fulfil handoffs; admins confirm payments and payouts.
    Role { User, Agent, Admin }
}

text_enum! {
    /// Which sourcing flow a conversation belongs to.
    RouteType { MachineSourcing, WhiteLabel }
}

text_enum! {
    /// Who may answer in a conversation.
    ChatMode {
        /// Only the AI assistant replies.
        AiOnly,
        /// A time-boxed free window with a human agent.
        LimitedHuman,
        /// Paid, unrestricted human chat.
        PaidHuman,
    }
}

text_enum! {
    /// Payment state of a conversation or a quote payment.
    PaymentStatus { Unpaid, Paid }
}

text_enum! {
    ProjectStatus { Active, Cancelled }
}

text_enum! {
    /// Author of a chat message.
    SenderType { User, Agent, Ai, System }
}

text_enum! {
    /// Handoff lifecycle. Forward-only; `Cancelled` is reachable from any
    /// non-terminal state.
    HandoffStatus {
        Pending,
        Claimed,
        ManufacturerFound,
        Paid,
        Shipped,
        Delivered,
        Cancelled,
    }
}

text_enum! {
    QuoteStatus { Sent, Accepted, Cancelled }
}

text_enum! {
    /// What a quote payment is for.
    PaymentPurpose { Deposit, ProductBalance, Shipping }
}

text_enum! {
    /// Which inbox a notification lands in.
    TargetRole { User, Agent }
}

text_enum! {
    TransactionKind { Credit, Debit }
}

text_enum! {
    PayoutStatus { Pending, Approved, Paid, Rejected }
}

text_enum! {
    /// Payment gateway used to collect money from buyers.
    PaymentProvider { Paystack, Paypal }
}

text_enum! {
    ReorderStatus { Requested, Assigned, Closed }
}

impl HandoffStatus {
    /// The next state in the forward lifecycle, if any.
    pub fn successor(self) -> Option<HandoffStatus> {
        match self {
            Self::Pending => Some(Self::Claimed),
            Self::Claimed => Some(Self::ManufacturerFound),
            Self::ManufacturerFound => Some(Self::Paid),
            Self::Paid => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether a handoff in this state may move to `next`.
    pub fn can_transition_to(self, next: HandoffStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == Self::Cancelled || self.successor() == Some(next)
    }

    /// Product payments confirmed in this state earn the agent commission.
    pub fn earns_commission(self) -> bool {
        matches!(self, Self::Paid | Self::Shipped | Self::Delivered)
    }
}

impl PaymentPurpose {
    /// Deposit and balance payments pay for goods; shipping does not.
    pub fn is_product(self) -> bool {
        matches!(self, Self::Deposit | Self::ProductBalance)
    }
}

impl PayoutStatus {
    /// Whether funds in this state are reserved against the wallet balance.
    pub fn reserves_funds(self) -> bool {
        !matches!(self, Self::Rejected)
    }

    pub fn can_transition_to(self, next: PayoutStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Paid)
                | (Self::Approved, Self::Rejected)
        )
    }
}

impl Role {
    /// Inbox used for notifications addressed to someone with this role.
    pub fn inbox(self) -> TargetRole {
        match self {
            Self::Agent => TargetRole::Agent,
            Self::User | Self::Admin => TargetRole::User,
        }
    }
}

/// A registered account. Also serves as the authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub route_type: RouteType,
    pub chat_mode: ChatMode,
    pub payment_status: PaymentStatus,
    pub project_status: ProjectStatus,
    pub handoff_id: Option<String>,
    /// End of the free human window; only set in `limited_human` mode.
    pub limited_ends_at: Option<String>,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    /// Unpaid conversations that never reached a handoff may be deleted.
    pub fn is_deletable(&self) -> bool {
        self.payment_status == PaymentStatus::Unpaid && self.handoff_id.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.project_status == ProjectStatus::Active
    }

    /// Whether the limited human window has elapsed at `now`.
    ///
    /// Timestamps share one fixed-width format, so string order is time order.
    pub fn limited_chat_ended(&self, now: &str) -> bool {
        self.chat_mode == ChatMode::LimitedHuman
            && self
                .limited_ends_at
                .as_deref()
                .is_some_and(|ends_at| ends_at <= now)
    }

    /// A limited chat loses read receipts once cancelled or ended.
    pub fn accepts_read_receipts(&self, now: &str) -> bool {
        if self.chat_mode != ChatMode::LimitedHuman {
            return true;
        }
        self.is_active() && !self.limited_chat_ended(now)
    }

    /// Agents may answer in a paid chat, or inside an open limited window.
    pub fn accepts_agent_messages(&self, now: &str) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.chat_mode {
            ChatMode::AiOnly => false,
            ChatMode::LimitedHuman => !self.limited_chat_ended(now),
            ChatMode::PaidHuman => self.payment_status == PaymentStatus::Paid,
        }
    }

    /// Whether a message from `sender` may be posted at `now`.
    ///
    /// Users may write while the project is active; the AI assistant only
    /// answers before a human has taken over; agents follow
    /// [`Conversation::accepts_agent_messages`]. System notes are always allowed.
    pub fn accepts_message_from(&self, sender: SenderType, now: &str) -> bool {
        match sender {
            SenderType::System => true,
            SenderType::User => self.is_active(),
            SenderType::Ai => self.is_active() && self.chat_mode == ChatMode::AiOnly,
            SenderType::Agent => self.accepts_agent_messages(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_type: SenderType,
    pub sender_id: Option<String>,
    pub content: String,
    pub created_at: String,
    pub read_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub agent_id: Option<String>,
    pub status: HandoffStatus,
    pub summary: String,
    pub claimed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub handoff_id: String,
    pub agent_id: String,
    pub product_total: f64,
    pub shipping_total: f64,
    pub deposit_percent: f64,
    pub currency: String,
    pub notes: Option<String>,
    pub status: QuoteStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePayment {
    pub id: String,
    pub quote_id: String,
    pub purpose: PaymentPurpose,
    pub amount: f64,
    pub status: PaymentStatus,
    pub provider: PaymentProvider,
    pub reference: String,
    pub paid_at: Option<String>,
    pub created_at: String,
}

/// A payment unlocking paid human chat on a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPayment {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub amount: f64,
    pub provider: PaymentProvider,
    pub reference: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub target_id: String,
    pub target_role: TargetRole,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub read_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: String,
    pub owner_id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    /// Idempotency key; a second insert with the same reference is ignored.
    pub reference: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub id: String,
    pub owner_id: String,
    pub amount: f64,
    pub status: PayoutStatus,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reorder {
    pub id: String,
    pub user_id: String,
    pub source_handoff_id: String,
    /// Conversation opened for the repeat order.
    pub conversation_id: String,
    pub preferred_agent_id: Option<String>,
    pub note: Option<String>,
    pub status: ReorderStatus,
    pub created_at: String,
}
