use super::identity::{AccountId, CustomerId, PaymentId};
use super::money::{Amount, Money};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// State transitions reported to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    ApplicationOpened {
        account_id: AccountId,
        customer_id: CustomerId,
        principal_amount: Money,
    },
    ApplicationApproved {
        account_id: AccountId,
        customer_id: CustomerId,
        due_date: Option<DateTime<Utc>>,
    },
    ApplicationRejected {
        account_id: AccountId,
        customer_id: CustomerId,
        reason: Option<String>,
    },
    PaymentSubmitted {
        payment_id: PaymentId,
        account_id: AccountId,
        customer_id: CustomerId,
        amount: Amount,
    },
    PaymentApproved {
        payment_id: PaymentId,
        account_id: AccountId,
        customer_id: CustomerId,
        amount: Amount,
        total_due: Money,
    },
    PaymentRejected {
        payment_id: PaymentId,
        account_id: AccountId,
        customer_id: CustomerId,
        reason: Option<String>,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::ApplicationOpened { .. } => "application_opened",
            LedgerEvent::ApplicationApproved { .. } => "application_approved",
            LedgerEvent::ApplicationRejected { .. } => "application_rejected",
            LedgerEvent::PaymentSubmitted { .. } => "payment_submitted",
            LedgerEvent::PaymentApproved { .. } => "payment_approved",
            LedgerEvent::PaymentRejected { .. } => "payment_rejected",
        }
    }

    /// The customer to be told about the transition.
    pub fn customer_id(&self) -> &CustomerId {
        match self {
            LedgerEvent::ApplicationOpened { customer_id, .. }
            | LedgerEvent::ApplicationApproved { customer_id, .. }
            | LedgerEvent::ApplicationRejected { customer_id, .. }
            | LedgerEvent::PaymentSubmitted { customer_id, .. }
            | LedgerEvent::PaymentApproved { customer_id, .. }
            | LedgerEvent::PaymentRejected { customer_id, .. } => customer_id,
        }
    }

    pub fn account_id(&self) -> AccountId {
        match self {
            LedgerEvent::ApplicationOpened { account_id, .. }
            | LedgerEvent::ApplicationApproved { account_id, .. }
            | LedgerEvent::ApplicationRejected { account_id, .. }
            | LedgerEvent::PaymentSubmitted { account_id, .. }
            | LedgerEvent::PaymentApproved { account_id, .. }
            | LedgerEvent::PaymentRejected { account_id, .. } => *account_id,
        }
    }
}
