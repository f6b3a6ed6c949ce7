use super::identity::{AccountId, Actor, CustomerId, TripId};
use super::money::{Amount, Money};
use super::snapshot::AccountSnapshot;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    PendingApproval,
    Approved,
    Rejected,
    Overdue,
    Completed,
}

impl AccountStatus {
    /// Whether the account has been approved at some point and therefore
    /// carries a due date and a repayment history.
    pub fn has_terms(self) -> bool {
        matches!(
            self,
            AccountStatus::Approved | AccountStatus::Overdue | AccountStatus::Completed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::PendingApproval => "pending_approval",
            AccountStatus::Approved => "approved",
            AccountStatus::Rejected => "rejected",
            AccountStatus::Overdue => "overdue",
            AccountStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input from the booking flow when a trip is bought on deferred payment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub customer_id: CustomerId,
    pub trip_id: TripId,
    pub quantity: u32,
    pub unit_price: Amount,
}

/// One deferred-payment agreement tied to one trip purchase.
///
/// `principal_paid` and `status` are a denormalized cache of the last computed
/// [`AccountSnapshot`]. They are handy for listings but decisions are always
/// taken on a freshly derived snapshot.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GnplAccount {
    pub id: AccountId,
    pub customer_id: CustomerId,
    pub trip_id: TripId,
    /// Number of tickets covered.
    pub quantity: u32,
    /// Ticket price times quantity, fixed at creation.
    pub principal_amount: Money,
    pub principal_paid: Money,
    pub status: AccountStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub reviewed_by: Option<Actor>,
    pub rejection_reason: Option<String>,
    /// Optimistic concurrency token, bumped by the store on every conditional write.
    pub version: u64,
}

impl GnplAccount {
    /// Opens a new application in `pending_approval`.
    pub fn open(request: NewAccount, now: DateTime<Utc>) -> Result<Self> {
        if request.quantity == 0 {
            return Err(LedgerError::ValidationError(
                "quantity must be at least 1".to_string(),
            ));
        }
        let principal = request
            .unit_price
            .value()
            .checked_mul(Decimal::from(request.quantity))
            .ok_or_else(|| {
                LedgerError::ValidationError("principal amount out of range".to_string())
            })?;

        Ok(Self {
            id: AccountId::new(),
            customer_id: request.customer_id,
            trip_id: request.trip_id,
            quantity: request.quantity,
            principal_amount: Money::new(principal).round_to_minor_unit(),
            principal_paid: Money::ZERO,
            status: AccountStatus::PendingApproval,
            approved_at: None,
            due_date: None,
            created_at: now,
            reviewed_by: None,
            rejection_reason: None,
            version: 0,
        })
    }

    /// Copies the derived balance and status into the stored cache fields.
    pub fn record_snapshot(&mut self, snapshot: &AccountSnapshot) {
        if self.status.has_terms() {
            self.status = snapshot.status;
            self.principal_paid = snapshot.principal_paid;
        }
    }
}
