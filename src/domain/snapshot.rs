//! Read-side derivation of an account's balances.
//!
//! Nothing derived here is ever persisted as authoritative state: penalties,
//! overdue days and the effective status are recomputed on every read from the
//! stored account, its payment history, the current configuration and an
//! explicit `now`.

use super::account::{AccountStatus, GnplAccount};
use super::identity::{AccountId, CustomerId};
use super::money::Money;
use super::payment::GnplPayment;
use super::penalty::accrue_penalty;
use super::settings::PenaltyConfiguration;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A fully-derived, point-in-time view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    pub account_id: AccountId,
    pub customer_id: CustomerId,
    pub status: AccountStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub overdue_days: i64,
    pub principal_amount: Money,
    pub principal_paid: Money,
    pub principal_outstanding: Money,
    pub penalty_accrued: Money,
    pub penalty_paid: Money,
    pub penalty_outstanding: Money,
    pub total_due: Money,
    pub as_of: DateTime<Utc>,
}

impl AccountSnapshot {
    /// Whether a repayment may be submitted or approved against the account.
    pub fn accepts_payments(&self) -> bool {
        matches!(self.status, AccountStatus::Approved | AccountStatus::Overdue)
            && self.total_due > Money::ZERO
    }
}

/// Whole days elapsed past `due_date` at `at`, never negative.
pub fn overdue_days(due_date: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (at - due_date).num_days().max(0)
}

/// Derives the snapshot of `account` at `now`.
///
/// Approved payments submitted up to `now` are allocated oldest first, each
/// settling the penalty outstanding at the moment it was submitted before
/// reducing principal. Payments submitted after `now` are not yet part of the
/// history.
pub fn compute_snapshot(
    account: &GnplAccount,
    payments: &[GnplPayment],
    now: DateTime<Utc>,
    config: &PenaltyConfiguration,
) -> AccountSnapshot {
    if !account.status.has_terms() {
        return AccountSnapshot {
            account_id: account.id,
            customer_id: account.customer_id.clone(),
            status: account.status,
            due_date: None,
            overdue_days: 0,
            principal_amount: account.principal_amount,
            principal_paid: Money::ZERO,
            principal_outstanding: account.principal_amount,
            penalty_accrued: Money::ZERO,
            penalty_paid: Money::ZERO,
            penalty_outstanding: Money::ZERO,
            total_due: account.principal_amount,
            as_of: now,
        };
    }

    let days_overdue_at = |at: DateTime<Utc>| account.due_date.map_or(0, |due| overdue_days(due, at));

    let mut approved: Vec<&GnplPayment> = payments
        .iter()
        .filter(|p| p.account_id == account.id && p.is_approved() && p.created_at <= now)
        .collect();
    approved.sort_by_key(|p| p.allocation_key());

    let mut principal_paid = Money::ZERO;
    let mut penalty_paid = Money::ZERO;
    for payment in approved {
        let principal_outstanding = account.principal_amount.saturating_sub(principal_paid);
        let penalty_due = accrue_penalty(
            principal_outstanding,
            days_overdue_at(payment.created_at),
            config,
        )
        .saturating_sub(penalty_paid);

        let amount = Money::from(payment.amount);
        let to_penalty = amount.min(penalty_due);
        let to_principal = (amount - to_penalty).min(principal_outstanding);
        penalty_paid = penalty_paid.saturating_add(to_penalty);
        principal_paid = principal_paid.saturating_add(to_principal);
    }

    let principal_outstanding = account.principal_amount.saturating_sub(principal_paid);
    let overdue_days = days_overdue_at(now);
    let penalty_accrued = accrue_penalty(principal_outstanding, overdue_days, config);
    let penalty_outstanding = penalty_accrued.saturating_sub(penalty_paid);
    let total_due = principal_outstanding.saturating_add(penalty_outstanding);

    let status = if total_due.is_zero() {
        AccountStatus::Completed
    } else if overdue_days > 0 {
        AccountStatus::Overdue
    } else {
        AccountStatus::Approved
    };

    tracing::debug!(
        account_id = %account.id,
        %status,
        overdue_days,
        total_due = %total_due,
        "computed account snapshot"
    );

    AccountSnapshot {
        account_id: account.id,
        customer_id: account.customer_id.clone(),
        status,
        due_date: account.due_date,
        overdue_days,
        principal_amount: account.principal_amount,
        principal_paid,
        principal_outstanding,
        penalty_accrued,
        penalty_paid,
        penalty_outstanding,
        total_due,
        as_of: now,
    }
}
