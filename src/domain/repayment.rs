//! Repayment lifecycle: `pending` -> `approved` | `rejected`.
//!
//! Every guard is evaluated against a freshly derived [`AccountSnapshot`], never
//! against the account's stored status.

use super::identity::{Actor, PaymentId};
use super::money::{Amount, Money};
use super::payment::{GnplPayment, PaymentStatus, PaymentSubmission};
use super::snapshot::AccountSnapshot;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};

impl GnplPayment {
    /// Validates a submission against the account's current snapshot and
    /// produces a `pending` payment.
    pub fn submit(
        snapshot: &AccountSnapshot,
        existing: &[GnplPayment],
        submission: PaymentSubmission,
        id: PaymentId,
        now: DateTime<Utc>,
    ) -> Result<GnplPayment> {
        if !snapshot.accepts_payments() {
            return Err(LedgerError::InvalidTransition(format!(
                "account {} does not accept payments in status {}",
                snapshot.account_id, snapshot.status
            )));
        }

        let amount = Amount::new(submission.amount)?;
        let reference = submission.payment_reference.trim();
        if reference.is_empty() {
            return Err(LedgerError::ValidationError(
                "payment reference is required".to_string(),
            ));
        }
        if existing.iter().any(|p| {
            p.account_id == snapshot.account_id
                && p.status != PaymentStatus::Rejected
                && p.payment_reference == reference
        }) {
            return Err(LedgerError::ValidationError(format!(
                "payment reference {reference} was already submitted"
            )));
        }
        if Money::from(amount) > snapshot.total_due {
            return Err(LedgerError::ValidationError(format!(
                "amount {amount} exceeds total due {}",
                snapshot.total_due
            )));
        }

        Ok(GnplPayment {
            id,
            account_id: snapshot.account_id,
            amount,
            payment_reference: reference.to_string(),
            payment_date: submission.payment_date,
            status: PaymentStatus::Pending,
            created_at: now,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        })
    }

    /// Approves a pending payment after re-evaluating the account.
    ///
    /// The payment must still fit in what is owed right now; an approval that
    /// would overpay is refused instead of being double-counted.
    pub fn approve(
        &mut self,
        snapshot: &AccountSnapshot,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_pending("approve")?;
        if !snapshot.accepts_payments() {
            return Err(LedgerError::InvalidTransition(format!(
                "account {} does not accept payments in status {}",
                snapshot.account_id, snapshot.status
            )));
        }
        if Money::from(self.amount) > snapshot.total_due {
            return Err(LedgerError::InvalidTransition(format!(
                "payment {} of {} exceeds total due {}",
                self.id, self.amount, snapshot.total_due
            )));
        }

        self.status = PaymentStatus::Approved;
        self.reviewed_by = Some(actor.clone());
        self.reviewed_at = Some(now);
        Ok(())
    }

    /// Rejects a pending payment. It has no effect on the ledger.
    pub fn reject(&mut self, actor: &Actor, reason: Option<&str>, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending("reject")?;

        self.status = PaymentStatus::Rejected;
        self.reviewed_by = Some(actor.clone());
        self.reviewed_at = Some(now);
        self.rejection_reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        Ok(())
    }

    fn ensure_pending(&self, action: &str) -> Result<()> {
        if self.status == PaymentStatus::Pending {
            Ok(())
        } else {
            Err(LedgerError::InvalidTransition(format!(
                "cannot {action} payment {} in status {}",
                self.id, self.status
            )))
        }
    }
}
