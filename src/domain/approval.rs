//! Application lifecycle: `pending_approval` -> `approved` | `rejected`.
//!
//! `overdue` and `completed` are never entered through a call here; they are
//! derived by the snapshot engine on read.

use super::account::{AccountStatus, GnplAccount};
use super::identity::Actor;
use super::settings::PenaltyConfiguration;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Duration, Utc};

impl GnplAccount {
    /// Approves a pending application and fixes its due date.
    pub fn approve(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
        config: &PenaltyConfiguration,
    ) -> Result<()> {
        self.ensure_pending("approve")?;
        let due_date = Duration::try_days(i64::from(config.default_term_days.get()))
            .and_then(|term| now.checked_add_signed(term))
            .ok_or_else(|| {
                LedgerError::ValidationError(format!(
                    "a term of {} days puts the due date out of range",
                    config.default_term_days
                ))
            })?;

        self.status = AccountStatus::Approved;
        self.approved_at = Some(now);
        self.due_date = Some(due_date);
        self.reviewed_by = Some(actor.clone());
        Ok(())
    }

    /// Rejects a pending application. Rejection is terminal.
    pub fn reject(&mut self, actor: &Actor, reason: Option<&str>) -> Result<()> {
        self.ensure_pending("reject")?;

        self.status = AccountStatus::Rejected;
        self.reviewed_by = Some(actor.clone());
        self.rejection_reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        Ok(())
    }

    fn ensure_pending(&self, action: &str) -> Result<()> {
        if self.status == AccountStatus::PendingApproval {
            Ok(())
        } else {
            Err(LedgerError::InvalidTransition(format!(
                "cannot {action} application {} in status {}",
                self.id, self.status
            )))
        }
    }
}
