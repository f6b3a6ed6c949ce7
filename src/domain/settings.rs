use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

const DEFAULT_PENALTY_PERIOD_DAYS: NonZeroU32 = match NonZeroU32::new(7) {
    Some(days) => days,
    None => unreachable!(),
};

const DEFAULT_TERM_DAYS: NonZeroU32 = match NonZeroU32::new(30) {
    Some(days) => days,
    None => unreachable!(),
};

/// Penalty and term settings, owned by the settings collaborator.
///
/// The ledger never caches this value across requests: every read and write
/// fetches the current configuration and passes it down explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PenaltyConfiguration {
    pub penalty_enabled: bool,
    /// Percentage of outstanding principal charged per elapsed period.
    pub penalty_percent: Decimal,
    pub penalty_period_days: NonZeroU32,
    /// Days between approval and the due date.
    pub default_term_days: NonZeroU32,
    pub require_admin_approval: bool,
}

impl PenaltyConfiguration {
    pub fn new(
        penalty_enabled: bool,
        penalty_percent: Decimal,
        penalty_period_days: u32,
        default_term_days: u32,
        require_admin_approval: bool,
    ) -> Result<Self> {
        if penalty_percent < Decimal::ZERO {
            return Err(LedgerError::ValidationError(
                "penalty percent must not be negative".to_string(),
            ));
        }
        let penalty_period_days = NonZeroU32::new(penalty_period_days).ok_or_else(|| {
            LedgerError::ValidationError("penalty period must be at least one day".to_string())
        })?;
        let default_term_days = NonZeroU32::new(default_term_days).ok_or_else(|| {
            LedgerError::ValidationError("term must be at least one day".to_string())
        })?;

        Ok(Self {
            penalty_enabled,
            penalty_percent,
            penalty_period_days,
            default_term_days,
            require_admin_approval,
        })
    }
}

impl Default for PenaltyConfiguration {
    fn default() -> Self {
        Self {
            penalty_enabled: true,
            penalty_percent: dec!(5),
            penalty_period_days: DEFAULT_PENALTY_PERIOD_DAYS,
            default_term_days: DEFAULT_TERM_DAYS,
            require_admin_approval: true,
        }
    }
}
