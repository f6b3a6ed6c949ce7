//! Late-penalty accrual.

use super::money::Money;
use super::settings::PenaltyConfiguration;
use rust_decimal::Decimal;

/// Computes the penalty accrued on `outstanding_principal` after `overdue_days`.
///
/// Accrual is simple: every elapsed period charges `penalty_percent` of the
/// principal outstanding *now*, never of a running penalty balance, so the
/// result depends on its inputs alone. The result is rounded half-up to the
/// minor unit.
pub fn accrue_penalty(
    outstanding_principal: Money,
    overdue_days: i64,
    config: &PenaltyConfiguration,
) -> Money {
    if !config.penalty_enabled || overdue_days <= 0 || outstanding_principal <= Money::ZERO {
        return Money::ZERO;
    }

    let periods_elapsed = overdue_days / i64::from(config.penalty_period_days.get());
    if periods_elapsed == 0 {
        return Money::ZERO;
    }

    let rate = config.penalty_percent.max(Decimal::ZERO) / Decimal::ONE_HUNDRED;
    let penalty = outstanding_principal
        .value()
        .checked_mul(rate)
        .and_then(|per_period| per_period.checked_mul(Decimal::from(periods_elapsed)))
        .unwrap_or(Decimal::MAX);

    Money::new(penalty).round_to_minor_unit()
}
