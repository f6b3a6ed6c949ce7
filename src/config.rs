use crate::application::retry::RetryPolicy;
use crate::domain::settings::PenaltyConfiguration;
use crate::error::Result;
use clap::{ArgAction, Args};
use rust_decimal::Decimal;
use std::time::Duration;

/// Penalty and term settings, read from flags or `GNPL_*` environment variables.
#[derive(Args, Debug, Clone)]
pub struct PenaltyArgs {
    /// Whether overdue accounts accrue penalties.
    #[arg(long, env = "GNPL_PENALTY_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub penalty_enabled: bool,

    /// Percentage of outstanding principal charged per elapsed period.
    #[arg(long, env = "GNPL_PENALTY_PERCENT", default_value = "5")]
    pub penalty_percent: Decimal,

    /// Length of one penalty period, in days.
    #[arg(long, env = "GNPL_PENALTY_PERIOD_DAYS", default_value_t = 7)]
    pub penalty_period_days: u32,

    /// Days between approval and the due date.
    #[arg(long, env = "GNPL_TERM_DAYS", default_value_t = 30)]
    pub term_days: u32,

    /// Whether applications wait for an admin decision.
    #[arg(long, env = "GNPL_REQUIRE_ADMIN_APPROVAL", default_value_t = true, action = ArgAction::Set)]
    pub require_admin_approval: bool,
}

/// Runtime configuration of the ledger.
#[derive(Args, Debug, Clone)]
pub struct LedgerConfig {
    #[command(flatten)]
    pub penalty: PenaltyArgs,

    /// Attempts per operation before a transient failure is surfaced.
    #[arg(long, env = "GNPL_RETRY_ATTEMPTS", default_value_t = 3)]
    pub retry_attempts: u32,

    /// Base delay between retries after a storage failure, in milliseconds.
    #[arg(long, env = "GNPL_RETRY_BACKOFF_MS", default_value_t = 50)]
    pub retry_backoff_ms: u64,

    /// Log filter, in `tracing_subscriber::EnvFilter` syntax.
    #[arg(long, env = "GNPL_LOG", default_value = "gnpl_ledger=info")]
    pub log: String,
}

impl LedgerConfig {
    pub fn penalty_configuration(&self) -> Result<PenaltyConfiguration> {
        PenaltyConfiguration::new(
            self.penalty.penalty_enabled,
            self.penalty.penalty_percent,
            self.penalty.penalty_period_days,
            self.penalty.term_days,
            self.penalty.require_admin_approval,
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}
