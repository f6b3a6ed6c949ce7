use crate::domain::identity::{Actor, CustomerId, TripId};
use crate::domain::money::Amount;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Open,
    Approve,
    Reject,
    Submit,
    ApprovePayment,
    RejectPayment,
}

/// One raw CSV row. Which columns are required depends on `op`.
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    pub op: CommandKind,
    pub at: String,
    pub account: Option<String>,
    pub payment: Option<String>,
    pub customer: Option<String>,
    pub trip: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub reference: Option<String>,
    pub actor: Option<String>,
    pub reason: Option<String>,
}

/// A ledger command naming accounts and payments by replay labels.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    Open {
        account: String,
        customer_id: CustomerId,
        trip_id: TripId,
        quantity: u32,
        unit_price: Amount,
    },
    ApproveApplication {
        account: String,
        actor: Actor,
    },
    RejectApplication {
        account: String,
        actor: Actor,
        reason: Option<String>,
    },
    SubmitPayment {
        account: String,
        payment: String,
        amount: Decimal,
        reference: String,
        payment_date: NaiveDate,
    },
    ApprovePayment {
        payment: String,
        actor: Actor,
    },
    RejectPayment {
        payment: String,
        actor: Actor,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedCommand {
    pub at: DateTime<Utc>,
    pub command: LedgerCommand,
}

/// Parses an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as midnight UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| LedgerError::ValidationError(format!("invalid timestamp '{value}'")))
}

fn required<T>(value: Option<T>, column: &str, op: CommandKind) -> Result<T> {
    value.ok_or_else(|| {
        LedgerError::ValidationError(format!("column '{column}' is required for {op:?}"))
    })
}

impl TryFrom<CommandRecord> for TimedCommand {
    type Error = LedgerError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        let op = record.op;
        let at = parse_instant(&record.at)?;
        let command = match op {
            CommandKind::Open => LedgerCommand::Open {
                account: required(record.account, "account", op)?,
                customer_id: CustomerId::new(required(record.customer, "customer", op)?),
                trip_id: TripId::new(required(record.trip, "trip", op)?),
                quantity: record.quantity.unwrap_or(1),
                unit_price: Amount::new(required(record.unit_price, "unit_price", op)?)?,
            },
            CommandKind::Approve => LedgerCommand::ApproveApplication {
                account: required(record.account, "account", op)?,
                actor: Actor::new(required(record.actor, "actor", op)?),
            },
            CommandKind::Reject => LedgerCommand::RejectApplication {
                account: required(record.account, "account", op)?,
                actor: Actor::new(required(record.actor, "actor", op)?),
                reason: record.reason,
            },
            CommandKind::Submit => LedgerCommand::SubmitPayment {
                account: required(record.account, "account", op)?,
                payment: required(record.payment, "payment", op)?,
                amount: required(record.amount, "amount", op)?,
                reference: record.reference.unwrap_or_default(),
                payment_date: at.date_naive(),
            },
            CommandKind::ApprovePayment => LedgerCommand::ApprovePayment {
                payment: required(record.payment, "payment", op)?,
                actor: Actor::new(required(record.actor, "actor", op)?),
            },
            CommandKind::RejectPayment => LedgerCommand::RejectPayment {
                payment: required(record.payment, "payment", op)?,
                actor: Actor::new(required(record.actor, "actor", op)?),
                reason: record.reason,
            },
        };
        Ok(TimedCommand { at, command })
    }
}

/// Reads ledger commands from a CSV source.
///
/// Whitespace is trimmed and short rows are accepted; missing trailing columns
/// read as empty.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and validates commands, one `Result` per row.
    pub fn commands(self) -> impl Iterator<Item = Result<TimedCommand>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| result.map_err(LedgerError::from).and_then(TimedCommand::try_from))
    }
}
