#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gnpl_ledger::application::ledger::LedgerService;
use gnpl_ledger::application::retry::RetryPolicy;
use gnpl_ledger::domain::account::NewAccount;
use gnpl_ledger::domain::events::LedgerEvent;
use gnpl_ledger::domain::identity::{AccountId, CustomerId, TripId};
use gnpl_ledger::domain::money::Amount;
use gnpl_ledger::domain::payment::PaymentSubmission;
use gnpl_ledger::domain::ports::{LedgerStoreBox, Notifier};
use gnpl_ledger::domain::settings::PenaltyConfiguration;
use gnpl_ledger::error::Result;
use gnpl_ledger::infrastructure::clock::ManualClock;
use gnpl_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use gnpl_ledger::infrastructure::settings::StaticSettings;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

pub const HEADER: &str =
    "op,at,account,payment,customer,trip,quantity,unit_price,amount,reference,actor,reason";

/// Writes a command CSV with the standard header followed by `rows`.
pub fn commands_csv(rows: &[&str]) -> NamedTempFile {
    let mut csv = NamedTempFile::new().unwrap();
    writeln!(csv, "{HEADER}").unwrap();
    for row in rows {
        writeln!(csv, "{row}").unwrap();
    }
    csv.flush().unwrap();
    csv
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// Forwards every event to a channel so tests can await spawned notifications.
pub struct RecordingNotifier {
    events: mpsc::UnboundedSender<LedgerEvent>,
}

impl RecordingNotifier {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<LedgerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { events }), receiver)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &LedgerEvent) -> Result<()> {
        let _ = self.events.send(event.clone());
        Ok(())
    }
}

pub struct Harness {
    pub service: Arc<LedgerService>,
    pub clock: ManualClock,
    pub settings: StaticSettings,
    pub store: InMemoryLedgerStore,
}

impl Harness {
    pub fn new(config: PenaltyConfiguration) -> Self {
        let store = InMemoryLedgerStore::new();
        Self::with_store(config, store.clone(), Box::new(store))
    }

    /// Builds a service on top of `backend`; `store` gives tests direct access
    /// to the underlying records.
    pub fn with_store(
        config: PenaltyConfiguration,
        store: InMemoryLedgerStore,
        backend: LedgerStoreBox,
    ) -> Self {
        let clock = ManualClock::new(start());
        let settings = StaticSettings::new(config);
        let service = LedgerService::new(backend, Box::new(settings.clone()))
            .with_clock(Box::new(clock.clone()))
            .with_retry_policy(RetryPolicy::new(5, Duration::from_millis(1)));
        Self {
            service: Arc::new(service),
            clock,
            settings,
            store,
        }
    }
}

pub fn trip(customer: &str, unit_price: Decimal, quantity: u32) -> NewAccount {
    NewAccount {
        customer_id: CustomerId::new(customer),
        trip_id: TripId::new(format!("trip-{customer}")),
        quantity,
        unit_price: Amount::new(unit_price).unwrap(),
    }
}

pub fn submission(account_id: AccountId, amount: Decimal, reference: &str) -> PaymentSubmission {
    PaymentSubmission {
        account_id,
        amount,
        payment_reference: reference.to_string(),
        payment_date: start().date_naive(),
    }
}

/// Writes a replay script for `accounts` customers: each opens an account,
/// gets approved, and repays half of it.
pub fn generate_ledger_csv(path: &Path, accounts: usize) -> std::result::Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER.split(','))?;

    for i in 1..=accounts {
        let account = format!("a{i}");
        let payment = format!("p{i}");
        let customer = format!("c{}", i % 50);
        let reference = format!("RCPT-{i}");
        let rows: [[&str; 12]; 4] = [
            ["open", "2026-01-01", &account, "", &customer, "t1", "2", "100", "", "", "", ""],
            ["approve", "2026-01-02", &account, "", "", "", "", "", "", "", "admin", ""],
            ["submit", "2026-01-10", &account, &payment, "", "", "", "", "100", &reference, "", ""],
            ["approve_payment", "2026-01-11", "", &payment, "", "", "", "", "", "", "admin", ""],
        ];
        for row in rows {
            wtr.write_record(row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}
