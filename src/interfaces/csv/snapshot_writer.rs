use crate::domain::snapshot::AccountSnapshot;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct SnapshotRow<'a> {
    account: &'a str,
    customer: &'a str,
    status: &'static str,
    due_date: String,
    overdue_days: i64,
    principal_amount: String,
    principal_paid: String,
    principal_outstanding: String,
    penalty_accrued: String,
    penalty_paid: String,
    penalty_outstanding: String,
    total_due: String,
    id: String,
}

impl<'a> SnapshotRow<'a> {
    fn new(label: &'a str, snapshot: &'a AccountSnapshot) -> Self {
        Self {
            account: label,
            customer: snapshot.customer_id.as_str(),
            status: snapshot.status.as_str(),
            due_date: snapshot
                .due_date
                .map(|due| due.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            overdue_days: snapshot.overdue_days,
            principal_amount: snapshot.principal_amount.to_string(),
            principal_paid: snapshot.principal_paid.to_string(),
            principal_outstanding: snapshot.principal_outstanding.to_string(),
            penalty_accrued: snapshot.penalty_accrued.to_string(),
            penalty_paid: snapshot.penalty_paid.to_string(),
            penalty_outstanding: snapshot.penalty_outstanding.to_string(),
            total_due: snapshot.total_due.to_string(),
            id: snapshot.account_id.to_string(),
        }
    }
}

/// Writes account snapshots as CSV, amounts with two decimal places.
pub struct SnapshotWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes one row per `(label, snapshot)` pair and flushes.
    pub fn write_snapshots<'a>(
        &mut self,
        snapshots: impl IntoIterator<Item = (&'a str, &'a AccountSnapshot)>,
    ) -> Result<()> {
        for (label, snapshot) in snapshots {
            self.writer.serialize(SnapshotRow::new(label, snapshot))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
