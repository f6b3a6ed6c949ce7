use crate::domain::events::LedgerEvent;
use crate::domain::ports::Notifier;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;

/// Notification collaborator that emits each event as a structured log line.
///
/// Stands in for the messaging front end when the ledger runs on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, event: &LedgerEvent) -> Result<()> {
        let payload =
            serde_json::to_string(event).map_err(|e| LedgerError::InternalError(Box::new(e)))?;
        tracing::info!(
            event = event.kind(),
            customer_id = %event.customer_id(),
            account_id = %event.account_id(),
            %payload,
            "customer notification"
        );
        Ok(())
    }
}
