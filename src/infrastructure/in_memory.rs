use crate::domain::account::{AccountStatus, GnplAccount};
use crate::domain::identity::{AccountId, CustomerId, PaymentId};
use crate::domain::payment::{GnplPayment, PaymentStatus};
use crate::domain::ports::{AccountStore, ConditionalWrite, LedgerStore, PaymentStore};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, GnplAccount>,
    payments: HashMap<PaymentId, GnplPayment>,
}

/// A thread-safe in-memory ledger store.
///
/// Accounts and payments share one `RwLock` so a [`ConditionalWrite`] is
/// checked and applied under a single write guard.
/// Ideal for testing or small deployments where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first_accounts(mut accounts: Vec<GnplAccount>) -> Vec<GnplAccount> {
    accounts.sort_by_key(|a| (a.created_at, a.id));
    accounts
}

fn oldest_first_payments(mut payments: Vec<GnplPayment>) -> Vec<GnplPayment> {
    payments.sort_by_key(GnplPayment::allocation_key);
    payments
}

#[async_trait]
impl AccountStore for InMemoryLedgerStore {
    async fn insert_account(&self, account: GnplAccount) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&account.id) {
            return Err(LedgerError::ValidationError(format!(
                "account {} already exists",
                account.id
            )));
        }
        tables.accounts.insert(account.id, account);
        Ok(())
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<GnplAccount>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.get(&id).cloned())
    }

    async fn accounts_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<GnplAccount>> {
        let tables = self.tables.read().await;
        Ok(oldest_first_accounts(
            tables
                .accounts
                .values()
                .filter(|a| &a.customer_id == customer_id)
                .cloned()
                .collect(),
        ))
    }

    async fn accounts_with_status(&self, status: AccountStatus) -> Result<Vec<GnplAccount>> {
        let tables = self.tables.read().await;
        Ok(oldest_first_accounts(
            tables
                .accounts
                .values()
                .filter(|a| a.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn all_accounts(&self) -> Result<Vec<GnplAccount>> {
        let tables = self.tables.read().await;
        Ok(oldest_first_accounts(
            tables.accounts.values().cloned().collect(),
        ))
    }
}

#[async_trait]
impl PaymentStore for InMemoryLedgerStore {
    async fn get_payment(&self, id: PaymentId) -> Result<Option<GnplPayment>> {
        let tables = self.tables.read().await;
        Ok(tables.payments.get(&id).cloned())
    }

    async fn payments_for_account(&self, account_id: AccountId) -> Result<Vec<GnplPayment>> {
        let tables = self.tables.read().await;
        Ok(oldest_first_payments(
            tables
                .payments
                .values()
                .filter(|p| p.account_id == account_id)
                .cloned()
                .collect(),
        ))
    }

    async fn pending_payments(&self) -> Result<Vec<GnplPayment>> {
        let tables = self.tables.read().await;
        Ok(oldest_first_payments(
            tables
                .payments
                .values()
                .filter(|p| p.status == PaymentStatus::Pending)
                .cloned()
                .collect(),
        ))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn commit(&self, write: ConditionalWrite) -> Result<GnplAccount> {
        let mut tables = self.tables.write().await;
        let ConditionalWrite {
            mut account,
            expected_version,
            payment,
        } = write;

        let stored_version = tables
            .accounts
            .get(&account.id)
            .map(|stored| stored.version)
            .ok_or_else(|| LedgerError::not_found("account", account.id))?;
        if stored_version != expected_version {
            return Err(LedgerError::ConcurrencyConflict(format!(
                "account {} is at version {stored_version}, expected {expected_version}",
                account.id
            )));
        }

        account.version = expected_version + 1;
        if let Some(payment) = payment {
            tables.payments.insert(payment.id, payment);
        }
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }
}
