use crate::domain::account::{AccountStatus, GnplAccount};
use crate::domain::identity::{AccountId, CustomerId, PaymentId};
use crate::domain::payment::{GnplPayment, PaymentStatus};
use crate::domain::ports::{AccountStore, ConditionalWrite, LedgerStore, PaymentStore};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing accounts.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for storing payments.
pub const CF_PAYMENTS: &str = "payments";

/// Version of the persisted record layout. Bump it whenever a stored struct changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Envelope around every persisted record.
///
/// Records written under a different layout are refused on read rather than
/// patched up field by field.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredRecord<T> {
    schema_version: u32,
    record: T,
}

/// A persistent store implementation using RocksDB.
///
/// Accounts and payments live in separate Column Families, keyed by the raw
/// UUID bytes. Conditional writes are serialized by a process-wide mutex and
/// applied with one `WriteBatch`, so the version check and both puts are atomic.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("accounts" and "payments") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_accounts, cf_payments])?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LedgerError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(&StoredRecord {
            schema_version: SCHEMA_VERSION,
            record,
        })
        .map_err(|e| LedgerError::InternalError(Box::new(e)))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        let stored: StoredRecord<T> =
            serde_json::from_slice(bytes).map_err(|e| LedgerError::InternalError(Box::new(e)))?;
        if stored.schema_version != SCHEMA_VERSION {
            return Err(LedgerError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "record has schema version {}, expected {SCHEMA_VERSION}",
                    stored.schema_version
                ),
            ))));
        }
        Ok(stored.record)
    }

    fn get_record<T: DeserializeOwned>(&self, cf_name: &str, key: [u8; 16]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str, mut keep: impl FnMut(&T) -> bool) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: T = Self::decode(&value)?;
            if keep(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn scan_accounts(&self, keep: impl FnMut(&GnplAccount) -> bool) -> Result<Vec<GnplAccount>> {
        let mut accounts = self.scan(CF_ACCOUNTS, keep)?;
        accounts.sort_by_key(|a| (a.created_at, a.id));
        Ok(accounts)
    }

    fn scan_payments(&self, keep: impl FnMut(&GnplPayment) -> bool) -> Result<Vec<GnplPayment>> {
        let mut payments = self.scan(CF_PAYMENTS, keep)?;
        payments.sort_by_key(GnplPayment::allocation_key);
        Ok(payments)
    }
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn insert_account(&self, account: GnplAccount) -> Result<()> {
        let _guard = self.commit_lock.lock().await;
        let cf = self.cf(CF_ACCOUNTS)?;
        let key = account.id.to_bytes();
        if self.db.get_pinned_cf(cf, key)?.is_some() {
            return Err(LedgerError::ValidationError(format!(
                "account {} already exists",
                account.id
            )));
        }
        self.db.put_cf(cf, key, Self::encode(&account)?)?;
        Ok(())
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<GnplAccount>> {
        self.get_record(CF_ACCOUNTS, id.to_bytes())
    }

    async fn accounts_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<GnplAccount>> {
        self.scan_accounts(|a| &a.customer_id == customer_id)
    }

    async fn accounts_with_status(&self, status: AccountStatus) -> Result<Vec<GnplAccount>> {
        self.scan_accounts(|a| a.status == status)
    }

    async fn all_accounts(&self) -> Result<Vec<GnplAccount>> {
        self.scan_accounts(|_| true)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn get_payment(&self, id: PaymentId) -> Result<Option<GnplPayment>> {
        self.get_record(CF_PAYMENTS, id.to_bytes())
    }

    async fn payments_for_account(&self, account_id: AccountId) -> Result<Vec<GnplPayment>> {
        self.scan_payments(|p| p.account_id == account_id)
    }

    async fn pending_payments(&self) -> Result<Vec<GnplPayment>> {
        self.scan_payments(|p| p.status == PaymentStatus::Pending)
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn commit(&self, write: ConditionalWrite) -> Result<GnplAccount> {
        let _guard = self.commit_lock.lock().await;
        let ConditionalWrite {
            mut account,
            expected_version,
            payment,
        } = write;

        let stored: GnplAccount = self
            .get_record(CF_ACCOUNTS, account.id.to_bytes())?
            .ok_or_else(|| LedgerError::not_found("account", account.id))?;
        if stored.version != expected_version {
            return Err(LedgerError::ConcurrencyConflict(format!(
                "account {} is at version {}, expected {expected_version}",
                account.id, stored.version
            )));
        }
        account.version = expected_version + 1;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_ACCOUNTS)?, account.id.to_bytes(), Self::encode(&account)?);
        if let Some(payment) = &payment {
            batch.put_cf(self.cf(CF_PAYMENTS)?, payment.id.to_bytes(), Self::encode(payment)?);
        }
        self.db.write(batch)?;

        Ok(account)
    }
}
