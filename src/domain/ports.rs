//! Collaborator contracts the ledger depends on.

use super::account::{AccountStatus, GnplAccount};
use super::events::LedgerEvent;
use super::identity::{AccountId, CustomerId, PaymentId};
use super::payment::GnplPayment;
use super::settings::PenaltyConfiguration;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A single atomic, version-guarded mutation of one account.
///
/// The store applies it only if the stored account still carries
/// `expected_version`, writing the account (with its version bumped) and the
/// optional payment together. Otherwise it fails with
/// [`LedgerError::ConcurrencyConflict`](crate::error::LedgerError::ConcurrencyConflict).
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalWrite {
    pub account: GnplAccount,
    pub expected_version: u64,
    pub payment: Option<GnplPayment>,
}

impl ConditionalWrite {
    pub fn account(account: GnplAccount) -> Self {
        let expected_version = account.version;
        Self {
            account,
            expected_version,
            payment: None,
        }
    }

    pub fn with_payment(account: GnplAccount, payment: GnplPayment) -> Self {
        Self {
            payment: Some(payment),
            ..Self::account(account)
        }
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Stores a brand-new account. Fails if the id is already taken.
    async fn insert_account(&self, account: GnplAccount) -> Result<()>;
    async fn get_account(&self, id: AccountId) -> Result<Option<GnplAccount>>;
    /// Accounts of one customer, oldest first.
    async fn accounts_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<GnplAccount>>;
    /// Accounts whose stored status equals `status`, oldest first.
    async fn accounts_with_status(&self, status: AccountStatus) -> Result<Vec<GnplAccount>>;
    async fn all_accounts(&self) -> Result<Vec<GnplAccount>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn get_payment(&self, id: PaymentId) -> Result<Option<GnplPayment>>;
    /// Payment history of one account, oldest first.
    async fn payments_for_account(&self, account_id: AccountId) -> Result<Vec<GnplPayment>>;
    /// Payments awaiting review, oldest first.
    async fn pending_payments(&self) -> Result<Vec<GnplPayment>>;
}

#[async_trait]
pub trait LedgerStore: AccountStore + PaymentStore {
    /// Applies `write` atomically and returns the stored account.
    async fn commit(&self, write: ConditionalWrite) -> Result<GnplAccount>;
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// The configuration in force right now. Never cached by the ledger.
    async fn penalty_configuration(&self) -> Result<PenaltyConfiguration>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &LedgerEvent) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type SettingsProviderBox = Box<dyn SettingsProvider>;
pub type ClockBox = Box<dyn Clock>;
pub type NotifierRef = Arc<dyn Notifier>;
