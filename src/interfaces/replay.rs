use super::csv::command_reader::{LedgerCommand, TimedCommand};
use crate::application::ledger::LedgerService;
use crate::application::retry::RetryPolicy;
use crate::domain::account::NewAccount;
use crate::domain::identity::{AccountId, PaymentId};
use crate::domain::payment::PaymentSubmission;
use crate::domain::ports::{LedgerStoreBox, SettingsProviderBox};
use crate::domain::snapshot::AccountSnapshot;
use crate::error::{LedgerError, Result};
use crate::infrastructure::clock::ManualClock;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Drives a [`LedgerService`] from a stream of timestamped commands.
///
/// Commands refer to accounts and payments by labels chosen in the input; a
/// raw id is accepted too, for records created by an earlier run against the
/// same database. Time only moves when a command says so.
pub struct Replayer {
    service: LedgerService,
    clock: ManualClock,
    last_at: Option<DateTime<Utc>>,
    accounts: BTreeMap<String, AccountId>,
    payments: BTreeMap<String, PaymentId>,
}

impl Replayer {
    pub fn new(store: LedgerStoreBox, settings: SettingsProviderBox, retry: RetryPolicy) -> Self {
        let clock = ManualClock::new(DateTime::<Utc>::MIN_UTC);
        let service = LedgerService::new(store, settings)
            .with_clock(Box::new(clock.clone()))
            .with_retry_policy(retry);
        Self {
            service,
            clock,
            last_at: None,
            accounts: BTreeMap::new(),
            payments: BTreeMap::new(),
        }
    }

    pub fn service(&self) -> &LedgerService {
        &self.service
    }

    /// Applies one command at its own timestamp.
    ///
    /// Commands must arrive in chronological order. A failed command leaves
    /// the ledger, the label tables and the replay time untouched.
    pub async fn apply(&mut self, timed: TimedCommand) -> Result<()> {
        if let Some(last) = self.last_at
            && timed.at < last
        {
            return Err(LedgerError::ValidationError(format!(
                "command at {} is earlier than the previous command at {last}",
                timed.at
            )));
        }
        self.clock.set(timed.at);
        match self.execute(timed.command).await {
            Ok(()) => {
                self.last_at = Some(timed.at);
                Ok(())
            }
            Err(err) => {
                if let Some(last) = self.last_at {
                    self.clock.set(last);
                }
                Err(err)
            }
        }
    }

    async fn execute(&mut self, command: LedgerCommand) -> Result<()> {
        match command {
            LedgerCommand::Open {
                account,
                customer_id,
                trip_id,
                quantity,
                unit_price,
            } => {
                if self.accounts.contains_key(&account) {
                    return Err(LedgerError::ValidationError(format!(
                        "account label {account} is already in use"
                    )));
                }
                let opened = self
                    .service
                    .open_account(NewAccount {
                        customer_id,
                        trip_id,
                        quantity,
                        unit_price,
                    })
                    .await?;
                self.accounts.insert(account, opened.id);
            }
            LedgerCommand::ApproveApplication { account, actor } => {
                let id = self.account_id(&account)?;
                self.service.approve_application(id, &actor).await?;
            }
            LedgerCommand::RejectApplication {
                account,
                actor,
                reason,
            } => {
                let id = self.account_id(&account)?;
                self.service
                    .reject_application(id, &actor, reason.as_deref())
                    .await?;
            }
            LedgerCommand::SubmitPayment {
                account,
                payment,
                amount,
                reference,
                payment_date,
            } => {
                if self.payments.contains_key(&payment) {
                    return Err(LedgerError::ValidationError(format!(
                        "payment label {payment} is already in use"
                    )));
                }
                let submitted = self
                    .service
                    .submit_payment(PaymentSubmission {
                        account_id: self.account_id(&account)?,
                        amount,
                        payment_reference: reference,
                        payment_date,
                    })
                    .await?;
                self.payments.insert(payment, submitted.id);
            }
            LedgerCommand::ApprovePayment { payment, actor } => {
                let id = self.payment_id(&payment)?;
                self.service.approve_payment(id, &actor).await?;
            }
            LedgerCommand::RejectPayment {
                payment,
                actor,
                reason,
            } => {
                let id = self.payment_id(&payment)?;
                self.service
                    .reject_payment(id, &actor, reason.as_deref())
                    .await?;
            }
        }
        Ok(())
    }

    /// Snapshots of every stored account, oldest first, paired with their
    /// label. Accounts without a label in this run are named by id.
    ///
    /// `as_of` defaults to the time of the last command.
    pub async fn finish(self, as_of: Option<DateTime<Utc>>) -> Result<Vec<(String, AccountSnapshot)>> {
        if let Some(as_of) = as_of.or(self.last_at) {
            self.clock.set(as_of);
        } else {
            self.clock.set(Utc::now());
        }

        let labels: HashMap<AccountId, &str> = self
            .accounts
            .iter()
            .map(|(label, id)| (*id, label.as_str()))
            .collect();
        let snapshots = self.service.list_all_accounts().await?;
        self.service.flush_notifications().await;
        Ok(snapshots
            .into_iter()
            .map(|snapshot| {
                let label = labels
                    .get(&snapshot.account_id)
                    .map(|label| label.to_string())
                    .unwrap_or_else(|| snapshot.account_id.to_string());
                (label, snapshot)
            })
            .collect())
    }

    fn account_id(&self, label: &str) -> Result<AccountId> {
        resolve(&self.accounts, label, AccountId::from_uuid)
            .ok_or_else(|| LedgerError::not_found("account label", label))
    }

    fn payment_id(&self, label: &str) -> Result<PaymentId> {
        resolve(&self.payments, label, PaymentId::from_uuid)
            .ok_or_else(|| LedgerError::not_found("payment label", label))
    }
}

fn resolve<T: Copy>(labels: &BTreeMap<String, T>, label: &str, from_uuid: fn(Uuid) -> T) -> Option<T> {
    labels
        .get(label)
        .copied()
        .or_else(|| Uuid::parse_str(label).ok().map(from_uuid))
}
