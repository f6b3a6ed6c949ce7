use super::retry::RetryPolicy;
use crate::domain::account::{AccountStatus, GnplAccount, NewAccount};
use crate::domain::events::LedgerEvent;
use crate::domain::identity::{AccountId, Actor, CustomerId, PaymentId};
use crate::domain::payment::{GnplPayment, PaymentSubmission};
use crate::domain::ports::{
    ClockBox, ConditionalWrite, LedgerStoreBox, NotifierRef, SettingsProviderBox,
};
use crate::domain::settings::PenaltyConfiguration;
use crate::domain::snapshot::{AccountSnapshot, compute_snapshot};
use crate::error::{LedgerError, Result};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::notify::TracingNotifier;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Everything needed to decide on one account: the stored record, its payment
/// history, and the configuration and time the decision is taken under.
///
/// The account is always read before its payments, so any write that lands in
/// between bumps the version this view carries and makes the subsequent
/// conditional write fail.
struct AccountView {
    account: GnplAccount,
    payments: Vec<GnplPayment>,
    config: PenaltyConfiguration,
    now: DateTime<Utc>,
    snapshot: AccountSnapshot,
}

/// The orchestration layer of the deferred-payment ledger.
///
/// `LedgerService` composes the persistence, settings, clock and notification
/// collaborators with the pure domain components. Reads derive a fresh
/// snapshot on every call; writes run one of the two workflows and persist the
/// result with a single version-guarded [`ConditionalWrite`], retrying
/// transient failures according to its [`RetryPolicy`].
pub struct LedgerService {
    store: LedgerStoreBox,
    settings: SettingsProviderBox,
    clock: ClockBox,
    notifier: NotifierRef,
    notifications: Mutex<JoinSet<()>>,
    retry: RetryPolicy,
}

impl LedgerService {
    /// Creates a service on wall-clock time that logs notifications.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence for accounts and payments.
    /// * `settings` - Source of the current penalty configuration.
    pub fn new(store: LedgerStoreBox, settings: SettingsProviderBox) -> Self {
        Self {
            store,
            settings,
            clock: Box::new(SystemClock),
            notifier: Arc::new(TracingNotifier),
            notifications: Mutex::new(JoinSet::new()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: ClockBox) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: NotifierRef) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Opens a GNPL application for a trip purchase.
    ///
    /// When admin approval is switched off in the configuration, the
    /// application is approved on the spot by the system actor.
    pub async fn open_account(&self, request: NewAccount) -> Result<GnplAccount> {
        let request = &request;
        let account = self
            .retrying("open_account", || async move {
                let config = self.settings.penalty_configuration().await?;
                let now = self.clock.now();
                let mut account = GnplAccount::open(request.clone(), now)?;
                if !config.require_admin_approval {
                    account.approve(&Actor::system(), now, &config)?;
                }
                self.store.insert_account(account.clone()).await?;
                Ok(account)
            })
            .await?;

        info!(
            account_id = %account.id,
            customer_id = %account.customer_id,
            trip_id = %account.trip_id,
            principal = %account.principal_amount,
            status = %account.status,
            "GNPL application opened"
        );
        self.dispatch(LedgerEvent::ApplicationOpened {
            account_id: account.id,
            customer_id: account.customer_id.clone(),
            principal_amount: account.principal_amount,
        });
        if account.status == AccountStatus::Approved {
            self.dispatch(LedgerEvent::ApplicationApproved {
                account_id: account.id,
                customer_id: account.customer_id.clone(),
                due_date: account.due_date,
            });
        }
        Ok(account)
    }

    pub async fn get_account_snapshot(&self, account_id: AccountId) -> Result<AccountSnapshot> {
        self.retrying("get_account_snapshot", || async move {
            Ok(self.load_view(account_id).await?.snapshot)
        })
        .await
    }

    /// Like [`get_account_snapshot`](Self::get_account_snapshot), but reports
    /// accounts of other customers as not found.
    pub async fn get_customer_account_snapshot(
        &self,
        customer_id: &CustomerId,
        account_id: AccountId,
    ) -> Result<AccountSnapshot> {
        let snapshot = self.get_account_snapshot(account_id).await?;
        if &snapshot.customer_id != customer_id {
            return Err(LedgerError::not_found("account", account_id));
        }
        Ok(snapshot)
    }

    /// Snapshots of every account of a customer, oldest first.
    pub async fn list_accounts_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<AccountSnapshot>> {
        self.retrying("list_accounts_for_customer", || async move {
            let accounts = self.store.accounts_for_customer(customer_id).await?;
            self.snapshots_of(&accounts).await
        })
        .await
    }

    /// Snapshots of every account in the ledger, oldest first.
    pub async fn list_all_accounts(&self) -> Result<Vec<AccountSnapshot>> {
        self.retrying("list_all_accounts", || async move {
            let accounts = self.store.all_accounts().await?;
            self.snapshots_of(&accounts).await
        })
        .await
    }

    /// Applications waiting for an admin decision, oldest first.
    pub async fn list_pending_applications(&self) -> Result<Vec<GnplAccount>> {
        self.retrying("list_pending_applications", || async move {
            self.store
                .accounts_with_status(AccountStatus::PendingApproval)
                .await
        })
        .await
    }

    /// Payments waiting for an admin decision, oldest first.
    pub async fn list_pending_payments(&self) -> Result<Vec<GnplPayment>> {
        self.retrying("list_pending_payments", || async move {
            self.store.pending_payments().await
        })
        .await
    }

    pub async fn payment_history(&self, account_id: AccountId) -> Result<Vec<GnplPayment>> {
        self.retrying("payment_history", || async move {
            let account = self.load_account(account_id).await?;
            self.store.payments_for_account(account.id).await
        })
        .await
    }

    pub async fn approve_application(
        &self,
        account_id: AccountId,
        actor: &Actor,
    ) -> Result<GnplAccount> {
        let account = self
            .retrying("approve_application", || async move {
                let config = self.settings.penalty_configuration().await?;
                let mut account = self.load_account(account_id).await?;
                account.approve(actor, self.clock.now(), &config)?;
                self.store.commit(ConditionalWrite::account(account)).await
            })
            .await?;

        info!(
            account_id = %account.id,
            %actor,
            due_date = ?account.due_date,
            "GNPL application approved"
        );
        self.dispatch(LedgerEvent::ApplicationApproved {
            account_id: account.id,
            customer_id: account.customer_id.clone(),
            due_date: account.due_date,
        });
        Ok(account)
    }

    pub async fn reject_application(
        &self,
        account_id: AccountId,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<GnplAccount> {
        let account = self
            .retrying("reject_application", || async move {
                let mut account = self.load_account(account_id).await?;
                account.reject(actor, reason)?;
                self.store.commit(ConditionalWrite::account(account)).await
            })
            .await?;

        info!(
            account_id = %account.id,
            %actor,
            reason = account.rejection_reason.as_deref().unwrap_or(""),
            "GNPL application rejected"
        );
        self.dispatch(LedgerEvent::ApplicationRejected {
            account_id: account.id,
            customer_id: account.customer_id.clone(),
            reason: account.rejection_reason.clone(),
        });
        Ok(account)
    }

    /// Records a customer's repayment as `pending` review.
    pub async fn submit_payment(&self, submission: PaymentSubmission) -> Result<GnplPayment> {
        let submission = &submission;
        let (payment, customer_id) = self
            .retrying("submit_payment", || async move {
                let view = self.load_view(submission.account_id).await?;
                let payment = GnplPayment::submit(
                    &view.snapshot,
                    &view.payments,
                    submission.clone(),
                    PaymentId::new(),
                    view.now,
                )?;

                let mut account = view.account;
                account.record_snapshot(&view.snapshot);
                let account = self
                    .store
                    .commit(ConditionalWrite::with_payment(account, payment.clone()))
                    .await?;
                Ok((payment, account.customer_id))
            })
            .await?;

        info!(
            payment_id = %payment.id,
            account_id = %payment.account_id,
            amount = %payment.amount,
            reference = %payment.payment_reference,
            "GNPL payment submitted"
        );
        self.dispatch(LedgerEvent::PaymentSubmitted {
            payment_id: payment.id,
            account_id: payment.account_id,
            customer_id,
            amount: payment.amount,
        });
        Ok(payment)
    }

    /// Approves a pending payment, re-evaluating the account first.
    pub async fn approve_payment(&self, payment_id: PaymentId, actor: &Actor) -> Result<GnplPayment> {
        let (payment, snapshot) = self
            .retrying("approve_payment", || async move {
                let view = self.load_payment_view(payment_id).await?;
                let mut payment = find_payment(&view.payments, payment_id)?;
                payment.approve(&view.snapshot, actor, view.now)?;

                let history: Vec<GnplPayment> = view
                    .payments
                    .into_iter()
                    .map(|p| if p.id == payment.id { payment.clone() } else { p })
                    .collect();
                let after = compute_snapshot(&view.account, &history, view.now, &view.config);

                let mut account = view.account;
                account.record_snapshot(&after);
                self.store
                    .commit(ConditionalWrite::with_payment(account, payment.clone()))
                    .await?;
                Ok((payment, after))
            })
            .await?;

        info!(
            payment_id = %payment.id,
            account_id = %payment.account_id,
            %actor,
            amount = %payment.amount,
            total_due = %snapshot.total_due,
            status = %snapshot.status,
            "GNPL payment approved"
        );
        self.dispatch(LedgerEvent::PaymentApproved {
            payment_id: payment.id,
            account_id: payment.account_id,
            customer_id: snapshot.customer_id,
            amount: payment.amount,
            total_due: snapshot.total_due,
        });
        Ok(payment)
    }

    pub async fn reject_payment(
        &self,
        payment_id: PaymentId,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<GnplPayment> {
        let (payment, customer_id) = self
            .retrying("reject_payment", || async move {
                let view = self.load_payment_view(payment_id).await?;
                let mut payment = find_payment(&view.payments, payment_id)?;
                payment.reject(actor, reason, view.now)?;

                let mut account = view.account;
                account.record_snapshot(&view.snapshot);
                let account = self
                    .store
                    .commit(ConditionalWrite::with_payment(account, payment.clone()))
                    .await?;
                Ok((payment, account.customer_id))
            })
            .await?;

        info!(
            payment_id = %payment.id,
            account_id = %payment.account_id,
            %actor,
            reason = payment.rejection_reason.as_deref().unwrap_or(""),
            "GNPL payment rejected"
        );
        self.dispatch(LedgerEvent::PaymentRejected {
            payment_id: payment.id,
            account_id: payment.account_id,
            customer_id,
            reason: payment.rejection_reason.clone(),
        });
        Ok(payment)
    }

    async fn load_account(&self, account_id: AccountId) -> Result<GnplAccount> {
        self.store
            .get_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", account_id))
    }

    async fn snapshots_of(&self, accounts: &[GnplAccount]) -> Result<Vec<AccountSnapshot>> {
        let config = self.settings.penalty_configuration().await?;
        let now = self.clock.now();

        let mut snapshots = Vec::with_capacity(accounts.len());
        for account in accounts {
            let payments = self.store.payments_for_account(account.id).await?;
            snapshots.push(compute_snapshot(account, &payments, now, &config));
        }
        Ok(snapshots)
    }

    async fn load_view(&self, account_id: AccountId) -> Result<AccountView> {
        let account = self.load_account(account_id).await?;
        let payments = self.store.payments_for_account(account.id).await?;
        let config = self.settings.penalty_configuration().await?;
        let now = self.clock.now();
        let snapshot = compute_snapshot(&account, &payments, now, &config);
        Ok(AccountView {
            account,
            payments,
            config,
            now,
            snapshot,
        })
    }

    /// Loads the view of the account a payment belongs to. The payment itself
    /// must be taken from the view's history, which is read after the account.
    async fn load_payment_view(&self, payment_id: PaymentId) -> Result<AccountView> {
        let account_id = self
            .store
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("payment", payment_id))?
            .account_id;
        self.load_view(account_id).await
    }

    /// Waits for every notification dispatched so far.
    ///
    /// Notifications run in the background after their commit; call this
    /// before shutting down so none are dropped with the runtime.
    pub async fn flush_notifications(&self) {
        let mut pending = std::mem::take(&mut *self.notifications());
        while pending.join_next().await.is_some() {}
    }

    fn notifications(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dispatch(&self, event: LedgerEvent) {
        let notifier = Arc::clone(&self.notifier);
        let mut notifications = self.notifications();
        while notifications.try_join_next().is_some() {}
        notifications.spawn(async move {
            if let Err(err) = notifier.notify(&event).await {
                warn!(
                    event = event.kind(),
                    account_id = %event.account_id(),
                    error = %err,
                    "customer notification failed"
                );
            }
        });
    }

    async fn retrying<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut failures = 0;
        loop {
            match attempt().await {
                Err(err) if err.is_transient() && failures + 1 < self.retry.max_attempts => {
                    failures += 1;
                    warn!(operation, attempt = failures, error = %err, "transient ledger failure, retrying");
                    if matches!(err, LedgerError::PersistenceUnavailable(_)) {
                        tokio::time::sleep(self.retry.backoff(failures)).await;
                    } else {
                        tokio::task::yield_now().await;
                    }
                }
                Err(err) if err.is_transient() => {
                    error!(operation, attempts = failures + 1, error = %err, "giving up on transient failure");
                    return Err(err);
                }
                result => return result,
            }
        }
    }
}

fn find_payment(payments: &[GnplPayment], payment_id: PaymentId) -> Result<GnplPayment> {
    payments
        .iter()
        .find(|p| p.id == payment_id)
        .cloned()
        .ok_or_else(|| LedgerError::not_found("payment", payment_id))
}
