mod common;

use chrono::Duration;
use common::{start, trip};
use gnpl_ledger::domain::account::{AccountStatus, GnplAccount};
use gnpl_ledger::domain::identity::{Actor, PaymentId};
use gnpl_ledger::domain::money::{Amount, Money};
use gnpl_ledger::domain::payment::{GnplPayment, PaymentStatus};
use gnpl_ledger::domain::penalty::accrue_penalty;
use gnpl_ledger::domain::settings::PenaltyConfiguration;
use gnpl_ledger::domain::snapshot::compute_snapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

fn random_config(rng: &mut StdRng) -> PenaltyConfiguration {
    PenaltyConfiguration::new(
        rng.gen_bool(0.8),
        Decimal::new(rng.gen_range(0..2000), 2),
        rng.gen_range(1..15),
        rng.gen_range(1..60),
        true,
    )
    .unwrap()
}

fn random_history(rng: &mut StdRng, account: &GnplAccount) -> Vec<GnplPayment> {
    let count = rng.gen_range(0..8);
    (0..count)
        .map(|i| {
            let created_at = start() + Duration::hours(rng.gen_range(0..24 * 120));
            let status = match rng.gen_range(0..3) {
                0 => PaymentStatus::Pending,
                1 => PaymentStatus::Rejected,
                _ => PaymentStatus::Approved,
            };
            GnplPayment {
                id: PaymentId::new(),
                account_id: account.id,
                amount: Amount::new(Decimal::new(rng.gen_range(1..60_000), 2)).unwrap(),
                payment_reference: format!("RCPT-{i}"),
                payment_date: created_at.date_naive(),
                status,
                created_at,
                reviewed_by: None,
                reviewed_at: None,
                rejection_reason: None,
            }
        })
        .collect()
}

fn approved_account(rng: &mut StdRng, config: &PenaltyConfiguration) -> GnplAccount {
    let price = Decimal::new(rng.gen_range(1..200_000), 2);
    let mut account = GnplAccount::open(trip("c1", price, rng.gen_range(1..4)), start()).unwrap();
    account.approve(&Actor::new("admin"), start(), config).unwrap();
    account
}

#[test]
fn test_snapshot_balances_are_conserved() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let config = random_config(&mut rng);
        let account = approved_account(&mut rng, &config);
        let history = random_history(&mut rng, &account);
        let now = start() + Duration::hours(rng.gen_range(0..24 * 200));

        let snapshot = compute_snapshot(&account, &history, now, &config);

        assert!(snapshot.principal_paid <= snapshot.principal_amount);
        assert_eq!(
            snapshot.principal_paid + snapshot.principal_outstanding,
            snapshot.principal_amount
        );
        assert_eq!(
            snapshot.total_due,
            snapshot.principal_outstanding + snapshot.penalty_outstanding
        );
        assert!(snapshot.total_due >= Money::ZERO);
        assert_eq!(
            snapshot.penalty_accrued,
            accrue_penalty(snapshot.principal_outstanding, snapshot.overdue_days, &config)
        );
        assert_eq!(
            snapshot.status == AccountStatus::Completed,
            snapshot.total_due.is_zero()
        );
    }
}

#[test]
fn test_snapshot_is_deterministic_and_order_independent() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let config = random_config(&mut rng);
        let account = approved_account(&mut rng, &config);
        let history = random_history(&mut rng, &account);
        let now = start() + Duration::days(rng.gen_range(0..200));

        let first = compute_snapshot(&account, &history, now, &config);
        let mut reversed = history.clone();
        reversed.reverse();

        assert_eq!(first, compute_snapshot(&account, &history, now, &config));
        assert_eq!(first, compute_snapshot(&account, &reversed, now, &config));
    }
}

#[test]
fn test_total_due_never_decreases_without_payments() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..200 {
        let config = random_config(&mut rng);
        let account = approved_account(&mut rng, &config);
        let history = random_history(&mut rng, &account);

        // Every payment in the history is already visible from here on.
        let mut now = start() + Duration::days(120);
        let mut previous = compute_snapshot(&account, &history, now, &config);
        for _ in 0..10 {
            now += Duration::days(rng.gen_range(0..20));
            let next = compute_snapshot(&account, &history, now, &config);
            assert!(next.total_due >= previous.total_due);
            assert!(next.overdue_days >= previous.overdue_days);
            previous = next;
        }
    }
}
