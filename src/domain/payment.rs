use super::identity::{AccountId, Actor, PaymentId};
use super::money::Amount;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
        })
    }
}

/// A customer's request to record a repayment against an account.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSubmission {
    pub account_id: AccountId,
    pub amount: Decimal,
    pub payment_reference: String,
    pub payment_date: NaiveDate,
}

/// One customer-submitted repayment evidence record.
///
/// A payment never records how it was split between penalty and principal;
/// the snapshot engine re-derives that from the full approved history.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GnplPayment {
    pub id: PaymentId,
    pub account_id: AccountId,
    pub amount: Amount,
    pub payment_reference: String,
    pub payment_date: NaiveDate,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_by: Option<Actor>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl GnplPayment {
    pub fn is_approved(&self) -> bool {
        self.status == PaymentStatus::Approved
    }

    /// Ordering key for allocation: oldest submission first.
    pub fn allocation_key(&self) -> (DateTime<Utc>, NaiveDate, PaymentId) {
        (self.created_at, self.payment_date, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(PaymentStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_payment_json_round_trip_keeps_amount_exact() {
        let payment = GnplPayment {
            id: PaymentId::new(),
            account_id: AccountId::new(),
            amount: Amount::new(dec!(199.99)).unwrap(),
            payment_reference: "RCPT-1".to_string(),
            payment_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        };
        let json = serde_json::to_string(&payment).unwrap();
        let decoded: GnplPayment = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, payment);
        assert_eq!(decoded.amount.value(), dec!(199.99));
    }
}
