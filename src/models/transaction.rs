use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::Account;

/// Direction of a balance transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Debit against the account balance.
    Use,
    /// Compensating credit reversing a prior use.
    Cancel,
}

/// Outcome recorded for a transaction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_result", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionResult {
    Success,
    Fail,
}

/// An immutable ledger entry. SUCCESS entries carry the balance after the
/// mutation as `balance_snapshot`; FAIL entries carry the unchanged balance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    /// Public 32-character token handed to callers; never the row id.
    pub transaction_id: String,
    pub account_id: Uuid,
    pub account_number: String,
    #[sqlx(rename = "type")]
    pub transaction_type: TransactionType,
    pub result: TransactionResult,
    pub amount: i64,
    pub balance_snapshot: i64,
    pub transacted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Records a ledger entry against the account's current balance.
    ///
    /// Callers mutate the account first (or not at all, for FAIL records),
    /// so the snapshot taken here is the post-operation balance.
    pub fn record(
        account: &Account,
        transaction_type: TransactionType,
        result: TransactionResult,
        amount: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            transaction_id: Self::new_transaction_id(),
            account_id: account.id,
            account_number: account.account_number.clone(),
            transaction_type,
            result,
            amount,
            balance_snapshot: account.balance,
            transacted_at: now,
            created_at: now,
        }
    }

    /// Generates a public transaction token: a UUIDv4 rendered without
    /// hyphens, always 32 lowercase hex characters.
    pub fn new_transaction_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn is_success(&self) -> bool {
        self.result == TransactionResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account(balance: i64) -> Account {
        Account::open(Uuid::new_v4(), "1000000000".to_string(), balance)
    }

    #[test]
    fn test_transaction_id_shape() {
        let id = Transaction::new_transaction_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!id.contains('-'));
    }

    #[test]
    fn test_transaction_ids_are_random() {
        let a = Transaction::new_transaction_id();
        let b = Transaction::new_transaction_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_snapshots_current_balance() {
        let mut account = test_account(1000);
        account.use_balance(100).unwrap();

        let tx = Transaction::record(
            &account,
            TransactionType::Use,
            TransactionResult::Success,
            100,
        );

        assert_eq!(tx.account_id, account.id);
        assert_eq!(tx.account_number, "1000000000");
        assert_eq!(tx.amount, 100);
        assert_eq!(tx.balance_snapshot, 900);
        assert!(tx.is_success());
    }

    #[test]
    fn test_fail_record_keeps_balance_unchanged() {
        let account = test_account(1000);

        let tx = Transaction::record(
            &account,
            TransactionType::Use,
            TransactionResult::Fail,
            5000,
        );

        assert_eq!(tx.balance_snapshot, 1000);
        assert_eq!(tx.result, TransactionResult::Fail);
        assert!(!tx.is_success());
    }

    #[test]
    fn test_transaction_serialization() {
        let account = test_account(900);
        let tx = Transaction::record(
            &account,
            TransactionType::Cancel,
            TransactionResult::Success,
            100,
        );

        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"CANCEL\""));
        assert!(json.contains("\"SUCCESS\""));

        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.transaction_id, tx.transaction_id);
        assert_eq!(deserialized.balance_snapshot, tx.balance_snapshot);
    }
}
