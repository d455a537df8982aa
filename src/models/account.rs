use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Account status indicating the operational state of an account.
/// The transition is one-way: an unregistered account never comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account is registered and can transact.
    InUse,
    /// Account has been unregistered and is permanently inactive.
    Unregistered,
}

impl AccountStatus {
    /// Returns true if the account can participate in balance transactions.
    pub fn is_operational(&self) -> bool {
        matches!(self, AccountStatus::InUse)
    }
}

/// A user-owned balance account. The `account_number` doubles as the lock
/// key for per-account mutual exclusion, so it must stay unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub account_number: String,
    pub user_id: Uuid,
    pub status: AccountStatus,
    pub balance: i64,
    pub registered_at: DateTime<Utc>,
    pub unregistered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Opens a new account for a user with the given number and starting
    /// balance.
    pub fn open(user_id: Uuid, account_number: String, initial_balance: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_number,
            user_id,
            status: AccountStatus::InUse,
            balance: initial_balance,
            registered_at: now,
            unregistered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks if the account is still registered for transactions.
    pub fn is_in_use(&self) -> bool {
        self.status.is_operational()
    }

    /// Checks if the account belongs to the given user.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Debits the balance. The balance can never go negative: a debit
    /// exceeding the current balance is rejected without mutating anything.
    pub fn use_balance(&mut self, amount: i64) -> Result<()> {
        if amount > self.balance {
            return Err(AppError::AmountExceedsBalance);
        }
        self.balance -= amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Credits the balance back for a cancelled use. Negative amounts are
    /// rejected so a cancel can never debit.
    pub fn cancel_balance(&mut self, amount: i64) -> Result<()> {
        if amount < 0 {
            return Err(AppError::InvalidRequest);
        }
        self.balance += amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Unregisters the account permanently.
    pub fn unregister(&mut self) {
        let now = Utc::now();
        self.status = AccountStatus::Unregistered;
        self.unregistered_at = Some(now);
        self.updated_at = now;
    }
}
