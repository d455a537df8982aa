use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Months, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Account, AccountUser, Transaction, TransactionResult, TransactionType};
use crate::observability::{get_metrics, mask_account_number};
use crate::repositories::{AccountRepository, AccountUserRepository, TransactionRepository};

/// How far back a use transaction can still be compensated.
const CANCEL_WINDOW_MONTHS: u32 = 12;

/// The balance transaction engine.
///
/// Validates and applies balance mutations and writes the ledger entries.
/// The engine itself takes no locks; callers run the mutating operations
/// through the lock interceptor, and the failure-recording operations
/// outside of it.
pub struct TransactionService {
    transaction_repository: Arc<dyn TransactionRepository>,
    account_repository: Arc<dyn AccountRepository>,
    account_user_repository: Arc<dyn AccountUserRepository>,
}

impl TransactionService {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository>,
        account_repository: Arc<dyn AccountRepository>,
        account_user_repository: Arc<dyn AccountUserRepository>,
    ) -> Self {
        Self {
            transaction_repository,
            account_repository,
            account_user_repository,
        }
    }

    /// Debits `amount` from the account and records a SUCCESS/USE entry
    /// whose snapshot is the post-debit balance.
    pub async fn use_balance(
        &self,
        user_id: Uuid,
        account_number: &str,
        amount: i64,
    ) -> Result<Transaction> {
        let started = Instant::now();

        let user = self
            .account_user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let mut account = self
            .account_repository
            .find_by_number(account_number)
            .await?
            .ok_or(AppError::AccountNotFound)?;

        Self::validate_use_balance(&user, &account, amount)?;

        account.use_balance(amount)?;
        let account = self.account_repository.save(&account).await?;

        let transaction = self
            .transaction_repository
            .save(&Transaction::record(
                &account,
                TransactionType::Use,
                TransactionResult::Success,
                amount,
            ))
            .await?;

        get_metrics().record_transaction("use", "success");
        get_metrics().record_engine_latency("use", started.elapsed().as_secs_f64() * 1000.0);
        tracing::info!(
            account = %mask_account_number(account_number),
            amount,
            balance_snapshot = transaction.balance_snapshot,
            transaction_id = %transaction.transaction_id,
            "balance used"
        );

        Ok(transaction)
    }

    fn validate_use_balance(user: &AccountUser, account: &Account, amount: i64) -> Result<()> {
        if !account.is_owned_by(user.id) {
            return Err(AppError::AccountOwnerMismatch);
        }
        if !account.is_in_use() {
            return Err(AppError::AccountAlreadyUnregistered);
        }
        if amount > account.balance {
            return Err(AppError::AmountExceedsBalance);
        }
        Ok(())
    }

    /// Records a FAIL/USE entry with the unchanged balance as snapshot.
    /// Runs outside any lock; never mutates the balance.
    pub async fn save_failed_use_transaction(
        &self,
        account_number: &str,
        amount: i64,
    ) -> Result<()> {
        self.save_failed(account_number, TransactionType::Use, amount)
            .await
    }

    /// Credits `amount` back for a prior use and records a SUCCESS/CANCEL
    /// entry whose snapshot is the post-credit balance.
    pub async fn cancel_balance(
        &self,
        transaction_id: &str,
        account_number: &str,
        amount: i64,
    ) -> Result<Transaction> {
        let started = Instant::now();

        let original = self
            .transaction_repository
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or(AppError::TransactionNotFound)?;
        let mut account = self
            .account_repository
            .find_by_number(account_number)
            .await?
            .ok_or(AppError::AccountNotFound)?;

        Self::validate_cancel_balance(&original, &account, amount)?;

        account.cancel_balance(amount)?;
        let account = self.account_repository.save(&account).await?;

        let transaction = self
            .transaction_repository
            .save(&Transaction::record(
                &account,
                TransactionType::Cancel,
                TransactionResult::Success,
                amount,
            ))
            .await?;

        get_metrics().record_transaction("cancel", "success");
        get_metrics().record_engine_latency("cancel", started.elapsed().as_secs_f64() * 1000.0);
        tracing::info!(
            account = %mask_account_number(account_number),
            amount,
            balance_snapshot = transaction.balance_snapshot,
            cancelled_transaction_id = %original.transaction_id,
            transaction_id = %transaction.transaction_id,
            "balance use cancelled"
        );

        Ok(transaction)
    }

    fn validate_cancel_balance(
        original: &Transaction,
        account: &Account,
        amount: i64,
    ) -> Result<()> {
        if original.account_id != account.id {
            return Err(AppError::TransactionAccountMismatch);
        }
        if original.amount != amount {
            return Err(AppError::TransactionAmountMismatch);
        }
        let cutoff = Utc::now()
            .checked_sub_months(Months::new(CANCEL_WINDOW_MONTHS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        if original.transacted_at < cutoff {
            return Err(AppError::TooOldTransactionToCancel);
        }
        if amount < 0 {
            return Err(AppError::InvalidRequest);
        }
        Ok(())
    }

    /// Records a FAIL/CANCEL entry with the unchanged balance as snapshot.
    pub async fn save_failed_cancel_transaction(
        &self,
        account_number: &str,
        amount: i64,
    ) -> Result<()> {
        self.save_failed(account_number, TransactionType::Cancel, amount)
            .await
    }

    async fn save_failed(
        &self,
        account_number: &str,
        transaction_type: TransactionType,
        amount: i64,
    ) -> Result<()> {
        let account = self
            .account_repository
            .find_by_number(account_number)
            .await?
            .ok_or(AppError::AccountNotFound)?;

        let transaction = self
            .transaction_repository
            .save(&Transaction::record(
                &account,
                transaction_type,
                TransactionResult::Fail,
                amount,
            ))
            .await?;

        let type_label = match transaction_type {
            TransactionType::Use => "use",
            TransactionType::Cancel => "cancel",
        };
        get_metrics().record_transaction(type_label, "fail");
        tracing::info!(
            account = %mask_account_number(account_number),
            amount,
            transaction_id = %transaction.transaction_id,
            "recorded failed {} transaction",
            type_label
        );

        Ok(())
    }

    /// Looks up a ledger entry by its public token.
    pub async fn query_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        get_metrics().record_transaction_query();
        self.transaction_repository
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or(AppError::TransactionNotFound)
    }
}
