use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Account, AccountUser};
use crate::observability::mask_account_number;
use crate::repositories::{AccountRepository, AccountUserRepository};

/// Hard cap on accounts per user.
const MAX_ACCOUNTS_PER_USER: i64 = 10;
/// Starting point for sequential account number allocation.
const FIRST_ACCOUNT_NUMBER: &str = "1000000000";

/// Account lifecycle operations: open, unregister, list.
pub struct AccountService {
    account_repository: Arc<dyn AccountRepository>,
    account_user_repository: Arc<dyn AccountUserRepository>,
}

impl AccountService {
    pub fn new(
        account_repository: Arc<dyn AccountRepository>,
        account_user_repository: Arc<dyn AccountUserRepository>,
    ) -> Self {
        Self {
            account_repository,
            account_user_repository,
        }
    }

    /// Opens a new account for the user with a sequentially allocated
    /// account number.
    pub async fn create_account(&self, user_id: Uuid, initial_balance: i64) -> Result<Account> {
        let user = self
            .account_user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if self.account_repository.count_by_user_id(user.id).await? >= MAX_ACCOUNTS_PER_USER {
            return Err(AppError::MaxAccountCountExceeded);
        }

        let account_number = self.next_account_number().await?;
        let account = self
            .account_repository
            .save(&Account::open(user.id, account_number, initial_balance))
            .await?;

        tracing::info!(
            user_id = %user.id,
            account = %mask_account_number(&account.account_number),
            initial_balance,
            "account created"
        );
        Ok(account)
    }

    async fn next_account_number(&self) -> Result<String> {
        match self.account_repository.latest_account_number().await? {
            Some(latest) => {
                let number = latest.parse::<u64>().map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "malformed account number {latest:?}: {e}"
                    ))
                })?;
                Ok((number + 1).to_string())
            }
            None => Ok(FIRST_ACCOUNT_NUMBER.to_string()),
        }
    }

    /// Unregisters an account. One-way; only the owner can do it and only
    /// once the balance is zero.
    pub async fn unregister_account(&self, user_id: Uuid, account_number: &str) -> Result<Account> {
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

        Self::validate_unregister(&user, &account)?;

        account.unregister();
        let account = self.account_repository.save(&account).await?;

        tracing::info!(
            user_id = %user.id,
            account = %mask_account_number(account_number),
            "account unregistered"
        );
        Ok(account)
    }

    fn validate_unregister(user: &AccountUser, account: &Account) -> Result<()> {
        if !account.is_owned_by(user.id) {
            return Err(AppError::AccountOwnerMismatch);
        }
        if !account.is_in_use() {
            return Err(AppError::AccountAlreadyUnregistered);
        }
        if account.balance > 0 {
            return Err(AppError::BalanceRemaining);
        }
        Ok(())
    }

    /// Lists the user's accounts.
    pub async fn get_accounts(&self, user_id: Uuid) -> Result<Vec<Account>> {
        let user = self
            .account_user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.account_repository.find_by_user_id(user.id).await
    }
}
