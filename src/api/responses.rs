use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Account, Transaction, TransactionResult, TransactionType};

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(error: ErrorResponse) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<ValidationErrorDetail>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Validation error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceHealth,
}

/// Service health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub database: bool,
    pub redis: bool,
}

/// Response for a balance use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseBalanceResponse {
    pub account_number: String,
    pub transaction_result: TransactionResult,
    pub transaction_id: String,
    pub amount: i64,
    pub transacted_at: DateTime<Utc>,
}

impl From<Transaction> for UseBalanceResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            account_number: tx.account_number,
            transaction_result: tx.result,
            transaction_id: tx.transaction_id,
            amount: tx.amount,
            transacted_at: tx.transacted_at,
        }
    }
}

/// Response for a balance cancel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBalanceResponse {
    pub account_number: String,
    pub transaction_result: TransactionResult,
    pub transaction_id: String,
    pub amount: i64,
    pub transacted_at: DateTime<Utc>,
}

impl From<Transaction> for CancelBalanceResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            account_number: tx.account_number,
            transaction_result: tx.result,
            transaction_id: tx.transaction_id,
            amount: tx.amount,
            transacted_at: tx.transacted_at,
        }
    }
}

/// Response for a transaction lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryTransactionResponse {
    pub account_number: String,
    pub transaction_type: TransactionType,
    pub transaction_result: TransactionResult,
    pub transaction_id: String,
    pub amount: i64,
    pub balance_snapshot: i64,
    pub transacted_at: DateTime<Utc>,
}

impl From<Transaction> for QueryTransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            account_number: tx.account_number,
            transaction_type: tx.transaction_type,
            transaction_result: tx.result,
            transaction_id: tx.transaction_id,
            amount: tx.amount,
            balance_snapshot: tx.balance_snapshot,
            transacted_at: tx.transacted_at,
        }
    }
}

/// Response for account creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    pub user_id: Uuid,
    pub account_number: String,
    pub registered_at: DateTime<Utc>,
}

impl From<Account> for CreateAccountResponse {
    fn from(account: Account) -> Self {
        Self {
            user_id: account.user_id,
            account_number: account.account_number,
            registered_at: account.registered_at,
        }
    }
}

/// Response for account unregistration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnregisterAccountResponse {
    pub user_id: Uuid,
    pub account_number: String,
    pub unregistered_at: Option<DateTime<Utc>>,
}

impl From<Account> for UnregisterAccountResponse {
    fn from(account: Account) -> Self {
        Self {
            user_id: account.user_id,
            account_number: account.account_number,
            unregistered_at: account.unregistered_at,
        }
    }
}

/// One account in a user's account listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_number: String,
    pub balance: i64,
}

impl From<Account> for AccountInfo {
    fn from(account: Account) -> Self {
        Self {
            account_number: account.account_number,
            balance: account.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success_shape() {
        let response = ApiResponse::success("data");
        assert!(response.success);
        assert_eq!(response.data, Some("data"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_api_response_error_shape() {
        let response =
            ApiResponse::<()>::error(ErrorResponse::new("ACCOUNT_NOT_FOUND", "account not found"));
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.unwrap().code, "ACCOUNT_NOT_FOUND");
    }

    #[test]
    fn test_use_balance_response_from_transaction() {
        let account = Account::open(Uuid::new_v4(), "1000000000".to_string(), 900);
        let tx = Transaction::record(
            &account,
            TransactionType::Use,
            TransactionResult::Success,
            100,
        );

        let response = UseBalanceResponse::from(tx.clone());
        assert_eq!(response.account_number, "1000000000");
        assert_eq!(response.transaction_id, tx.transaction_id);
        assert_eq!(response.amount, 100);
        assert_eq!(response.transaction_result, TransactionResult::Success);
    }

    #[test]
    fn test_account_info_from_account() {
        let account = Account::open(Uuid::new_v4(), "1000000007".to_string(), 1234);
        let info = AccountInfo::from(account);
        assert_eq!(info.account_number, "1000000007");
        assert_eq!(info.balance, 1234);
    }
}
