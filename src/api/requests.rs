use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lock::LockTarget;

/// Bounds carried over from the public API contract.
const ACCOUNT_NUMBER_LEN: usize = 10;
const TRANSACTION_ID_LEN: usize = 32;
const MIN_AMOUNT: i64 = 10;
const MAX_AMOUNT: i64 = 1_000_000_000;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

fn validate_account_number(errors: &mut Vec<ValidationError>, account_number: &str) {
    // Account numbers are allocated as fixed-width decimal strings.
    if account_number.len() != ACCOUNT_NUMBER_LEN
        || !account_number.bytes().all(|b| b.is_ascii_digit())
    {
        errors.push(ValidationError {
            field: "account_number".to_string(),
            message: format!("account_number must be exactly {} digits", ACCOUNT_NUMBER_LEN),
        });
    }
}

fn validate_amount(errors: &mut Vec<ValidationError>, amount: i64) {
    if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        errors.push(ValidationError {
            field: "amount".to_string(),
            message: format!("amount must be between {} and {}", MIN_AMOUNT, MAX_AMOUNT),
        });
    }
}

/// Request to debit an account balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseBalanceRequest {
    pub user_id: Uuid,
    pub account_number: String,
    pub amount: i64,
}

impl UseBalanceRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        validate_account_number(&mut errors, &self.account_number);
        validate_amount(&mut errors, self.amount);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl LockTarget for UseBalanceRequest {
    fn lock_key(&self) -> &str {
        &self.account_number
    }
}

/// Request to cancel a prior balance use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBalanceRequest {
    pub transaction_id: String,
    pub account_number: String,
    pub amount: i64,
}

impl CancelBalanceRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.transaction_id.len() != TRANSACTION_ID_LEN {
            errors.push(ValidationError {
                field: "transaction_id".to_string(),
                message: format!("transaction_id must be exactly {} characters", TRANSACTION_ID_LEN),
            });
        }
        validate_account_number(&mut errors, &self.account_number);
        validate_amount(&mut errors, self.amount);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl LockTarget for CancelBalanceRequest {
    fn lock_key(&self) -> &str {
        &self.account_number
    }
}

/// Request to open a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: Uuid,
    pub initial_balance: i64,
}

impl CreateAccountRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.initial_balance < 0 {
            errors.push(ValidationError {
                field: "initial_balance".to_string(),
                message: "initial_balance cannot be negative".to_string(),
            });
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Request to unregister an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnregisterAccountRequest {
    pub user_id: Uuid,
    pub account_number: String,
}

impl UnregisterAccountRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        validate_account_number(&mut errors, &self.account_number);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Query parameters for listing a user's accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAccountsQuery {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_balance_request_validation() {
        let valid_request = UseBalanceRequest {
            user_id: Uuid::new_v4(),
            account_number: "1000000000".to_string(),
            amount: 100,
        };
        assert!(valid_request.validate().is_ok());

        let short_number = UseBalanceRequest {
            account_number: "123".to_string(),
            ..valid_request.clone()
        };
        assert!(short_number.validate().is_err());

        let non_digit = UseBalanceRequest {
            account_number: "12345abcde".to_string(),
            ..valid_request.clone()
        };
        assert!(non_digit.validate().is_err());

        // 10 bytes of multibyte text is not a valid account number
        let multibyte = UseBalanceRequest {
            account_number: "€€€a".to_string(),
            ..valid_request.clone()
        };
        assert!(multibyte.validate().is_err());

        let tiny_amount = UseBalanceRequest {
            amount: 9,
            ..valid_request.clone()
        };
        assert!(tiny_amount.validate().is_err());

        let huge_amount = UseBalanceRequest {
            amount: 1_000_000_001,
            ..valid_request
        };
        assert!(huge_amount.validate().is_err());
    }

    #[test]
    fn test_cancel_balance_request_validation() {
        let valid_request = CancelBalanceRequest {
            transaction_id: "c2033bb6d82a4250aecf7e27c49b63f6".to_string(),
            account_number: "1000000000".to_string(),
            amount: 100,
        };
        assert!(valid_request.validate().is_ok());

        let bad_token = CancelBalanceRequest {
            transaction_id: "short".to_string(),
            ..valid_request
        };
        let errors = bad_token.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "transaction_id");
    }

    #[test]
    fn test_create_account_request_validation() {
        let valid_request = CreateAccountRequest {
            user_id: Uuid::new_v4(),
            initial_balance: 0,
        };
        assert!(valid_request.validate().is_ok());

        let negative = CreateAccountRequest {
            initial_balance: -1,
            ..valid_request
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_lockable_requests_expose_account_number() {
        let use_request = UseBalanceRequest {
            user_id: Uuid::new_v4(),
            account_number: "1000000000".to_string(),
            amount: 100,
        };
        assert_eq!(use_request.lock_key(), "1000000000");

        let cancel_request = CancelBalanceRequest {
            transaction_id: "c2033bb6d82a4250aecf7e27c49b63f6".to_string(),
            account_number: "1000000001".to_string(),
            amount: 100,
        };
        assert_eq!(cancel_request.lock_key(), "1000000001");
    }
}
