use axum::http::StatusCode;
use thiserror::Error;

/// Unified error type for the account ledger.
///
/// Business-validation variants map onto stable error codes consumed by the
/// HTTP surface; infrastructure failures are folded into the `Database`,
/// `Redis` and `Internal` buckets.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("user not found")]
    UserNotFound,

    #[error("account not found")]
    AccountNotFound,

    #[error("user is not the owner of the account")]
    AccountOwnerMismatch,

    #[error("account is already unregistered")]
    AccountAlreadyUnregistered,

    #[error("use amount exceeds the account balance")]
    AmountExceedsBalance,

    #[error("account still holds a balance")]
    BalanceRemaining,

    #[error("user already holds the maximum number of accounts")]
    MaxAccountCountExceeded,

    #[error("transaction not found")]
    TransactionNotFound,

    #[error("transaction does not belong to the account")]
    TransactionAccountMismatch,

    #[error("cancel amount does not match the transaction amount")]
    TransactionAmountMismatch,

    #[error("transaction is too old to cancel")]
    TooOldTransactionToCancel,

    #[error("invalid request")]
    InvalidRequest,

    #[error("account is in use by another transaction")]
    LockBusy,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("lock backend error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code surfaced in API error responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AppError::AccountOwnerMismatch => "ACCOUNT_OWNER_MISMATCH",
            AppError::AccountAlreadyUnregistered => "ACCOUNT_ALREADY_UNREGISTERED",
            AppError::AmountExceedsBalance => "AMOUNT_EXCEEDS_BALANCE",
            AppError::BalanceRemaining => "BALANCE_REMAINING",
            AppError::MaxAccountCountExceeded => "MAX_ACCOUNT_COUNT_EXCEEDED",
            AppError::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            AppError::TransactionAccountMismatch => "TRANSACTION_ACCOUNT_MISMATCH",
            AppError::TransactionAmountMismatch => "TRANSACTION_AMOUNT_MISMATCH",
            AppError::TooOldTransactionToCancel => "TOO_OLD_TRANSACTION_TO_CANCEL",
            AppError::InvalidRequest => "INVALID_REQUEST",
            AppError::LockBusy => "ACCOUNT_TRANSACTION_LOCK",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Redis(_) => "LOCK_BACKEND_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for the API layer.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UserNotFound
            | AppError::AccountNotFound
            | AppError::TransactionNotFound => StatusCode::NOT_FOUND,
            AppError::AccountOwnerMismatch => StatusCode::UNAUTHORIZED,
            AppError::AccountAlreadyUnregistered
            | AppError::AmountExceedsBalance
            | AppError::BalanceRemaining
            | AppError::MaxAccountCountExceeded
            | AppError::TransactionAccountMismatch
            | AppError::TransactionAmountMismatch
            | AppError::TooOldTransactionToCancel
            | AppError::InvalidRequest => StatusCode::BAD_REQUEST,
            AppError::LockBusy => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Redis(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True for business-validation failures.
    ///
    /// The HTTP layer records a FAIL transaction only for these; lock
    /// contention and infrastructure errors do not produce ledger entries.
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            AppError::LockBusy
                | AppError::Database(_)
                | AppError::Redis(_)
                | AppError::Internal(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
