pub mod account_repository;
pub mod account_user_repository;
pub mod transaction_repository;

pub use account_repository::{AccountRepository, PostgresAccountRepository};
pub use account_user_repository::{AccountUserRepository, PostgresAccountUserRepository};
pub use transaction_repository::{PostgresTransactionRepository, TransactionRepository};

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use account_user_repository::MockAccountUserRepository;
#[cfg(test)]
pub use transaction_repository::MockTransactionRepository;

use sqlx::PgPool;

/// Database connection pool type alias.
pub type DbPool = PgPool;
