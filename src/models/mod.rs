pub mod account;
pub mod account_user;
pub mod transaction;

pub use account::{Account, AccountStatus};
pub use account_user::AccountUser;
pub use transaction::{Transaction, TransactionResult, TransactionType};
