mod common;

use account_ledger::error::AppError;
use account_ledger::models::{TransactionResult, TransactionType};
use account_ledger::repositories::{AccountRepository, TransactionRepository};
use chrono::Utc;
use common::TestContext;
use uuid::Uuid;

#[tokio::test]
async fn test_use_balance_debits_and_records_success() {
    let ctx = TestContext::new();
    let (user, account) = ctx.seed_account("1000000000", 1_000).await;

    let transaction = ctx
        .transaction_service
        .use_balance(user.id, &account.account_number, 100)
        .await
        .expect("Failed to use balance");

    assert_eq!(transaction.transaction_type, TransactionType::Use);
    assert_eq!(transaction.result, TransactionResult::Success);
    assert_eq!(transaction.amount, 100);
    assert_eq!(transaction.balance_snapshot, 900);
    assert_eq!(transaction.transaction_id.len(), 32);

    let stored = ctx
        .account_repository
        .find_by_number(&account.account_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.balance, 900);
}

#[tokio::test]
async fn test_use_balance_unknown_user_is_rejected() {
    let ctx = TestContext::new();
    let (_, account) = ctx.seed_account("1000000000", 1_000).await;

    let result = ctx
        .transaction_service
        .use_balance(Uuid::new_v4(), &account.account_number, 100)
        .await;

    assert!(matches!(result, Err(AppError::UserNotFound)));
}

#[tokio::test]
async fn test_use_balance_over_balance_leaves_account_untouched() {
    let ctx = TestContext::new();
    let (user, account) = ctx.seed_account("1000000000", 50).await;

    let result = ctx
        .transaction_service
        .use_balance(user.id, &account.account_number, 100)
        .await;

    assert!(matches!(result, Err(AppError::AmountExceedsBalance)));

    let stored = ctx
        .account_repository
        .find_by_number(&account.account_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.balance, 50);
    assert!(ctx.transaction_repository.all().await.is_empty());
}

#[tokio::test]
async fn test_save_failed_use_transaction_snapshots_unchanged_balance() {
    let ctx = TestContext::new();
    let (_, account) = ctx.seed_account("1000000000", 1_000).await;

    ctx.transaction_service
        .save_failed_use_transaction(&account.account_number, 5_000)
        .await
        .expect("Failed to record FAIL entry");

    let entries = ctx.transaction_repository.all().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].transaction_type, TransactionType::Use);
    assert_eq!(entries[0].result, TransactionResult::Fail);
    assert_eq!(entries[0].amount, 5_000);
    assert_eq!(entries[0].balance_snapshot, 1_000);

    let stored = ctx
        .account_repository
        .find_by_number(&account.account_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.balance, 1_000);
}

#[tokio::test]
async fn test_cancel_balance_restores_the_debited_amount() {
    let ctx = TestContext::new();
    let (user, account) = ctx.seed_account("1000000000", 1_000).await;

    let used = ctx
        .transaction_service
        .use_balance(user.id, &account.account_number, 100)
        .await
        .expect("Failed to use balance");

    let cancelled = ctx
        .transaction_service
        .cancel_balance(&used.transaction_id, &account.account_number, 100)
        .await
        .expect("Failed to cancel balance");

    assert_eq!(cancelled.transaction_type, TransactionType::Cancel);
    assert_eq!(cancelled.result, TransactionResult::Success);
    assert_eq!(cancelled.balance_snapshot, 1_000);

    let stored = ctx
        .account_repository
        .find_by_number(&account.account_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.balance, 1_000);
}

#[tokio::test]
async fn test_cancel_balance_rejects_a_different_account() {
    let ctx = TestContext::new();
    let (user, account) = ctx.seed_account("1000000000", 1_000).await;
    let (_, other) = ctx.seed_account("1000000001", 1_000).await;

    let used = ctx
        .transaction_service
        .use_balance(user.id, &account.account_number, 100)
        .await
        .expect("Failed to use balance");

    let result = ctx
        .transaction_service
        .cancel_balance(&used.transaction_id, &other.account_number, 100)
        .await;

    assert!(matches!(result, Err(AppError::TransactionAccountMismatch)));
}

#[tokio::test]
async fn test_cancel_balance_rejects_partial_amounts() {
    let ctx = TestContext::new();
    let (user, account) = ctx.seed_account("1000000000", 1_000).await;

    let used = ctx
        .transaction_service
        .use_balance(user.id, &account.account_number, 100)
        .await
        .expect("Failed to use balance");

    let result = ctx
        .transaction_service
        .cancel_balance(&used.transaction_id, &account.account_number, 40)
        .await;

    assert!(matches!(result, Err(AppError::TransactionAmountMismatch)));

    let stored = ctx
        .account_repository
        .find_by_number(&account.account_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.balance, 900);
}

#[tokio::test]
async fn test_cancel_balance_rejects_transactions_older_than_a_year() {
    let ctx = TestContext::new();
    let (user, account) = ctx.seed_account("1000000000", 1_000).await;

    let used = ctx
        .transaction_service
        .use_balance(user.id, &account.account_number, 100)
        .await
        .expect("Failed to use balance");

    // Age the entry past the cancel window.
    let mut aged = ctx
        .transaction_repository
        .find_by_transaction_id(&used.transaction_id)
        .await
        .unwrap()
        .unwrap();
    aged.transacted_at = Utc::now() - chrono::Duration::days(400);
    ctx.transaction_repository.save(&aged).await.unwrap();

    let result = ctx
        .transaction_service
        .cancel_balance(&used.transaction_id, &account.account_number, 100)
        .await;

    assert!(matches!(result, Err(AppError::TooOldTransactionToCancel)));
}

#[tokio::test]
async fn test_cancel_balance_accepts_transactions_within_the_year() {
    let ctx = TestContext::new();
    let (user, account) = ctx.seed_account("1000000000", 1_000).await;

    let used = ctx
        .transaction_service
        .use_balance(user.id, &account.account_number, 100)
        .await
        .expect("Failed to use balance");

    let mut aged = ctx
        .transaction_repository
        .find_by_transaction_id(&used.transaction_id)
        .await
        .unwrap()
        .unwrap();
    aged.transacted_at = Utc::now() - chrono::Duration::days(300);
    ctx.transaction_repository.save(&aged).await.unwrap();

    let cancelled = ctx
        .transaction_service
        .cancel_balance(&used.transaction_id, &account.account_number, 100)
        .await
        .expect("Failed to cancel balance");

    assert_eq!(cancelled.result, TransactionResult::Success);
}

#[tokio::test]
async fn test_save_failed_cancel_transaction_records_fail_entry() {
    let ctx = TestContext::new();
    let (_, account) = ctx.seed_account("1000000000", 1_000).await;

    ctx.transaction_service
        .save_failed_cancel_transaction(&account.account_number, 100)
        .await
        .expect("Failed to record FAIL entry");

    let entries = ctx.transaction_repository.all().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].transaction_type, TransactionType::Cancel);
    assert_eq!(entries[0].result, TransactionResult::Fail);
    assert_eq!(entries[0].balance_snapshot, 1_000);
}

#[tokio::test]
async fn test_query_transaction_returns_the_stored_entry() {
    let ctx = TestContext::new();
    let (user, account) = ctx.seed_account("1000000000", 1_000).await;

    let used = ctx
        .transaction_service
        .use_balance(user.id, &account.account_number, 250)
        .await
        .expect("Failed to use balance");

    let found = ctx
        .transaction_service
        .query_transaction(&used.transaction_id)
        .await
        .expect("Failed to query transaction");

    assert_eq!(found.transaction_id, used.transaction_id);
    assert_eq!(found.amount, 250);
    assert_eq!(found.account_number, account.account_number);
}

#[tokio::test]
async fn test_query_transaction_unknown_token_is_rejected() {
    let ctx = TestContext::new();

    let result = ctx
        .transaction_service
        .query_transaction("0123456789abcdef0123456789abcdef")
        .await;

    assert!(matches!(result, Err(AppError::TransactionNotFound)));
}
