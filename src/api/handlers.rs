use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::requests::{
    CancelBalanceRequest, CreateAccountRequest, ListAccountsQuery, UnregisterAccountRequest,
    UseBalanceRequest,
};
use crate::api::responses::{
    AccountInfo, ApiResponse, CancelBalanceResponse, CreateAccountResponse, ErrorResponse,
    HealthResponse, QueryTransactionResponse, ServiceHealth, UnregisterAccountResponse,
    UseBalanceResponse, ValidationErrorDetail,
};
use crate::error::AppError;
use crate::observability::mask_account_number;

use super::routes::AppState;

/// Maps a service error onto the wire envelope. Server-side failures are
/// logged here and answered without internal detail.
fn error_reply(err: AppError) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
        return (
            status,
            Json(ApiResponse::<()>::error(ErrorResponse::new(
                err.error_code(),
                "An internal error occurred",
            ))),
        );
    }

    (
        status,
        Json(ApiResponse::<()>::error(ErrorResponse::new(
            err.error_code(),
            err.to_string(),
        ))),
    )
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();

    let redis_healthy = state.redis_client.get_multiplexed_async_connection().await.is_ok();

    let response = HealthResponse {
        status: if db_healthy && redis_healthy { "healthy".to_string() } else { "degraded".to_string() },
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        services: ServiceHealth {
            database: db_healthy,
            redis: redis_healthy,
        },
    };

    Json(ApiResponse::success(response))
}

/// Readiness check endpoint.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();

    if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Liveness check endpoint.
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    match &state.metrics_handle {
        Some(handle) => handle.render(),
        None => String::new(),
    }
}

// ============================================================================
// Transaction Handlers
// ============================================================================

/// Debit an account balance.
///
/// The service call runs under the per-account lock; the FAIL entry for a
/// rejected debit is written after the lock has been released.
pub async fn use_balance(
    State(state): State<AppState>,
    Json(request): Json<UseBalanceRequest>,
) -> Result<Json<ApiResponse<UseBalanceResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    if let Err(errors) = request.validate() {
        let details: Vec<ValidationErrorDetail> = errors
            .iter()
            .map(|e| ValidationErrorDetail {
                field: e.field.clone(),
                message: e.message.clone(),
            })
            .collect();

        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(details),
            )),
        ));
    }

    let service = state.transaction_service.clone();
    let user_id = request.user_id;
    let account_number = request.account_number.clone();
    let amount = request.amount;

    let outcome = state
        .lock
        .around(&request, || async move {
            service.use_balance(user_id, &account_number, amount).await
        })
        .await;

    match outcome {
        Ok(transaction) => Ok(Json(ApiResponse::success(UseBalanceResponse::from(transaction)))),
        Err(err) => {
            if err.is_business_error() {
                if let Err(record_err) = state
                    .transaction_service
                    .save_failed_use_transaction(&request.account_number, request.amount)
                    .await
                {
                    tracing::error!(
                        account_number = %mask_account_number(&request.account_number),
                        error = %record_err,
                        "Failed to record FAIL use transaction"
                    );
                }
            }
            Err(error_reply(err))
        }
    }
}

/// Credit back a previously used amount.
pub async fn cancel_balance(
    State(state): State<AppState>,
    Json(request): Json<CancelBalanceRequest>,
) -> Result<Json<ApiResponse<CancelBalanceResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    if let Err(errors) = request.validate() {
        let details: Vec<ValidationErrorDetail> = errors
            .iter()
            .map(|e| ValidationErrorDetail {
                field: e.field.clone(),
                message: e.message.clone(),
            })
            .collect();

        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(details),
            )),
        ));
    }

    let service = state.transaction_service.clone();
    let transaction_id = request.transaction_id.clone();
    let account_number = request.account_number.clone();
    let amount = request.amount;

    let outcome = state
        .lock
        .around(&request, || async move {
            service
                .cancel_balance(&transaction_id, &account_number, amount)
                .await
        })
        .await;

    match outcome {
        Ok(transaction) => Ok(Json(ApiResponse::success(CancelBalanceResponse::from(transaction)))),
        Err(err) => {
            if err.is_business_error() {
                if let Err(record_err) = state
                    .transaction_service
                    .save_failed_cancel_transaction(&request.account_number, request.amount)
                    .await
                {
                    tracing::error!(
                        account_number = %mask_account_number(&request.account_number),
                        error = %record_err,
                        "Failed to record FAIL cancel transaction"
                    );
                }
            }
            Err(error_reply(err))
        }
    }
}

/// Look up a transaction by its public identifier.
pub async fn query_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ApiResponse<QueryTransactionResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.transaction_service.query_transaction(&transaction_id).await {
        Ok(transaction) => Ok(Json(ApiResponse::success(QueryTransactionResponse::from(
            transaction,
        )))),
        Err(err) => Err(error_reply(err)),
    }
}

// ============================================================================
// Account Handlers
// ============================================================================

/// Open a new account for a user.
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateAccountResponse>>), (StatusCode, Json<ApiResponse<()>>)>
{
    if let Err(errors) = request.validate() {
        let details: Vec<ValidationErrorDetail> = errors
            .iter()
            .map(|e| ValidationErrorDetail {
                field: e.field.clone(),
                message: e.message.clone(),
            })
            .collect();

        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(details),
            )),
        ));
    }

    match state
        .account_service
        .create_account(request.user_id, request.initial_balance)
        .await
    {
        Ok(account) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(CreateAccountResponse::from(account))),
        )),
        Err(err) => Err(error_reply(err)),
    }
}

/// Unregister an account once its balance is spent down.
pub async fn unregister_account(
    State(state): State<AppState>,
    Json(request): Json<UnregisterAccountRequest>,
) -> Result<Json<ApiResponse<UnregisterAccountResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    if let Err(errors) = request.validate() {
        let details: Vec<ValidationErrorDetail> = errors
            .iter()
            .map(|e| ValidationErrorDetail {
                field: e.field.clone(),
                message: e.message.clone(),
            })
            .collect();

        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(details),
            )),
        ));
    }

    match state
        .account_service
        .unregister_account(request.user_id, &request.account_number)
        .await
    {
        Ok(account) => Ok(Json(ApiResponse::success(UnregisterAccountResponse::from(
            account,
        )))),
        Err(err) => Err(error_reply(err)),
    }
}

/// List the accounts a user holds.
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<ApiResponse<Vec<AccountInfo>>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.account_service.get_accounts(query.user_id).await {
        Ok(accounts) => {
            let infos: Vec<AccountInfo> = accounts.into_iter().map(AccountInfo::from).collect();
            Ok(Json(ApiResponse::success(infos)))
        }
        Err(err) => Err(error_reply(err)),
    }
}
