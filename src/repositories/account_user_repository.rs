use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::AccountUser;

/// Lookup interface for account owners.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountUserRepository: Send + Sync {
    async fn save(&self, user: &AccountUser) -> Result<AccountUser>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountUser>>;
}

/// PostgreSQL-backed user store.
pub struct PostgresAccountUserRepository {
    pool: PgPool,
}

impl PostgresAccountUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountUserRepository for PostgresAccountUserRepository {
    async fn save(&self, user: &AccountUser) -> Result<AccountUser> {
        let row = sqlx::query_as::<_, AccountUser>(
            r#"
            INSERT INTO account_users (id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                updated_at = EXCLUDED.updated_at
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountUser>> {
        let row = sqlx::query_as::<_, AccountUser>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM account_users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }
}
