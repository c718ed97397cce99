// src/db/bank_account_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::bank_account::{AccountUsage, BankAccount, BankAccountView},
};

const VIEW_SELECT: &str = r#"
    SELECT
        ba.id, ba.label, ba.description, ba.is_active, ba.created_by,
        ba.created_at, ba.updated_at,
        u.name AS created_by_name
    FROM bank_accounts ba
    LEFT JOIN users u ON u.id = ba.created_by
"#;

#[derive(Clone)]
pub struct BankAccountRepository {
    pool: PgPool,
}

impl BankAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<BankAccountView>, AppError> {
        let query = format!("{} ORDER BY ba.label ASC", VIEW_SELECT);
        let accounts = sqlx::query_as::<_, BankAccountView>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    pub async fn find_view(&self, id: Uuid) -> Result<Option<BankAccountView>, AppError> {
        let query = format!("{} WHERE ba.id = $1", VIEW_SELECT);
        let account = sqlx::query_as::<_, BankAccountView>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bank_accounts WHERE id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    /// Busca por libellé ignorando maiúsculas/minúsculas.
    pub async fn find_by_label_ci<'e, E>(
        &self,
        executor: E,
        label: &str,
    ) -> Result<Option<BankAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            "SELECT * FROM bank_accounts WHERE LOWER(label) = LOWER($1) LIMIT 1",
        )
        .bind(label)
        .fetch_optional(executor)
        .await?;
        Ok(account)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        label: &str,
        description: Option<&str>,
        created_by: Uuid,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, BankAccount>(
            r#"
            INSERT INTO bank_accounts (label, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(label)
        .bind(description)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(map_label_conflict)
    }

    pub async fn update(
        &self,
        id: Uuid,
        label: Option<&str>,
        description: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Option<BankAccount>, AppError> {
        sqlx::query_as::<_, BankAccount>(
            r#"
            UPDATE bank_accounts SET
                label = COALESCE($2, label),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(label)
        .bind(description)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_label_conflict)
    }

    /// Referências em sacs (compra) e vendas (recebimento).
    pub async fn usage(&self, id: Uuid) -> Result<AccountUsage, AppError> {
        let (bags, sales): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM bags WHERE purchase_bank_account_id = $1),
                (SELECT COUNT(*) FROM sales WHERE bank_account_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(AccountUsage { bags, sales })
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_label_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e, "bank_accounts_label_key") {
        return AppError::BankAccountLabelAlreadyExists;
    }
    e.into()
}
