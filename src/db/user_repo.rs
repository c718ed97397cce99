// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::auth::{User, UserRole},
};

/// Sugestão dada quando o usuário não pode ser apagado.
pub const HISTORY_HINT: &str = "Desactivez-le plutot que de le supprimer.";

const USER_COLUMNS: &str =
    "id, email, password_hash, name, role, is_active, created_at, updated_at";

/// Campos já normalizados para um UPDATE parcial (`None` = mantém o valor).
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (já normalizado)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let maybe_user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let maybe_user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let query = format!("SELECT {} FROM users ORDER BY name ASC", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// E-mails dos administradores ativos (destinatários das notificações).
    pub async fn active_admin_emails(&self) -> Result<Vec<String>, AppError> {
        let emails = sqlx::query_scalar::<_, String>(
            "SELECT email FROM users WHERE role = 'admin' AND is_active = TRUE ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(emails)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        name: &str,
        role: UserRole,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            r#"
            INSERT INTO users (email, password_hash, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(password_hash)
            .bind(name)
            .bind(role)
            .fetch_one(executor)
            .await
            .map_err(map_email_conflict)
    }

    pub async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let query = format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                name = COALESCE($4, name),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.name)
            .bind(changes.role)
            .bind(changes.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_email_conflict)
    }

    /// Sacs, vendas e contas bancárias criados pelo usuário.
    pub async fn authored_counts(&self, id: Uuid) -> Result<(i64, i64, i64), AppError> {
        let counts: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM bags WHERE created_by = $1),
                (SELECT COUNT(*) FROM sales WHERE sold_by = $1),
                (SELECT COUNT(*) FROM bank_accounts WHERE created_by = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        // Uma referência criada entre a contagem e o DELETE ainda cai aqui
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::business(format!("Cet utilisateur est encore reference. {}", HISTORY_HINT))
                }
                _ => AppError::from(e),
            })?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_email_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e, "users_email_key") {
        return AppError::EmailAlreadyExists;
    }
    e.into()
}
