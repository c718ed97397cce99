// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        user_repo::{UserChanges, HISTORY_HINT},
        UserRepository,
    },
    models::auth::{normalize_email, CreateUserPayload, UpdateUserPayload, User},
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    pool: sqlx::PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, pool: sqlx::PgPool) -> Self {
        Self { user_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Utilisateur non trouve"))
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User, AppError> {
        let password_hash = hash_password(&payload.password).await?;
        let user = self
            .user_repo
            .create_user(
                &self.pool,
                &normalize_email(&payload.email),
                &password_hash,
                payload.name.trim(),
                payload.role,
            )
            .await?;

        tracing::info!("Usuário criado: {} ({})", user.email, user.role);
        Ok(user)
    }

    pub async fn update(&self, actor: &User, id: Uuid, payload: UpdateUserPayload) -> Result<User, AppError> {
        ensure_not_self_deactivation(actor.id, id, &payload)?;

        let password_hash = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let changes = UserChanges {
            email: payload.email.as_deref().map(normalize_email),
            password_hash,
            name: payload.name.map(|name| name.trim().to_string()),
            role: payload.role,
            is_active: payload.is_active,
        };

        self.user_repo
            .update_user(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("Utilisateur non trouve"))
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        if actor.id == id {
            return Err(AppError::business("Vous ne pouvez pas supprimer votre propre compte"));
        }

        // Garante o 404 antes de olhar as referências
        self.get(id).await?;

        let (bags, sales, accounts) = self.user_repo.authored_counts(id).await?;
        ensure_without_history(bags, sales, accounts)?;

        self.user_repo.delete_user(id).await?;
        tracing::info!("Usuário {} removido por {}", id, actor.email);
        Ok(())
    }
}

fn ensure_not_self_deactivation(actor_id: Uuid, target_id: Uuid, payload: &UpdateUserPayload) -> Result<(), AppError> {
    if actor_id == target_id && payload.is_active == Some(false) {
        return Err(AppError::business("Vous ne pouvez pas desactiver votre propre compte"));
    }
    Ok(())
}

// Quem já cadastrou sacs ou vendas fica no histórico: desativa-se em vez de apagar
fn ensure_without_history(bags: i64, sales: i64, accounts: i64) -> Result<(), AppError> {
    let created = match (bags > 0 || sales > 0, accounts > 0) {
        (_, true) => format!(
            "{} sac(s), {} vente(s) et {} compte(s) bancaire(s)",
            bags, sales, accounts
        ),
        (true, false) => format!("{} sac(s) et {} vente(s)", bags, sales),
        (false, false) => return Ok(()),
    };
    Err(AppError::business(format!(
        "Cet utilisateur a cree {}. {}",
        created, HISTORY_HINT
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_cannot_deactivate_themselves() {
        let me = Uuid::new_v4();
        let payload = UpdateUserPayload { is_active: Some(false), ..Default::default() };
        let err = ensure_not_self_deactivation(me, me, &payload).unwrap_err();
        assert_eq!(err.to_string(), "Vous ne pouvez pas desactiver votre propre compte");

        assert!(ensure_not_self_deactivation(me, Uuid::new_v4(), &payload).is_ok());
        let rename = UpdateUserPayload { name: Some("Nadia B.".into()), ..Default::default() };
        assert!(ensure_not_self_deactivation(me, me, &rename).is_ok());
    }

    #[test]
    fn users_with_history_are_kept() {
        let err = ensure_without_history(3, 0, 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cet utilisateur a cree 3 sac(s) et 0 vente(s). Desactivez-le plutot que de le supprimer."
        );
        assert!(ensure_without_history(0, 0, 0).is_ok());
    }

    #[test]
    fn bank_accounts_alone_block_deletion() {
        let err = ensure_without_history(0, 0, 2).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Cet utilisateur a cree 0 sac(s), 0 vente(s) et 2 compte(s) bancaire(s). \
             Desactivez-le plutot que de le supprimer."
        );
    }
}
