// src/services/seed_service.rs

use crate::{
    common::error::AppError,
    db::{BankAccountRepository, UserRepository},
    models::{
        auth::{normalize_email, UserRole},
        response::SeedResponse,
    },
    services::{auth::hash_password, import_service::capitalize},
};

/// Administrador criado pelo seed (vem das variáveis `SEED_ADMIN_*`).
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    /// Sem senha configurada o seed fica indisponível.
    pub password: Option<String>,
    pub name: String,
}

#[derive(Clone)]
pub struct SeedService {
    pool: sqlx::PgPool,
    user_repo: UserRepository,
    bank_account_repo: BankAccountRepository,
    admin: SeedAdmin,
    seller_sheets: Vec<String>,
}

impl SeedService {
    pub fn new(
        pool: sqlx::PgPool,
        user_repo: UserRepository,
        bank_account_repo: BankAccountRepository,
        admin: SeedAdmin,
        seller_sheets: Vec<String>,
    ) -> Self {
        Self {
            pool,
            user_repo,
            bank_account_repo,
            admin,
            seller_sheets,
        }
    }

    /// Só roda com a base vazia: primeiro admin e uma conta por vendedor.
    pub async fn seed(&self) -> Result<SeedResponse, AppError> {
        if self.user_repo.count().await? > 0 {
            return Err(AppError::business("Base deja initialisee"));
        }

        let password = self
            .admin
            .password
            .as_deref()
            .ok_or_else(|| AppError::business("SEED_ADMIN_PASSWORD n'est pas configure"))?;
        let password_hash = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;
        let admin = self
            .user_repo
            .create_user(
                &mut *tx,
                &normalize_email(&self.admin.email),
                &password_hash,
                self.admin.name.trim(),
                UserRole::Admin,
            )
            .await?;

        let mut bank_accounts = Vec::with_capacity(self.seller_sheets.len());
        for seller in &self.seller_sheets {
            let label = capitalize(seller);
            if label.is_empty() {
                continue;
            }
            let description = format!("Compte {}", label);
            self.bank_account_repo
                .create(&mut *tx, &label, Some(&description), admin.id)
                .await?;
            bank_accounts.push(label);
        }
        tx.commit().await?;

        tracing::info!("Base inicializada: admin {} e {} contas", admin.email, bank_accounts.len());
        Ok(SeedResponse {
            message: "Base initialisee".to_string(),
            admin,
            bank_accounts,
        })
    }
}
