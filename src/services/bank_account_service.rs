// src/services/bank_account_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BankAccountRepository,
    models::bank_account::{BankAccountView, CreateBankAccountPayload, UpdateBankAccountPayload},
};

#[derive(Clone)]
pub struct BankAccountService {
    repo: BankAccountRepository,
    pool: sqlx::PgPool,
}

impl BankAccountService {
    pub fn new(repo: BankAccountRepository, pool: sqlx::PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<BankAccountView>, AppError> {
        self.repo.list_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<BankAccountView, AppError> {
        self.repo
            .find_view(id)
            .await?
            .ok_or_else(|| AppError::not_found("Compte bancaire non trouve"))
    }

    pub async fn create(&self, payload: CreateBankAccountPayload, created_by: Uuid) -> Result<BankAccountView, AppError> {
        let description = trimmed(payload.description.as_deref());
        let account = self
            .repo
            .create(&self.pool, payload.label.trim(), description, created_by)
            .await?;

        tracing::info!("Conta bancária criada: {}", account.label);
        self.get(account.id).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdateBankAccountPayload) -> Result<BankAccountView, AppError> {
        let label = payload.label.as_deref().map(str::trim);
        let description = trimmed(payload.description.as_deref());

        self.repo
            .update(id, label, description, payload.is_active)
            .await?
            .ok_or_else(|| AppError::not_found("Compte bancaire non trouve"))?;

        self.get(id).await
    }

    /// Só apaga contas sem nenhuma referência em sacs ou vendas.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.get(id).await?;

        let usage = self.repo.usage(id).await?;
        if usage.is_used() {
            return Err(AppError::business(usage.blocking_message()));
        }

        self.repo.delete(id).await?;
        Ok(())
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
