// src/models/bank_account.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Conta usada para atribuir entradas (vendas) e saídas (compras)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: Uuid,
    pub label: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub account: BankAccount,
    pub created_by_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBankAccountPayload {
    #[validate(length(min = 1, message = "Libelle est requis"))]
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBankAccountPayload {
    #[validate(length(min = 1, message = "Libelle est requis"))]
    pub label: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Contagem de referências que impedem a exclusão de uma conta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountUsage {
    pub bags: i64,
    pub sales: i64,
}

impl AccountUsage {
    pub fn is_used(&self) -> bool {
        self.bags > 0 || self.sales > 0
    }

    pub fn blocking_message(&self) -> String {
        format!(
            "Ce compte est utilise dans {} sac(s) et {} vente(s). Impossible de le supprimer.",
            self.bags, self.sales
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_message_cites_both_counts() {
        let usage = AccountUsage { bags: 2, sales: 1 };
        assert!(usage.is_used());
        assert_eq!(
            usage.blocking_message(),
            "Ce compte est utilise dans 2 sac(s) et 1 vente(s). Impossible de le supprimer."
        );
        assert!(!AccountUsage::default().is_used());
    }

    #[test]
    fn create_payload_requires_label() {
        let payload = CreateBankAccountPayload { label: String::new(), description: None };
        assert!(payload.validate().is_err());
    }
}
