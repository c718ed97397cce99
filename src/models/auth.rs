// src/models/auth.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin, // Administrateur
    #[default]
    Seller, // Vendeur
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Seller => "seller",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "seller" => Ok(UserRole::Seller),
            other => Err(format!("Role inconnu: {}", other)),
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub name: String,
    pub role: UserRole,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caracteres"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // Subject (ID do usuário)
    pub role: UserRole, // Papel no momento da emissão
    pub exp: usize,     // Expiration time
    pub iat: usize,     // Issued At
}

// --- Gestão de usuários (admin) ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caracteres"))]
    pub password: String,
    #[validate(length(min = 1, message = "Nom est requis"))]
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(email(message = "Email invalide"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caracteres"))]
    pub password: Option<String>,
    #[validate(length(min = 1, message = "Nom est requis"))]
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// E-mails são guardados sempre normalizados.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = crate::test_support::sample_user(UserRole::Seller);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "seller");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn update_payload_validates_only_present_fields() {
        let payload: UpdateUserPayload = serde_json::from_str(r#"{"isActive": false}"#).unwrap();
        assert!(payload.validate().is_ok());

        let payload: UpdateUserPayload = serde_json::from_str(r#"{"password": "abc"}"#).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn normalizes_emails() {
        assert_eq!(normalize_email("  Nadia@MonCoeur.app "), "nadia@moncoeur.app");
    }
}
