// src/common/error.rs

use std::borrow::Cow;
use std::collections::HashMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// As mensagens são exibidas ao usuário final (francês).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", first_validation_message(.0))]
    ValidationError(#[from] ValidationErrors),

    #[error("Requete invalide: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Parametre invalide: {}", .0.body_text())]
    InvalidPath(#[from] PathRejection),

    #[error("Parametre invalide: {}", .0.body_text())]
    InvalidQuery(#[from] QueryRejection),

    // Regra de negócio violada (sac déjà vendu, compte utilisé, etc.)
    #[error("{0}")]
    BusinessRule(String),

    #[error("Un utilisateur avec cet email existe deja")]
    EmailAlreadyExists,

    #[error("Un compte avec ce libelle existe deja")]
    BankAccountLabelAlreadyExists,

    #[error("Email ou mot de passe invalide")]
    InvalidCredentials,

    #[error("Non autorise")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    // Variante para erros de banco de dados
    #[error("Erreur de base de donnees: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erreur interne: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erreur de hachage: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erreur de jeton: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Erro de validação manual atribuído a um único campo,
    /// no mesmo formato dos erros do `validator`.
    pub fn field(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        let mut error = ValidationError::new("invalid");
        error.message = Some(message.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn business(message: impl Into<String>) -> Self {
        AppError::BusinessRule(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidBody(_)
            | AppError::InvalidPath(_)
            | AppError::InvalidQuery(_)
            | AppError::BusinessRule(_)
            | AppError::EmailAlreadyExists
            | AppError::BankAccountLabelAlreadyExists => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Campos ordenados por nome para que a "primeira" mensagem seja estável.
fn sorted_field_messages(errors: &ValidationErrors) -> Vec<(String, Vec<String>)> {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages = field_errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Champ invalide: {}", field),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
}

fn first_validation_message(errors: &ValidationErrors) -> String {
    sorted_field_messages(errors)
        .into_iter()
        .find_map(|(_, messages)| messages.into_iter().next())
        .unwrap_or_else(|| "Donnees invalides".to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            // Primeira mensagem em `error`, detalhes completos em `details`.
            AppError::ValidationError(errors) => {
                let details: HashMap<String, Vec<String>> =
                    sorted_field_messages(errors).into_iter().collect();
                json!({
                    "error": first_validation_message(errors),
                    "details": details,
                })
            }
            AppError::InvalidBody(rejection) => {
                json!({ "error": format!("Requete invalide: {}", rejection.body_text()) })
            }
            // Todos os erros internos viram 500 com mensagem genérica;
            // o detalhe fica apenas no log.
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({ "error": "Une erreur inattendue est survenue" })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rstest::rstest;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(AppError::business("Ce sac a deja ete vendu"), StatusCode::BAD_REQUEST)]
    #[case(AppError::InvalidToken, StatusCode::UNAUTHORIZED)]
    #[case(AppError::Forbidden("Acces reserve aux administrateurs".into()), StatusCode::FORBIDDEN)]
    #[case(AppError::not_found("Sac non trouve"), StatusCode::NOT_FOUND)]
    #[case(AppError::EmailAlreadyExists, StatusCode::BAD_REQUEST)]
    #[tokio::test]
    async fn maps_errors_to_status_and_message(#[case] error: AppError, #[case] expected: StatusCode) {
        let message = error.to_string();
        let (status, body) = body_json(error).await;
        assert_eq!(status, expected);
        assert_eq!(body["error"], message);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) =
            body_json(AppError::InternalServerError(anyhow::anyhow!("connexion perdue"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Une erreur inattendue est survenue");
    }

    #[tokio::test]
    async fn validation_error_reports_first_field_message() {
        let mut errors = ValidationErrors::new();
        let mut price = ValidationError::new("range");
        price.message = Some("Le prix ne peut pas etre negatif".into());
        errors.add("purchasePrice", price);
        let mut brand = ValidationError::new("length");
        brand.message = Some("Marque est requise".into());
        errors.add("brand", brand);

        let (status, body) = body_json(AppError::ValidationError(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Marque est requise");
        assert_eq!(body["details"]["purchasePrice"][0], "Le prix ne peut pas etre negatif");
    }

    #[test]
    fn field_helper_builds_single_field_error() {
        let error = AppError::field("salePrice", "Prix de vente requis");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "Prix de vente requis");
    }
}
