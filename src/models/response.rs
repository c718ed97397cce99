// src/models/response.rs

use serde::Serialize;
use utoipa::ToSchema;

// Resposta simples para operações sem corpo de retorno (ex: DELETE)
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// Resultado do seed inicial
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: String,
    pub admin: crate::models::auth::User,
    pub bank_accounts: Vec<String>,
}
