// src/handlers/bank_accounts.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::{
        bank_account::{BankAccountView, CreateBankAccountPayload, UpdateBankAccountPayload},
        response::MessageResponse,
    },
};

// GET /api/bank-accounts
#[utoipa::path(
    get,
    path = "/api/bank-accounts",
    tag = "Bank Accounts",
    responses((status = 200, description = "Contas ordenadas por libellé", body = Vec<BankAccountView>)),
    security(("api_jwt" = []))
)]
pub async fn list_bank_accounts(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let accounts = app_state.bank_account_service.list().await?;
    Ok((StatusCode::OK, Json(accounts)))
}

// GET /api/bank-accounts/{id}
#[utoipa::path(
    get,
    path = "/api/bank-accounts/{id}",
    tag = "Bank Accounts",
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses(
        (status = 200, description = "Conta", body = BankAccountView),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_bank_account(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let account = app_state.bank_account_service.get(id).await?;
    Ok((StatusCode::OK, Json(account)))
}

// POST /api/bank-accounts
#[utoipa::path(
    post,
    path = "/api/bank-accounts",
    tag = "Bank Accounts",
    request_body = CreateBankAccountPayload,
    responses(
        (status = 201, description = "Conta criada", body = BankAccountView),
        (status = 400, description = "Libellé inválido ou já usado"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bank_account(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateBankAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let account = app_state.bank_account_service.create(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

// PUT /api/bank-accounts/{id}
#[utoipa::path(
    put,
    path = "/api/bank-accounts/{id}",
    tag = "Bank Accounts",
    params(("id" = Uuid, Path, description = "ID da conta")),
    request_body = UpdateBankAccountPayload,
    responses(
        (status = 200, description = "Conta atualizada", body = BankAccountView),
        (status = 400, description = "Libellé inválido ou já usado"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bank_account(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateBankAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let account = app_state.bank_account_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(account)))
}

// DELETE /api/bank-accounts/{id}
#[utoipa::path(
    delete,
    path = "/api/bank-accounts/{id}",
    tag = "Bank Accounts",
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses(
        (status = 200, description = "Conta removida", body = MessageResponse),
        (status = 400, description = "Conta ainda referenciada"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bank_account(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.bank_account_service.delete(id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("Compte supprime"))))
}
