// src/handlers/import.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::AppError, extract::read_file_field},
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::{import::ImportResult, upload::FileUploadForm},
};

// POST /api/import
#[utoipa::path(
    post,
    path = "/api/import",
    tag = "Import",
    request_body(content = FileUploadForm, content_type = "multipart/form-data", description = "Campo `file` com a planilha .xlsx"),
    responses(
        (status = 200, description = "Resumo da importação (erros por linha incluídos)", body = ImportResult),
        (status = 400, description = "Arquivo ausente ou ilegível"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_workbook(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let file = read_file_field(&mut multipart, "file").await?;
    tracing::info!(
        "Importação de {:?} ({} bytes) iniciada por {}",
        file.file_name,
        file.bytes.len(),
        user.email
    );

    let result = app_state.import_service.import(file.bytes, user.id).await?;
    Ok((StatusCode::OK, Json(result)))
}
