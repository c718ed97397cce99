// src/handlers/upload.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::{
    common::{
        error::AppError,
        extract::{AppQuery, read_file_field},
    },
    config::AppState,
    models::{
        response::MessageResponse,
        upload::{DeleteUploadQuery, FileUploadForm, UploadResponse},
    },
    services::storage::{build_blob_key, validate_upload},
};

// POST /api/upload
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Upload",
    request_body(content = FileUploadForm, content_type = "multipart/form-data", description = "Campo `file` com a imagem"),
    responses(
        (status = 200, description = "Imagem armazenada", body = UploadResponse),
        (status = 400, description = "Tipo ou tamanho inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_image(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let file = read_file_field(&mut multipart, "file").await?;
    let extension = validate_upload(file.content_type.as_deref(), file.bytes.len())?;

    let key = build_blob_key(extension, Utc::now().timestamp_millis());
    let url = app_state.blob_store.put(&key, file.bytes).await?;
    tracing::info!("Imagem {} armazenada ({:?})", key, file.file_name);

    Ok((StatusCode::OK, Json(UploadResponse { url, filename: key })))
}

// DELETE /api/upload?url=
#[utoipa::path(
    delete,
    path = "/api/upload",
    tag = "Upload",
    params(DeleteUploadQuery),
    responses(
        (status = 200, description = "Imagem removida", body = MessageResponse),
        (status = 400, description = "URL ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_image(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<DeleteUploadQuery>,
) -> Result<impl IntoResponse, AppError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::business("URL requise"))?;

    app_state.blob_store.delete(url).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("Image supprimee"))))
}
