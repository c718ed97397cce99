// src/handlers/export.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    common::{error::AppError, extract::AppQuery},
    config::AppState,
    models::export::ExportQuery,
};

// GET /api/export
#[utoipa::path(
    get,
    path = "/api/export",
    tag = "Export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV separado por ponto e vírgula", content_type = "text/csv", body = String),
        (status = 400, description = "Tipo ou formato inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_csv(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let kind = query.kind()?;
    query.ensure_csv()?;

    let export = app_state
        .export_service
        .export(kind, Utc::now().date_naive())
        .await?;

    // Configura os Headers para o navegador baixar o arquivo
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];

    Ok((StatusCode::OK, headers, export.content))
}
