// src/handlers/seed.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::response::SeedResponse};

// POST /api/seed
#[utoipa::path(
    post,
    path = "/api/seed",
    tag = "Seed",
    responses(
        (status = 201, description = "Admin e contas iniciais criados", body = SeedResponse),
        (status = 400, description = "Base já inicializada")
    )
)]
pub async fn seed(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let response = app_state.seed_service.seed().await?;
    Ok((StatusCode::CREATED, Json(response)))
}
