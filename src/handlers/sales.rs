// src/handlers/sales.rs

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
        extract::{AppJson, AppPath, AppQuery},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::{
        response::MessageResponse,
        sale::{CreateSalePayload, SaleListQuery, SaleListResponse, SaleView, UpdateSalePayload},
    },
};

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(SaleListQuery),
    responses(
        (status = 200, description = "Vendas paginadas por data de venda", body = SaleListResponse),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<SaleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sale_service.list(&query).await?;
    Ok((StatusCode::OK, Json(sales)))
}

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada, sac marcado como vendu", body = SaleView),
        (status = 400, description = "Dados inválidos ou sac já vendido"),
        (status = 404, description = "Sac não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let sale = app_state.sale_service.create(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda", body = SaleView),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sale_service.get(id).await?;
    Ok((StatusCode::OK, Json(sale)))
}

// PUT /api/sales/{id}
#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    request_body = UpdateSalePayload,
    responses(
        (status = 200, description = "Venda atualizada, margem recalculada", body = SaleView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let sale = app_state.sale_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(sale)))
}

// DELETE /api/sales/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda removida, sac de volta a en_vente", body = MessageResponse),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.sale_service.delete(id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("Vente supprimee"))))
}
