// src/handlers/bags.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
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
    middleware::auth::AuthenticatedUser,
    models::{
        bag::{
            BagListQuery, BagListResponse, BagView, CreateBagPayload, QrCodeQuery, ScanPayload,
            UpdateBagPayload,
        },
        response::MessageResponse,
    },
    services::qr::QrFormat,
};

// GET /api/bags
#[utoipa::path(
    get,
    path = "/api/bags",
    tag = "Bags",
    params(BagListQuery),
    responses(
        (status = 200, description = "Sacs paginados, mais recentes primeiro", body = BagListResponse),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_bags(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<BagListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bags = app_state.bag_service.list(&query).await?;
    Ok((StatusCode::OK, Json(bags)))
}

// POST /api/bags
#[utoipa::path(
    post,
    path = "/api/bags",
    tag = "Bags",
    request_body = CreateBagPayload,
    responses(
        (status = 201, description = "Sac criado com referência MC-AAAA-NNNNN", body = BagView),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bag(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateBagPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let bag = app_state.bag_service.create(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(bag)))
}

// GET /api/bags/{id}
#[utoipa::path(
    get,
    path = "/api/bags/{id}",
    tag = "Bags",
    params(("id" = Uuid, Path, description = "ID do sac")),
    responses(
        (status = 200, description = "Sac", body = BagView),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_bag(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bag = app_state.bag_service.get(id).await?;
    Ok((StatusCode::OK, Json(bag)))
}

// PUT /api/bags/{id}
#[utoipa::path(
    put,
    path = "/api/bags/{id}",
    tag = "Bags",
    params(("id" = Uuid, Path, description = "ID do sac")),
    request_body = UpdateBagPayload,
    responses(
        (status = 200, description = "Sac atualizado (venda sincronizada)", body = BagView),
        (status = 400, description = "Dados inválidos ou venda incompleta"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bag(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateBagPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let bag = app_state.bag_service.update(id, payload, &user).await?;
    Ok((StatusCode::OK, Json(bag)))
}

// DELETE /api/bags/{id}
#[utoipa::path(
    delete,
    path = "/api/bags/{id}",
    tag = "Bags",
    params(("id" = Uuid, Path, description = "ID do sac")),
    responses(
        (status = 200, description = "Sac removido", body = MessageResponse),
        (status = 400, description = "Sac com venda"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bag(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.bag_service.delete(id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("Sac supprime"))))
}

// GET /api/bags/{id}/qrcode
#[utoipa::path(
    get,
    path = "/api/bags/{id}/qrcode",
    tag = "Bags",
    params(("id" = Uuid, Path, description = "ID do sac"), QrCodeQuery),
    responses(
        (status = 200, description = "QR code apontando para a ficha do sac", content_type = "image/png", body = Vec<u8>),
        (status = 400, description = "Formato não suportado"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_bag_qrcode(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<QrCodeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let format = QrFormat::parse(query.format.as_deref())?;
    let image = app_state.bag_service.qr_code(id, format).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, format.content_type())],
        image,
    ))
}

// POST /api/bags/scan
#[utoipa::path(
    post,
    path = "/api/bags/scan",
    tag = "Bags",
    request_body = ScanPayload,
    responses(
        (status = 200, description = "Sac correspondente ao QR code", body = BagView),
        (status = 400, description = "QR code não reconhecido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn scan_bag(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<ScanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let bag = app_state.bag_service.find_by_scan(&payload.text).await?;
    Ok((StatusCode::OK, Json(bag)))
}
