// src/handlers/inventory.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        response::ActionResult,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::inventory::{
        LeftoverMatch, LowStockProduct, MovementFilters, MovementOutcome, NewMovement,
        StockMovementView,
    },
};

// ---
// Payload: movimentação + PIN de quem autoriza
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMovementPayload {
    #[serde(flatten)]
    pub movement: NewMovement,

    #[validate(length(min = 4, max = 8, message = "O PIN deve ter entre 4 e 8 dígitos."))]
    pub pin: String,
}

// POST /api/inventory/movements
#[utoipa::path(
    post,
    path = "/api/inventory/movements",
    tag = "Inventory",
    request_body = RecordMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = ActionResult),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "PIN inválido"),
        (status = 404, description = "Produto ou variante não encontrados")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<RecordMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationFields(e).to_api_error(&locale))?;

    let scope = tenant.scope(user.id);

    // 1. Quem autoriza confirma com o PIN
    app_state
        .auth_service
        .verify_pin(&scope, payload.movement.employee_id, &payload.pin)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    // 2. Livro-razão
    let outcome: MovementOutcome = app_state
        .inventory_service
        .record_movement(&app_state.db_pool, &scope, &payload.movement)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = format!(
        "Movimentação ({}) registrada com sucesso!",
        payload.movement.movement_type.label()
    );
    Ok((StatusCode::CREATED, Json(ActionResult::ok(message).with_data(&outcome))))
}

// GET /api/inventory/movements
#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Inventory",
    params(
        MovementFilters,
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Histórico de movimentações, mais recentes primeiro", body = Vec<StockMovementView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Query(filters): Query<MovementFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .inventory_service
        .list_movements(&tenant.scope(user.id), &filters)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockQuery {
    /// Máximo de produtos (1 a 100)
    pub limit: Option<i64>,
}

// GET /api/inventory/low-stock
#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    tag = "Inventory",
    params(
        LowStockQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Produtos abaixo do mínimo", body = Vec<LowStockProduct>)),
    security(("api_jwt" = []))
)]
pub async fn list_low_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<LowStockQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .inventory_service
        .list_low_stock(&tenant.scope(user.id), query.limit.unwrap_or(20))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeftoverQuery {
    /// Esférico, com vírgula ou ponto ("-1,25")
    pub sphere: String,
    /// Cilíndrico, com vírgula ou ponto
    pub cylinder: String,
    pub min_diameter: Option<Decimal>,
}

// GET /api/inventory/leftovers
#[utoipa::path(
    get,
    path = "/api/inventory/leftovers",
    tag = "Inventory",
    params(
        LeftoverQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Sobras compatíveis com o grau", body = Vec<LeftoverMatch>)),
    security(("api_jwt" = []))
)]
pub async fn find_leftovers(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<LeftoverQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .leftover_service
        .find_compatible_leftovers(
            &tenant.scope(user.id),
            &query.sphere,
            &query.cylinder,
            query.min_diameter,
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rows)))
}
