// src/handlers/sales.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::ApiError, response::ActionResult},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::sales::{Sale, SaleStatus},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleStatusPayload {
    pub status: SaleStatus,
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(
        ("id" = Uuid, Path, description = "ID da venda"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Venda", body = Sale),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .sales_service
        .get_sale(&tenant.scope(user.id), sale_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(sale)))
}

// PATCH /api/sales/{id}/status
#[utoipa::path(
    patch,
    path = "/api/sales/{id}/status",
    tag = "Sales",
    request_body = UpdateSaleStatusPayload,
    params(
        ("id" = Uuid, Path, description = "ID da venda"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Status alterado; comissão recalculada ou estornada", body = ActionResult),
        (status = 400, description = "Transição não permitida"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Path(sale_id): Path<Uuid>,
    Json(payload): Json<UpdateSaleStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .sales_service
        .update_sale_status(&tenant.scope(user.id), sale_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = format!("Venda marcada como {}.", sale.status.label());
    Ok((StatusCode::OK, Json(ActionResult::ok(message).with_data(&sale))))
}
