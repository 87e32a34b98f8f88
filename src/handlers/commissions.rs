// src/handlers/commissions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        response::ActionResult,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::commission::{CommissionReportQuery, CommissionSummary, SaleCommission},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayCommissionsPayload {
    pub employee_id: Uuid,
    #[validate(length(min = 1, message = "Selecione ao menos uma comissão."))]
    pub commission_ids: Vec<Uuid>,
}

// POST /api/commissions/sales/{id}/recompute
#[utoipa::path(
    post,
    path = "/api/commissions/sales/{id}/recompute",
    tag = "Commissions",
    params(
        ("id" = Uuid, Path, description = "ID da venda"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Cálculo disparado", body = ActionResult)),
    security(("api_jwt" = []))
)]
pub async fn recompute_commission(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Path(sale_id): Path<Uuid>,
) -> impl IntoResponse {
    // Nunca falha para quem chamou; erros ficam no log
    app_state
        .commission_service
        .recompute_commission(&tenant.scope(user.id), sale_id)
        .await;

    (StatusCode::OK, Json(ActionResult::ok("Comissão recalculada.")))
}

// GET /api/commissions/sales/{id}
#[utoipa::path(
    get,
    path = "/api/commissions/sales/{id}",
    tag = "Commissions",
    params(
        ("id" = Uuid, Path, description = "ID da venda"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Comissões da venda, estornos incluídos", body = Vec<SaleCommission>)),
    security(("api_jwt" = []))
)]
pub async fn list_sale_commissions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let commissions = app_state
        .commission_service
        .sale_commissions(&tenant.scope(user.id), sale_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(commissions)))
}

// POST /api/commissions/pay
#[utoipa::path(
    post,
    path = "/api/commissions/pay",
    tag = "Commissions",
    request_body = PayCommissionsPayload,
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Comissões pendentes marcadas como pagas", body = ActionResult),
        (status = 400, description = "Nenhuma comissão informada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_commissions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<PayCommissionsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationFields(e).to_api_error(&locale))?;

    let paid = app_state
        .commission_service
        .pay_commissions_batch(&tenant.scope(user.id), payload.employee_id, &payload.commission_ids)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = format!("{} comissão(ões) paga(s).", paid);
    Ok((
        StatusCode::OK,
        Json(ActionResult::ok(message).with_data(&serde_json::json!({ "paid": paid }))),
    ))
}

// GET /api/commissions/report
#[utoipa::path(
    get,
    path = "/api/commissions/report",
    tag = "Commissions",
    params(
        CommissionReportQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Resumo por funcionário", body = Vec<CommissionSummary>)),
    security(("api_jwt" = []))
)]
pub async fn commission_report(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<CommissionReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .commission_service
        .commission_report(&tenant.scope(user.id), query.start_date, query.end_date)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}
