// src/handlers/returns.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
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
    models::returns::ReturnRequest,
};

/// Devolução com o funcionário que autoriza (PIN). Estorno direto exige gerente.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReturnPayload {
    #[serde(flatten)]
    pub request: ReturnRequest,

    pub authorizer_id: Uuid,

    #[validate(length(min = 4, max = 8, message = "O PIN deve ter entre 4 e 8 dígitos."))]
    pub authorizer_pin: String,
}

// POST /api/returns
#[utoipa::path(
    post,
    path = "/api/returns",
    tag = "Returns",
    request_body = ProcessReturnPayload,
    responses(
        (status = 200, description = "Devolução processada", body = ActionResult),
        (status = 400, description = "Linhas inválidas ou venda já devolvida"),
        (status = 401, description = "PIN inválido"),
        (status = 403, description = "Estorno direto sem autorização de gerente"),
        (status = 404, description = "Venda não encontrada")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn process_return(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<ProcessReturnPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationFields(e).to_api_error(&locale))?;

    let scope = tenant.scope(user.id);

    let authorizer = app_state
        .auth_service
        .verify_pin(&scope, payload.authorizer_id, &payload.authorizer_pin)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let outcome = app_state
        .return_service
        .process_return(&scope, &payload.request, &authorizer)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::OK,
        Json(ActionResult::ok("Devolução processada com sucesso.").with_data(&outcome)),
    ))
}
