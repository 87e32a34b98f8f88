// src/handlers/wallet.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::wallet::WalletStatement,
};

// GET /api/wallets/{customer_id}
#[utoipa::path(
    get,
    path = "/api/wallets/{customer_id}",
    tag = "Wallet",
    params(
        ("customer_id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Saldo e extrato da carteira", body = WalletStatement)),
    security(("api_jwt" = []))
)]
pub async fn get_wallet(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let statement = app_state
        .wallet_service
        .get_wallet(&tenant.scope(user.id), customer_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(statement)))
}
