// src/handlers/assistance.rs

use axum::{
    extract::{Path, State},
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
    models::assistance::{NewTicket, PublicTicket, TicketListEntry, TicketStatus, TimelineEntry},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceTicketPayload {
    pub status: TicketStatus,
    /// Texto da linha do tempo; vazio usa a mensagem padrão do status
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPayload {
    #[validate(length(min = 1, message = "Escreva a mensagem da interação."))]
    pub message: String,
}

// POST /api/assistance/tickets
#[utoipa::path(
    post,
    path = "/api/assistance/tickets",
    tag = "Assistance",
    request_body = NewTicket,
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 201, description = "Chamado aberto", body = ActionResult),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<NewTicket>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationFields(e).to_api_error(&locale))?;

    let ticket = app_state
        .assistance_service
        .create_ticket(&tenant.scope(user.id), &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::CREATED,
        Json(ActionResult::ok("Chamado de assistência aberto.").with_data(&ticket)),
    ))
}

// GET /api/assistance/tickets
#[utoipa::path(
    get,
    path = "/api/assistance/tickets",
    tag = "Assistance",
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Chamados não cancelados", body = Vec<TicketListEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_open_tickets(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let tickets = app_state
        .assistance_service
        .list_open_tickets(&tenant.scope(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(tickets)))
}

// PATCH /api/assistance/tickets/{id}/status
#[utoipa::path(
    patch,
    path = "/api/assistance/tickets/{id}/status",
    tag = "Assistance",
    request_body = AdvanceTicketPayload,
    params(
        ("id" = Uuid, Path, description = "ID do chamado"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Status alterado", body = ActionResult),
        (status = 400, description = "Transição não permitida"),
        (status = 404, description = "Chamado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn advance_ticket_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<AdvanceTicketPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .assistance_service
        .advance_ticket_status(
            &tenant.scope(user.id),
            ticket_id,
            payload.status,
            payload.note.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = format!("Status atualizado: {}.", ticket.public_status);
    Ok((StatusCode::OK, Json(ActionResult::ok(message).with_data(&ticket))))
}

// POST /api/assistance/tickets/{id}/interactions
#[utoipa::path(
    post,
    path = "/api/assistance/tickets/{id}/interactions",
    tag = "Assistance",
    request_body = InteractionPayload,
    params(
        ("id" = Uuid, Path, description = "ID do chamado"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 201, description = "Interação registrada", body = ActionResult)),
    security(("api_jwt" = []))
)]
pub async fn add_interaction(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<InteractionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationFields(e).to_api_error(&locale))?;

    let entry = app_state
        .assistance_service
        .add_interaction(&tenant.scope(user.id), ticket_id, &payload.message)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(ActionResult::ok("Interação registrada.").with_data(&entry))))
}

// GET /api/assistance/tickets/{id}/timeline
#[utoipa::path(
    get,
    path = "/api/assistance/tickets/{id}/timeline",
    tag = "Assistance",
    params(
        ("id" = Uuid, Path, description = "ID do chamado"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Rede"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Linha do tempo, mais recente primeiro", body = Vec<TimelineEntry>)),
    security(("api_jwt" = []))
)]
pub async fn get_timeline(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    Path(ticket_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .assistance_service
        .timeline(&tenant.scope(user.id), ticket_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(entries)))
}

// GET /api/public/tickets/{token}
#[utoipa::path(
    get,
    path = "/api/public/tickets/{token}",
    tag = "Assistance",
    params(("token" = Uuid, Path, description = "Token de rastreio entregue ao cliente")),
    responses(
        (status = 200, description = "Andamento do chamado", body = PublicTicket),
        (status = 404, description = "Token desconhecido")
    )
)]
pub async fn public_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(token): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .assistance_service
        .public_ticket(token)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(ticket)))
}
