// src/services/assistance_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::AssistanceRepository,
    models::{
        assistance::{
            AssistanceTicket, NewTicket, PublicTicket, TicketListEntry, TicketModality,
            TicketStatus, TimelineEntry, TimelineKind,
        },
        inventory::{MovementType, NewMovement},
        tenancy::Scope,
    },
    services::inventory_service::InventoryService,
};

/// Rótulo público da troca feita no balcão, na abertura do chamado.
const IMMEDIATE_EXCHANGE_LABEL: &str = "Troca Realizada";

#[derive(Clone)]
pub struct AssistanceService {
    pool: PgPool,
    assistance_repo: AssistanceRepository,
    inventory_service: InventoryService,
}

impl AssistanceService {
    pub fn new(
        pool: PgPool,
        assistance_repo: AssistanceRepository,
        inventory_service: InventoryService,
    ) -> Self {
        Self { pool, assistance_repo, inventory_service }
    }

    // --- ABERTURA ---
    // Troca imediata dá baixa no estoque e já nasce em Logística Reversa,
    // tudo na mesma transação.
    pub async fn create_ticket(
        &self,
        scope: &Scope,
        input: &NewTicket,
    ) -> Result<AssistanceTicket, AppError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;

        let customer_found = self
            .assistance_repo
            .customer_exists(&mut *tx, scope.tenant_id, scope.store_id, input.customer_id)
            .await?;
        if !customer_found {
            return Err(AppError::NotFound("Cliente não encontrado.".into()));
        }

        if let Some(phone) = input.updated_phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            self.assistance_repo
                .update_customer_phone(&mut *tx, scope.tenant_id, input.customer_id, phone)
                .await?;
        }

        let immediate_exchange = match (input.modality, input.product_id) {
            (TicketModality::TrocaImediata, Some(product_id)) => Some(product_id),
            _ => None,
        };

        let (status, public_status) = match immediate_exchange {
            Some(_) => (TicketStatus::LogisticaReversa, IMMEDIATE_EXCHANGE_LABEL),
            None => (TicketStatus::Triagem, TicketStatus::Triagem.public_label()),
        };

        let ticket = self
            .assistance_repo
            .insert_ticket(
                &mut *tx,
                scope.tenant_id,
                scope.store_id,
                input,
                status,
                public_status,
                immediate_exchange.is_some(),
                scope.user_id,
            )
            .await?;

        self.assistance_repo
            .insert_timeline(
                &mut *tx,
                scope.tenant_id,
                ticket.id,
                TimelineKind::Sistema,
                "Solicitação aberta.",
                Some(scope.user_id),
            )
            .await?;

        if let Some(product_id) = immediate_exchange {
            self.inventory_service
                .record_movement(
                    &mut *tx,
                    scope,
                    &NewMovement {
                        product_id,
                        variant_id: None,
                        movement_type: MovementType::Saida,
                        quantity: 1,
                        reason: format!("Troca Imediata Garantia Ticket #{}", ticket.id),
                        employee_id: input.employee_id,
                        adjustment: None,
                        related_sale_id: input.original_sale_id,
                        related_ticket_id: Some(ticket.id),
                        leftover: None,
                    },
                )
                .await?;

            self.assistance_repo
                .insert_timeline(
                    &mut *tx,
                    scope.tenant_id,
                    ticket.id,
                    TimelineKind::Alerta,
                    "Baixa de estoque realizada (Troca Imediata).",
                    Some(scope.user_id),
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "🛠️ Chamado {} aberto ({:?}) para o cliente {}",
            ticket.id,
            ticket.status,
            ticket.customer_id
        );
        Ok(ticket)
    }

    // --- MUDANÇA DE STATUS ---
    pub async fn advance_ticket_status(
        &self,
        scope: &Scope,
        ticket_id: Uuid,
        next: TicketStatus,
        note: Option<&str>,
    ) -> Result<AssistanceTicket, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .assistance_repo
            .find_ticket_for_update(&mut *tx, scope.tenant_id, scope.store_id, ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Chamado de assistência não encontrado.".into()))?;

        if !current.status.can_transition_to(next) {
            tracing::warn!(
                "Transição recusada no chamado {}: {:?} -> {:?}",
                ticket_id,
                current.status,
                next
            );
            return Err(AppError::Validation(format!(
                "Não é possível mudar o chamado de '{}' para '{}'.",
                current.status.public_label(),
                next.public_label()
            )));
        }

        let ticket = self
            .assistance_repo
            .update_status(&mut *tx, scope.tenant_id, scope.store_id, ticket_id, next, next.stamps())
            .await?;

        let message = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| next.default_message());

        self.assistance_repo
            .insert_timeline(
                &mut *tx,
                scope.tenant_id,
                ticket_id,
                TimelineKind::MudancaStatus,
                &message,
                Some(scope.user_id),
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🛠️ Chamado {}: {:?} -> {:?}", ticket_id, current.status, next);
        Ok(ticket)
    }

    /// Anotação livre na linha do tempo.
    pub async fn add_interaction(
        &self,
        scope: &Scope,
        ticket_id: Uuid,
        message: &str,
    ) -> Result<TimelineEntry, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Escreva a mensagem da interação.".into()));
        }

        let mut tx = self.pool.begin().await?;
        self.assistance_repo
            .find_ticket_for_update(&mut *tx, scope.tenant_id, scope.store_id, ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Chamado de assistência não encontrado.".into()))?;

        let entry = self
            .assistance_repo
            .insert_timeline(
                &mut *tx,
                scope.tenant_id,
                ticket_id,
                TimelineKind::Interacao,
                message,
                Some(scope.user_id),
            )
            .await?;
        tx.commit().await?;
        Ok(entry)
    }

    pub async fn timeline(
        &self,
        scope: &Scope,
        ticket_id: Uuid,
    ) -> Result<Vec<TimelineEntry>, AppError> {
        self.assistance_repo
            .list_timeline(&self.pool, scope.tenant_id, scope.store_id, ticket_id)
            .await
    }

    pub async fn list_open_tickets(&self, scope: &Scope) -> Result<Vec<TicketListEntry>, AppError> {
        self.assistance_repo.list_open(&self.pool, scope.tenant_id, scope.store_id).await
    }

    pub async fn public_ticket(&self, token: Uuid) -> Result<PublicTicket, AppError> {
        self.assistance_repo
            .find_public(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Chamado não encontrado.".into()))
    }
}

