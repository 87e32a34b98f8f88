// src/db/assistance_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::assistance::{
        AssistanceTicket, NewTicket, PublicTicket, TicketListEntry, TicketStatus, TimelineEntry,
        TimelineKind, TransitionStamps,
    },
};

#[derive(Clone)]
pub struct AssistanceRepository {
    pool: PgPool,
}

impl AssistanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn customer_exists<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM customers
                WHERE id = $1 AND tenant_id = $2 AND store_id = $3
            )
            "#,
        )
        .bind(customer_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn update_customer_phone<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        phone: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE customers SET mobile_phone = $3 WHERE id = $1 AND tenant_id = $2")
            .bind(customer_id)
            .bind(tenant_id)
            .bind(phone)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Insere o chamado já no status inicial decidido pelo serviço.
    /// O rótulo público vem separado: a troca imediata usa um texto próprio.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_ticket<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        input: &NewTicket,
        status: TicketStatus,
        public_status: &str,
        stamp_customer_exchange: bool,
        created_by: Uuid,
    ) -> Result<AssistanceTicket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, AssistanceTicket>(
            r#"
            INSERT INTO assistance_tickets (
                tenant_id, store_id, customer_id, original_sale_id, product_id,
                product_description, defect_description, contact_used, modality,
                status, public_status, customer_exchange_at, created_by
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                CASE WHEN $12 THEN NOW() ELSE NULL END,
                $13
            )
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(input.customer_id)
        .bind(input.original_sale_id)
        .bind(input.product_id)
        .bind(input.product_description.trim())
        .bind(input.defect_description.trim())
        .bind(input.updated_phone.as_deref().map(str::trim).filter(|p| !p.is_empty()))
        .bind(input.modality)
        .bind(status)
        .bind(public_status)
        .bind(stamp_customer_exchange)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(ticket)
    }

    pub async fn find_ticket_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        ticket_id: Uuid,
    ) -> Result<Option<AssistanceTicket>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, AssistanceTicket>(
            r#"
            SELECT * FROM assistance_tickets
            WHERE id = $1 AND tenant_id = $2 AND store_id = $3
            FOR UPDATE
            "#,
        )
        .bind(ticket_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(ticket)
    }

    /// Troca o status e carimba as datas da transição (COALESCE preserva a primeira).
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        ticket_id: Uuid,
        status: TicketStatus,
        stamps: TransitionStamps,
    ) -> Result<AssistanceTicket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, AssistanceTicket>(
            r#"
            UPDATE assistance_tickets SET
                status = $4,
                public_status = $5,
                part_requested_at    = CASE WHEN $6  THEN NOW() ELSE part_requested_at END,
                part_arrived_at      = CASE WHEN $7  THEN NOW() ELSE part_arrived_at END,
                customer_exchange_at = CASE WHEN $8  THEN NOW() ELSE customer_exchange_at END,
                sent_to_supplier_at  = CASE WHEN $9  THEN NOW() ELSE sent_to_supplier_at END,
                concluded_at         = CASE WHEN $10 THEN NOW() ELSE concluded_at END,
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND store_id = $3
            RETURNING *
            "#,
        )
        .bind(ticket_id)
        .bind(tenant_id)
        .bind(store_id)
        .bind(status)
        .bind(status.public_label())
        .bind(stamps.part_requested)
        .bind(stamps.part_arrived)
        .bind(stamps.customer_exchange)
        .bind(stamps.sent_to_supplier)
        .bind(stamps.concluded)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Chamado de assistência não encontrado.".into()))?;
        Ok(ticket)
    }

    pub async fn insert_timeline<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ticket_id: Uuid,
        kind: TimelineKind,
        message: &str,
        actor_id: Option<Uuid>,
    ) -> Result<TimelineEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, TimelineEntry>(
            r#"
            INSERT INTO assistance_timeline (ticket_id, tenant_id, kind, message, actor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(ticket_id)
        .bind(tenant_id)
        .bind(kind)
        .bind(message)
        .bind(actor_id)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    /// Linha do tempo do chamado, mais recente primeiro.
    pub async fn list_timeline<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        ticket_id: Uuid,
    ) -> Result<Vec<TimelineEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, TimelineEntry>(
            r#"
            SELECT tl.*
            FROM assistance_timeline tl
            JOIN assistance_tickets t ON t.id = tl.ticket_id
            WHERE tl.ticket_id = $1 AND t.tenant_id = $2 AND t.store_id = $3
            ORDER BY tl.created_at DESC
            "#,
        )
        .bind(ticket_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Chamados da loja que não foram cancelados.
    pub async fn list_open<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
    ) -> Result<Vec<TicketListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, TicketListEntry>(
            r#"
            SELECT t.*, c.full_name AS customer_name, c.mobile_phone AS customer_phone
            FROM assistance_tickets t
            JOIN customers c ON c.id = t.customer_id
            WHERE t.tenant_id = $1 AND t.store_id = $2
              AND t.status <> 'Cancelado'
            ORDER BY t.updated_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Consulta pública pelo token de rastreio. Não exige tenant.
    pub async fn find_public(&self, token: Uuid) -> Result<Option<PublicTicket>, AppError> {
        let ticket = sqlx::query_as::<_, PublicTicket>(
            r#"
            SELECT
                t.status, t.public_status, t.product_description,
                s.name AS store_name,
                t.opened_at, t.part_requested_at, t.part_arrived_at,
                t.customer_exchange_at, t.sent_to_supplier_at, t.concluded_at
            FROM assistance_tickets t
            JOIN stores s ON s.id = t.store_id
            WHERE t.tracking_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ticket)
    }
}
