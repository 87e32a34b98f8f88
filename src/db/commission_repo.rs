// src/db/commission_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::commission::{Commission, CommissionDetail, ReversalReason},
};

#[derive(Clone)]
pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// "UPSERT" da comissão ativa da venda.
    /// Se não existe, insere Pendente. Se existe Pendente, troca o valor.
    /// Se existe Pago, nada muda e o retorno é `None`.
    pub async fn upsert_pending<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        employee_id: Uuid,
        sale_id: Uuid,
        amount: Decimal,
    ) -> Result<Option<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission = sqlx::query_as::<_, Commission>(
            r#"
            INSERT INTO commissions (tenant_id, store_id, employee_id, sale_id, amount, status)
            VALUES ($1, $2, $3, $4, $5, 'Pendente')
            ON CONFLICT (sale_id) WHERE status IN ('Pendente', 'Pago')
            DO UPDATE SET
                amount = EXCLUDED.amount,
                employee_id = EXCLUDED.employee_id,
                updated_at = NOW()
            WHERE commissions.status = 'Pendente'
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(employee_id)
        .bind(sale_id)
        .bind(amount)
        .fetch_optional(executor)
        .await?;
        Ok(commission)
    }

    /// Estorna toda comissão Pendente da venda. Pago nunca é tocado.
    pub async fn reverse_pending<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        sale_id: Uuid,
        reason: ReversalReason,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE commissions
            SET status = 'Estornado', reversal_reason = $4, updated_at = NOW()
            WHERE sale_id = $1 AND tenant_id = $2 AND store_id = $3
              AND status = 'Pendente'
            "#,
        )
        .bind(sale_id)
        .bind(tenant_id)
        .bind(store_id)
        .bind(reason)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Marca como Pago apenas o que ainda está Pendente. Repetir é inofensivo.
    pub async fn pay_batch<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        employee_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE commissions
            SET status = 'Pago', updated_at = NOW()
            WHERE id = ANY($4)
              AND tenant_id = $1 AND store_id = $2 AND employee_id = $3
              AND status = 'Pendente'
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(employee_id)
        .bind(ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Histórico de comissões da venda, estornadas incluídas.
    pub async fn list_for_sale<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Vec<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Commission>(
            r#"
            SELECT * FROM commissions
            WHERE sale_id = $1 AND tenant_id = $2 AND store_id = $3
            ORDER BY created_at ASC
            "#,
        )
        .bind(sale_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Linhas do relatório no período. Estornos e cancelamentos ficam de fora.
    pub async fn list_report_rows<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CommissionDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, CommissionDetail>(
            r#"
            SELECT
                c.id, c.employee_id, e.full_name AS employee_name,
                c.sale_id, s.final_value AS sale_value,
                c.amount, c.status, c.created_at
            FROM commissions c
            JOIN employees e ON e.id = c.employee_id
            JOIN sales s ON s.id = c.sale_id
            WHERE c.tenant_id = $1
              AND c.store_id = $2
              AND c.status IN ('Pendente', 'Pago')
              AND c.created_at >= $3
              AND c.created_at < $4
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(start)
        .bind(end)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
