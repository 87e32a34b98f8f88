// src/db/sales_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{Payment, Sale, SaleItem, SaleStatus},
};

// Vendas não pertencem a este núcleo: aqui só lemos e trocamos o status.
#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_sale<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE id = $1 AND tenant_id = $2 AND store_id = $3",
        )
        .bind(sale_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(sale)
    }

    /// Mesma busca, travando a linha até o fim da transação.
    pub async fn find_sale_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE id = $1 AND tenant_id = $2 AND store_id = $3
            FOR UPDATE
            "#,
        )
        .bind(sale_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(sale)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, variant_id, description,
                   quantity, unit_price, line_total, unit_cost
            FROM sale_items
            WHERE sale_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(sale_id)
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list_payments<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, sale_id, amount, method, installments, created_at
            FROM payments
            WHERE sale_id = $1 AND tenant_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(sale_id)
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        sale_id: Uuid,
        status: SaleStatus,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET status = $4, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND store_id = $3
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(tenant_id)
        .bind(store_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Venda não encontrada.".into()))?;
        Ok(sale)
    }
}
