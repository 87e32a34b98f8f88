// src/db/inventory_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{
        EyeSide, LeftoverMatch, LowStockProduct, MovementType, Product, ProductVariant,
        StockMovement, StockMovementView,
    },
};

/// Linha pronta para ser anexada ao livro-razão.
#[derive(Debug, Clone)]
pub struct LedgerEntry<'a> {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub delta: i32,
    pub reason: &'a str,
    pub unit_cost: Decimal,
    pub employee_id: Uuid,
    pub registered_by: Uuid,
    pub related_sale_id: Option<Uuid>,
    pub related_ticket_id: Option<Uuid>,
}

/// Variante de sobra a ser criada (sem grau copiado da origem).
#[derive(Debug, Clone)]
pub struct NewLeftoverVariant<'a> {
    pub product_id: Uuid,
    pub name: &'a str,
    pub diameter: Decimal,
    pub eye_side: EyeSide,
    pub sphere: Option<Decimal>,
    pub cylinder: Option<Decimal>,
    pub stock: i32,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ---
    // Funções de "Leitura"
    // ---

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND tenant_id = $2 AND store_id = $3",
        )
        .bind(product_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// A variante precisa pertencer ao produto informado.
    pub async fn find_variant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        product_id: Uuid,
        variant_id: Uuid,
    ) -> Result<Option<ProductVariant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variant = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT * FROM product_variants
            WHERE id = $1 AND product_id = $2 AND tenant_id = $3 AND store_id = $4
            "#,
        )
        .bind(variant_id)
        .bind(product_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(variant)
    }

    /// Histórico da loja, mais recente primeiro.
    #[allow(clippy::too_many_arguments)]
    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        movement_type: Option<MovementType>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        search_pattern: Option<&str>,
        limit: i64,
    ) -> Result<Vec<StockMovementView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, StockMovementView>(
            r#"
            SELECT
                m.id, m.created_at, m.movement_type, m.quantity, m.delta, m.reason,
                m.product_id, p.name AS product_name, p.barcode,
                m.variant_id, v.name AS variant_name,
                e.full_name AS employee_name
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            LEFT JOIN product_variants v ON v.id = m.variant_id
            JOIN employees e ON e.id = m.employee_id
            WHERE m.tenant_id = $1
              AND m.store_id = $2
              AND ($3::movement_type IS NULL OR m.movement_type = $3)
              AND ($4::timestamptz IS NULL OR m.created_at >= $4)
              AND ($5::timestamptz IS NULL OR m.created_at < $5)
              AND ($6::text IS NULL OR m.reason ILIKE $6 ESCAPE '\')
            ORDER BY m.created_at DESC
            LIMIT $7
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(movement_type)
        .bind(start)
        .bind(end)
        .bind(search_pattern)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Sobras com saldo cujo grau bate exatamente (valores já normalizados).
    pub async fn find_leftovers<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        sphere: Decimal,
        cylinder: Decimal,
        min_diameter: Option<Decimal>,
    ) -> Result<Vec<LeftoverMatch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, LeftoverMatch>(
            r#"
            SELECT id, product_id, name, diameter, eye_side, stock
            FROM product_variants
            WHERE tenant_id = $1
              AND store_id = $2
              AND is_leftover
              AND stock > 0
              AND sphere = $3
              AND cylinder = $4
              AND ($5::numeric IS NULL OR diameter >= $5)
            ORDER BY diameter ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(sphere)
        .bind(cylinder)
        .bind(min_diameter)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Produtos abaixo do mínimo (ou de `default_threshold` quando não há mínimo).
    pub async fn list_low_stock<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        default_threshold: i32,
        limit: i64,
    ) -> Result<Vec<LowStockProduct>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT id, name, barcode, stock,
                   CASE WHEN min_stock > 0 THEN min_stock ELSE $3 END AS min_stock
            FROM products
            WHERE tenant_id = $1
              AND store_id = $2
              AND stock < CASE WHEN min_stock > 0 THEN min_stock ELSE $3 END
            ORDER BY stock ASC, name ASC
            LIMIT $4
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(default_threshold)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---
    // O saldo só muda por incremento atômico no próprio UPDATE.
    // A linha fica travada até o fim da transação, então não há "lost update".

    pub async fn increment_product_stock<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        product_id: Uuid,
        delta: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock + $4
            WHERE id = $1 AND tenant_id = $2 AND store_id = $3
            RETURNING stock
            "#,
        )
        .bind(product_id)
        .bind(tenant_id)
        .bind(store_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(stock)
    }

    pub async fn increment_variant_stock<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        variant_id: Uuid,
        delta: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE product_variants
            SET stock = stock + $4
            WHERE id = $1 AND tenant_id = $2 AND store_id = $3
            RETURNING stock
            "#,
        )
        .bind(variant_id)
        .bind(tenant_id)
        .bind(store_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(stock)
    }

    /// Anexa uma linha ao livro-razão. Não existe caminho de UPDATE/DELETE.
    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        entry: &LedgerEntry<'_>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (
                tenant_id, store_id, product_id, variant_id, movement_type,
                quantity, delta, reason, unit_cost, employee_id, registered_by,
                related_sale_id, related_ticket_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(entry.product_id)
        .bind(entry.variant_id)
        .bind(entry.movement_type)
        .bind(entry.quantity)
        .bind(entry.delta)
        .bind(entry.reason)
        .bind(entry.unit_cost)
        .bind(entry.employee_id)
        .bind(entry.registered_by)
        .bind(entry.related_sale_id)
        .bind(entry.related_ticket_id)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    /// Cria a variante de sobra já com o saldo recuperado e custo zero.
    pub async fn insert_leftover_variant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        leftover: &NewLeftoverVariant<'_>,
    ) -> Result<ProductVariant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variant = sqlx::query_as::<_, ProductVariant>(
            r#"
            INSERT INTO product_variants (
                product_id, tenant_id, store_id, name,
                sphere, cylinder, axis, addition,
                diameter, eye_side, is_leftover, stock, unit_cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, NULL, NULL, $7, $8, TRUE, $9, 0)
            RETURNING *
            "#,
        )
        .bind(leftover.product_id)
        .bind(tenant_id)
        .bind(store_id)
        .bind(leftover.name)
        .bind(leftover.sphere)
        .bind(leftover.cylinder)
        .bind(leftover.diameter)
        .bind(leftover.eye_side)
        .bind(leftover.stock)
        .fetch_one(executor)
        .await?;
        Ok(variant)
    }
}
