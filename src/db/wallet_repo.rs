// src/db/wallet_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::wallet::{Wallet, WalletTransaction},
};

#[derive(Clone)]
pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Cria a carteira se preciso e soma o valor ao saldo, tudo no mesmo comando.
    pub async fn credit_balance<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        customer_id: Uuid,
        amount: Decimal,
    ) -> Result<Wallet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO customer_wallets (tenant_id, store_id, customer_id, balance)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (store_id, customer_id)
            DO UPDATE SET
                balance = customer_wallets.balance + EXCLUDED.balance,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(customer_id)
        .bind(amount)
        .fetch_one(executor)
        .await?;
        Ok(wallet)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_transaction<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        wallet_id: Uuid,
        amount: Decimal,
        operation_type: &str,
        description: &str,
        related_sale_id: Option<Uuid>,
        employee_id: Uuid,
        created_by: Uuid,
    ) -> Result<WalletTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tx = sqlx::query_as::<_, WalletTransaction>(
            r#"
            INSERT INTO wallet_transactions (
                tenant_id, store_id, wallet_id, amount, operation_type,
                description, related_sale_id, employee_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(store_id)
        .bind(wallet_id)
        .bind(amount)
        .bind(operation_type)
        .bind(description)
        .bind(related_sale_id)
        .bind(employee_id)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(tx)
    }

    pub async fn find_wallet<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Wallet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            SELECT * FROM customer_wallets
            WHERE customer_id = $1 AND tenant_id = $2 AND store_id = $3
            "#,
        )
        .bind(customer_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(wallet)
    }

    pub async fn list_transactions<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        wallet_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT * FROM wallet_transactions
            WHERE wallet_id = $1 AND tenant_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(wallet_id)
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
