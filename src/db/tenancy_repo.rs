// src/db/tenancy_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::tenancy::{Store, Tenant};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Verifica se o utilizador é membro ativo do tenant e se a loja pertence a ele.
    /// Esta é a verificação de autorização mais importante do sistema.
    pub async fn check_user_store_access(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        store_id: Uuid,
    ) -> Result<bool, AppError> {
        // SELECT EXISTS: apenas 'true' ou 'false'.
        let allowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM tenant_members tm
                JOIN stores s ON s.tenant_id = tm.tenant_id
                WHERE tm.user_id = $1
                  AND tm.tenant_id = $2
                  AND tm.is_active
                  AND s.id = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(allowed)
    }

    /// Tenants em que o utilizador está ativo.
    pub async fn list_user_tenants(&self, user_id: Uuid) -> Result<Vec<Tenant>, AppError> {
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT t.id, t.name, t.created_at
            FROM tenants t
            JOIN tenant_members tm ON tm.tenant_id = t.id
            WHERE tm.user_id = $1 AND tm.is_active
            ORDER BY t.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tenants)
    }

    pub async fn list_stores(&self, tenant_id: Uuid) -> Result<Vec<Store>, AppError> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }
}
