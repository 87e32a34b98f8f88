// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Tenant (A "Rede" de óticas)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---
// 2. Store (A loja física, dona do estoque)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---
// 3. Escopo de execução
// ---
/// Quem está operando e em qual loja. Toda consulta de negócio filtra
/// por `tenant_id` e `store_id`; `user_id` é o usuário que registra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub user_id: Uuid,
}

impl Scope {
    pub fn new(tenant_id: Uuid, store_id: Uuid, user_id: Uuid) -> Self {
        Self { tenant_id, store_id, user_id }
    }
}
