// src/models/wallet.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Tipo gravado no extrato para créditos vindos de devolução.
pub const RETURN_CREDIT_OPERATION: &str = "Credito_Devolucao";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub customer_id: Uuid,
    pub balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub wallet_id: Uuid,
    pub amount: Decimal,
    pub operation_type: String,
    pub description: Option<String>,
    pub related_sale_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WalletCreditRequest {
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub employee_id: Uuid,
    pub related_sale_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatement {
    pub customer_id: Uuid,
    pub balance: Decimal,
    pub transactions: Vec<WalletTransaction>,
}
