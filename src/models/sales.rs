// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "sale_status")]
pub enum SaleStatus {
    #[sqlx(rename = "Em Aberto")]
    #[serde(rename = "Em Aberto")]
    EmAberto,
    Fechada,
    Cancelada,
    Devolvida,
}

impl SaleStatus {
    pub fn label(self) -> &'static str {
        match self {
            SaleStatus::EmAberto => "Em Aberto",
            SaleStatus::Fechada => "Fechada",
            SaleStatus::Cancelada => "Cancelada",
            SaleStatus::Devolvida => "Devolvida",
        }
    }

    /// Vendas canceladas ou devolvidas não geram comissão.
    pub fn accrues_commission(self) -> bool {
        matches!(self, SaleStatus::EmAberto | SaleStatus::Fechada)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub customer_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub status: SaleStatus,
    pub total_value: Decimal,
    pub discount: Decimal,
    pub final_value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub installments: i32,
    pub created_at: DateTime<Utc>,
}
