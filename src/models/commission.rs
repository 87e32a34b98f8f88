// src/models/commission.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::auth::Employee;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "commission_status")]
pub enum CommissionStatus {
    Pendente,
    Pago,
    /// Só aparece em registros antigos; estornos novos usam `Estornado`.
    Cancelado,
    Estornado,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "reversal_reason")]
pub enum ReversalReason {
    VendaCancelada,
    VendaReaberta,
    Devolucao,
}

impl ReversalReason {
    pub fn message(self) -> &'static str {
        match self {
            ReversalReason::VendaCancelada => "Venda Cancelada",
            ReversalReason::VendaReaberta => "Venda Reaberta",
            ReversalReason::Devolucao => "Devolução de Venda",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub employee_id: Uuid,
    pub sale_id: Uuid,
    pub amount: Decimal,
    pub status: CommissionStatus,
    pub reversal_reason: Option<ReversalReason>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comissão como aparece no histórico da venda, com o motivo do estorno por extenso.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleCommission {
    #[serde(flatten)]
    pub commission: Commission,
    pub reversal_reason_label: Option<String>,
}

impl From<Commission> for SaleCommission {
    fn from(commission: Commission) -> Self {
        let reversal_reason_label = commission.reversal_reason.map(|r| r.message().to_string());
        Self { commission, reversal_reason_label }
    }
}

/// Taxas (%) do vendedor. `store_total` e `received` são gravadas mas o
/// cálculo atual não as usa.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRates {
    pub guaranteed: Decimal,
    pub risk: Decimal,
    pub profit: Decimal,
    pub store_total: Decimal,
    pub received: Decimal,
}

impl CommissionRates {
    pub fn is_zero(&self) -> bool {
        self.guaranteed <= Decimal::ZERO && self.risk <= Decimal::ZERO && self.profit <= Decimal::ZERO
    }
}

impl From<&Employee> for CommissionRates {
    fn from(e: &Employee) -> Self {
        Self {
            guaranteed: e.comm_rate_guaranteed,
            risk: e.comm_rate_store_credit,
            profit: e.comm_rate_profit,
            store_total: e.comm_rate_store_total,
            received: e.comm_rate_received,
        }
    }
}

/// Forma de pagamento que entra no caixa na hora (garantida) ou fica a receber (risco).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentClass {
    Guaranteed,
    Risk,
}

/// Classifica o texto livre da forma de pagamento.
/// Dinheiro, PIX, débito e cartão são garantidos. Crediário, carnê,
/// financiamento próprio e crédito em loja (carteira) ficam no risco.
pub fn classify_payment_method(method: &str) -> PaymentClass {
    let m = method.trim().to_lowercase();
    let is_store_credit = ["crediário", "crediario", "carnê", "carne", "financ", "loja", "carteira"]
        .iter()
        .any(|k| m.contains(k));
    if is_store_credit {
        return PaymentClass::Risk;
    }
    let is_guaranteed = ["dinheiro", "pix", "débito", "debito", "cart"]
        .iter()
        .any(|k| m.contains(k));
    if is_guaranteed { PaymentClass::Guaranteed } else { PaymentClass::Risk }
}

/// Entrada pura do cálculo. Nada de banco aqui.
#[derive(Debug, Clone, Default)]
pub struct CommissionInput {
    pub sale_value: Decimal,
    /// (valor, forma de pagamento)
    pub payments: Vec<(Decimal, String)>,
    /// (custo unitário, quantidade)
    pub item_costs: Vec<(Decimal, i32)>,
    pub rates: CommissionRates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionBreakdown {
    pub guaranteed_amount: Decimal,
    pub risk_amount: Decimal,
    pub margin: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionDetail {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub sale_id: Uuid,
    pub sale_value: Decimal,
    pub amount: Decimal,
    pub status: CommissionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSummary {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub sales_total: Decimal,
    pub pending_total: Decimal,
    pub paid_total: Decimal,
    pub details: Vec<CommissionDetail>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CommissionReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_payment_methods() {
        assert_eq!(classify_payment_method("PIX"), PaymentClass::Guaranteed);
        assert_eq!(classify_payment_method("Dinheiro"), PaymentClass::Guaranteed);
        assert_eq!(classify_payment_method("Cartão de Débito"), PaymentClass::Guaranteed);
        assert_eq!(classify_payment_method("Cartão de Crédito"), PaymentClass::Guaranteed);
        assert_eq!(classify_payment_method("Cartão Crédito"), PaymentClass::Guaranteed);
        assert_eq!(classify_payment_method("Crediário"), PaymentClass::Risk);
        assert_eq!(classify_payment_method("Crédito em Loja"), PaymentClass::Risk);
        assert_eq!(classify_payment_method("Carteira"), PaymentClass::Risk);
        assert_eq!(classify_payment_method("Transferência"), PaymentClass::Risk);
        assert_eq!(classify_payment_method("Carnê"), PaymentClass::Risk);
        assert_eq!(classify_payment_method("Financiamento Loja"), PaymentClass::Risk);
        assert_eq!(classify_payment_method("Boleto"), PaymentClass::Risk);
    }

    #[test]
    fn reversal_messages() {
        assert_eq!(ReversalReason::Devolucao.message(), "Devolução de Venda");
        assert_eq!(ReversalReason::VendaReaberta.message(), "Venda Reaberta");
    }

    #[test]
    fn sale_commission_json_carries_reason_label() {
        let now = Utc::now();
        let commission = Commission {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
            amount: Decimal::new(3800, 2),
            status: CommissionStatus::Estornado,
            reversal_reason: Some(ReversalReason::VendaCancelada),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(SaleCommission::from(commission)).unwrap();
        assert_eq!(json["reversalReason"], "VendaCancelada");
        assert_eq!(json["reversalReasonLabel"], "Venda Cancelada");
        assert_eq!(json["status"], "Estornado");
    }
}
