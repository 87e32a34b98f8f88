// src/models/returns.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::EmployeeIdentity;
use crate::models::inventory::LeftoverRemnant;

/// Estado em que o item voltou para a loja.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum ReturnCondition {
    /// Volta ao estoque normal
    Intacto,
    /// Perda direta, sem aproveitamento
    Defeito,
    /// Vira sobra no banco de lentes
    Sobra,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum RefundChannel {
    /// Crédito na carteira do cliente
    WalletCredit,
    /// Estorno financeiro direto (somente gerente/admin)
    Refund,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLine {
    pub sale_item_id: Uuid,
    pub quantity: i32,
    pub condition: ReturnCondition,
    #[serde(default)]
    pub leftover: Option<LeftoverRemnant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub sale_id: Uuid,
    pub channel: RefundChannel,
    pub lines: Vec<ReturnLine>,
}

impl ReturnRequest {
    /// Checagens que não dependem do banco. Roda antes de qualquer escrita.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.lines.is_empty() {
            return Err(AppError::Validation(
                "Selecione ao menos um item para devolver.".into(),
            ));
        }
        for line in &self.lines {
            if line.quantity <= 0 {
                return Err(AppError::Validation(
                    "A quantidade devolvida deve ser maior que zero.".into(),
                ));
            }
            if line.condition == ReturnCondition::Sobra {
                let remnant = line.leftover.as_ref().ok_or_else(|| {
                    AppError::Validation(
                        "Informe o diâmetro e o olho da sobra de lente.".into(),
                    )
                })?;
                remnant.validate()?;
            }
        }
        let mut seen = std::collections::HashSet::new();
        if !self.lines.iter().all(|l| seen.insert(l.sale_item_id)) {
            return Err(AppError::Validation(
                "O mesmo item da venda foi informado mais de uma vez.".into(),
            ));
        }
        Ok(())
    }
}

/// Reembolso direto exige cargo de gerência. Crédito em carteira é livre.
pub fn authorize_refund(
    channel: RefundChannel,
    authorizer: &EmployeeIdentity,
) -> Result<(), AppError> {
    if channel == RefundChannel::Refund && !authorizer.role.can_authorize_refund() {
        return Err(AppError::Authorization(
            "Estorno direto exige autorização de gerente ou administrador.".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOutcome {
    pub sale_id: Uuid,
    pub refunded_amount: Decimal,
    pub wallet_transaction_id: Option<Uuid>,
    pub leftover_variant_ids: Vec<Uuid>,
    pub reversed_commissions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::EmployeeRole;
    use crate::models::inventory::EyeSide;

    fn line(condition: ReturnCondition, leftover: Option<LeftoverRemnant>) -> ReturnLine {
        ReturnLine { sale_item_id: Uuid::new_v4(), quantity: 1, condition, leftover }
    }

    fn request(lines: Vec<ReturnLine>) -> ReturnRequest {
        ReturnRequest { sale_id: Uuid::new_v4(), channel: RefundChannel::WalletCredit, lines }
    }

    fn identity(role: EmployeeRole) -> EmployeeIdentity {
        EmployeeIdentity { employee_id: Uuid::new_v4(), full_name: "Ana".into(), role }
    }

    #[test]
    fn sobra_without_remnant_is_rejected() {
        let req = request(vec![line(ReturnCondition::Sobra, None)]);
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn sobra_with_remnant_is_accepted() {
        let remnant = LeftoverRemnant {
            diameter: Decimal::new(60, 0),
            eye_side: EyeSide::OE,
            sphere: None,
            cylinder: None,
        };
        let req = request(vec![line(ReturnCondition::Sobra, Some(remnant))]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_and_duplicated_lines_are_rejected() {
        assert!(request(vec![]).validate().is_err());

        let l = line(ReturnCondition::Intacto, None);
        assert!(request(vec![l.clone(), l]).validate().is_err());
    }

    #[test]
    fn refund_requires_manager() {
        assert!(matches!(
            authorize_refund(RefundChannel::Refund, &identity(EmployeeRole::Vendedor)),
            Err(AppError::Authorization(_))
        ));
        assert!(authorize_refund(RefundChannel::Refund, &identity(EmployeeRole::Gerente)).is_ok());
        assert!(
            authorize_refund(RefundChannel::WalletCredit, &identity(EmployeeRole::Vendedor)).is_ok()
        );
    }
}
