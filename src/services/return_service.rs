// src/services/return_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::SalesRepository,
    models::{
        auth::EmployeeIdentity,
        commission::ReversalReason,
        inventory::{MovementType, NewMovement},
        returns::{
            authorize_refund, RefundChannel, ReturnCondition, ReturnLine, ReturnOutcome,
            ReturnRequest,
        },
        sales::{SaleItem, SaleStatus},
        tenancy::Scope,
        wallet::WalletCreditRequest,
    },
    services::{
        commission_service::CommissionService,
        inventory_service::InventoryService,
        leftover_service::{LeftoverOrigin, LeftoverService, LeftoverSource},
        wallet_service::WalletCreditService,
    },
};

#[derive(Clone)]
pub struct ReturnService {
    pool: PgPool,
    sales_repo: SalesRepository,
    inventory_service: InventoryService,
    leftover_service: LeftoverService,
    commission_service: CommissionService,
    wallet: Arc<dyn WalletCreditService>,
}

impl ReturnService {
    pub fn new(
        pool: PgPool,
        sales_repo: SalesRepository,
        inventory_service: InventoryService,
        leftover_service: LeftoverService,
        commission_service: CommissionService,
        wallet: Arc<dyn WalletCreditService>,
    ) -> Self {
        Self { pool, sales_repo, inventory_service, leftover_service, commission_service, wallet }
    }

    /// Devolução completa numa única transação: estoque, sobras, crédito,
    /// status da venda e estorno de comissões. Qualquer falha desfaz tudo.
    pub async fn process_return(
        &self,
        scope: &Scope,
        req: &ReturnRequest,
        authorizer: &EmployeeIdentity,
    ) -> Result<ReturnOutcome, AppError> {
        // Nada é escrito antes destas checagens.
        req.validate()?;
        if let Err(e) = authorize_refund(req.channel, authorizer) {
            tracing::warn!(
                "Estorno direto negado para {} ({:?}) na venda {}",
                authorizer.full_name,
                authorizer.role,
                req.sale_id
            );
            return Err(e);
        }

        let mut tx = self.pool.begin().await?;

        let sale = self
            .sales_repo
            .find_sale_for_update(&mut *tx, scope.tenant_id, scope.store_id, req.sale_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Venda não encontrada.".into()))?;

        if sale.status == SaleStatus::Devolvida {
            return Err(AppError::Validation("Esta venda já foi devolvida.".into()));
        }

        let items = self.sales_repo.list_items(&mut *tx, scope.tenant_id, sale.id).await?;

        // Confere todas as linhas antes de mexer no estoque
        let mut resolved: Vec<(&SaleItem, &ReturnLine)> = Vec::new();
        for line in &req.lines {
            let item = items
                .iter()
                .find(|i| i.id == line.sale_item_id)
                .ok_or_else(|| AppError::Validation("Item não pertence a esta venda.".into()))?;
            if line.quantity > item.quantity {
                return Err(AppError::Validation(format!(
                    "Quantidade devolvida ({}) maior que a vendida ({}).",
                    line.quantity, item.quantity
                )));
            }
            if item.product_id.is_none() {
                return Err(AppError::Validation(
                    "Item sem produto cadastrado não pode voltar ao estoque.".into(),
                ));
            }
            resolved.push((item, line));
        }

        let mut refunded_amount = Decimal::ZERO;
        let mut leftover_variant_ids = Vec::new();

        for (item, line) in resolved {
            let Some(product_id) = item.product_id else { continue };
            refunded_amount += item.unit_price * Decimal::from(line.quantity);

            match line.condition {
                ReturnCondition::Intacto => {
                    self.inventory_service
                        .record_movement(
                            &mut *tx,
                            scope,
                            &NewMovement {
                                product_id,
                                variant_id: item.variant_id,
                                movement_type: MovementType::Devolucao,
                                quantity: line.quantity,
                                reason: format!("Devolução Venda #{}", sale.id),
                                employee_id: authorizer.employee_id,
                                adjustment: None,
                                related_sale_id: Some(sale.id),
                                related_ticket_id: None,
                                leftover: None,
                            },
                        )
                        .await?;
                }
                ReturnCondition::Defeito => {
                    self.inventory_service
                        .record_movement(
                            &mut *tx,
                            scope,
                            &NewMovement {
                                product_id,
                                variant_id: item.variant_id,
                                movement_type: MovementType::Perda,
                                quantity: line.quantity,
                                reason: format!("Defeito na Devolução Venda #{}", sale.id),
                                employee_id: authorizer.employee_id,
                                adjustment: None,
                                related_sale_id: Some(sale.id),
                                related_ticket_id: None,
                                leftover: None,
                            },
                        )
                        .await?;
                }
                ReturnCondition::Sobra => {
                    let remnant = line.leftover.as_ref().ok_or_else(|| {
                        AppError::Validation("Informe o diâmetro e o olho da sobra de lente.".into())
                    })?;
                    let derived = self
                        .leftover_service
                        .derive_leftover(
                            &mut *tx,
                            scope,
                            LeftoverSource {
                                product_id,
                                remnant,
                                quantity: line.quantity,
                                origin: LeftoverOrigin::Return,
                                employee_id: authorizer.employee_id,
                                related_sale_id: Some(sale.id),
                                related_ticket_id: None,
                            },
                        )
                        .await?;
                    leftover_variant_ids.push(derived.variant.id);
                }
            }
        }

        let wallet_transaction_id = match req.channel {
            RefundChannel::WalletCredit if refunded_amount > Decimal::ZERO => {
                let credit = self
                    .wallet
                    .grant_credit(
                        &mut *tx,
                        scope,
                        &WalletCreditRequest {
                            customer_id: sale.customer_id,
                            amount: refunded_amount,
                            description: format!("Crédito por devolução Venda #{}", sale.id),
                            employee_id: authorizer.employee_id,
                            related_sale_id: Some(sale.id),
                        },
                    )
                    .await?;
                Some(credit.id)
            }
            _ => None,
        };

        self.sales_repo
            .update_status(&mut *tx, scope.tenant_id, scope.store_id, sale.id, SaleStatus::Devolvida)
            .await?;

        let reversed_commissions = self
            .commission_service
            .reverse_pending(&mut *tx, scope, sale.id, ReversalReason::Devolucao)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🔄 Devolução da venda {} processada: {} via {:?}, {} sobra(s), {} comissão(ões) estornada(s)",
            sale.id,
            refunded_amount,
            req.channel,
            leftover_variant_ids.len(),
            reversed_commissions
        );

        Ok(ReturnOutcome {
            sale_id: sale.id,
            refunded_amount,
            wallet_transaction_id,
            leftover_variant_ids,
            reversed_commissions,
        })
    }
}
