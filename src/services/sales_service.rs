// src/services/sales_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SalesRepository,
    models::{
        commission::ReversalReason,
        sales::{Sale, SaleStatus},
        tenancy::Scope,
    },
    services::commission_service::CommissionService,
};

#[derive(Clone)]
pub struct SalesService {
    sales_repo: SalesRepository,
    commission_service: CommissionService,
    pool: sqlx::PgPool,
}

impl SalesService {
    pub fn new(
        sales_repo: SalesRepository,
        commission_service: CommissionService,
        pool: sqlx::PgPool,
    ) -> Self {
        Self { sales_repo, commission_service, pool }
    }

    pub async fn get_sale(&self, scope: &Scope, sale_id: Uuid) -> Result<Sale, AppError> {
        self.sales_repo
            .find_sale(&self.pool, scope.tenant_id, scope.store_id, sale_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Venda não encontrada.".into()))
    }

    /// Troca o status e dispara a comissão correspondente depois do commit.
    pub async fn update_sale_status(
        &self,
        scope: &Scope,
        sale_id: Uuid,
        status: SaleStatus,
    ) -> Result<Sale, AppError> {
        if status == SaleStatus::Devolvida {
            return Err(AppError::Validation(
                "Use o processo de devolução para devolver uma venda.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current = self
            .sales_repo
            .find_sale_for_update(&mut *tx, scope.tenant_id, scope.store_id, sale_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Venda não encontrada.".into()))?;

        if current.status == SaleStatus::Devolvida {
            return Err(AppError::Validation(
                "Venda devolvida não pode mudar de status.".into(),
            ));
        }

        let sale = self
            .sales_repo
            .update_status(&mut *tx, scope.tenant_id, scope.store_id, sale_id, status)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🧾 Venda {}: {} -> {}",
            sale_id,
            current.status.label(),
            sale.status.label()
        );

        match status {
            SaleStatus::Fechada => self.commission_service.recompute_commission(scope, sale_id).await,
            SaleStatus::Cancelada => {
                self.commission_service
                    .cancel_commission(scope, sale_id, ReversalReason::VendaCancelada)
                    .await
            }
            SaleStatus::EmAberto => {
                self.commission_service
                    .cancel_commission(scope, sale_id, ReversalReason::VendaReaberta)
                    .await
            }
            SaleStatus::Devolvida => {}
        }

        Ok(sale)
    }
}
