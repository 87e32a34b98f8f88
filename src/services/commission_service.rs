// src/services/commission_service.rs

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CommissionRepository, SalesRepository, UserRepository},
    models::{
        commission::{
            classify_payment_method, Commission, CommissionBreakdown, CommissionInput,
            CommissionRates, CommissionStatus, CommissionSummary, PaymentClass,
            ReversalReason, SaleCommission,
        },
        inventory::store_local_midnight,
        tenancy::Scope,
    },
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Cálculo puro da comissão de uma venda.
/// garantido x taxa garantida + risco x taxa de risco + margem x taxa de lucro.
pub fn calculate_commission(input: &CommissionInput) -> CommissionBreakdown {
    let rates = &input.rates;

    let guaranteed_amount: Decimal = input
        .payments
        .iter()
        .filter(|(_, method)| classify_payment_method(method) == PaymentClass::Guaranteed)
        .map(|(amount, _)| *amount)
        .sum();
    let risk_amount = input.sale_value - guaranteed_amount;

    let mut total = Decimal::ZERO;
    if guaranteed_amount > Decimal::ZERO && rates.guaranteed > Decimal::ZERO {
        total += guaranteed_amount * rates.guaranteed / HUNDRED;
    }
    if risk_amount > Decimal::ZERO && rates.risk > Decimal::ZERO {
        total += risk_amount * rates.risk / HUNDRED;
    }

    let total_cost: Decimal = input
        .item_costs
        .iter()
        .map(|(cost, qty)| *cost * Decimal::from(*qty))
        .sum();
    let margin = input.sale_value - total_cost;
    if margin > Decimal::ZERO && rates.profit > Decimal::ZERO {
        total += margin * rates.profit / HUNDRED;
    }

    CommissionBreakdown {
        guaranteed_amount,
        risk_amount,
        margin,
        total: total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    }
}

#[derive(Clone)]
pub struct CommissionService {
    pool: PgPool,
    commission_repo: CommissionRepository,
    sales_repo: SalesRepository,
    user_repo: UserRepository,
}

impl CommissionService {
    pub fn new(
        pool: PgPool,
        commission_repo: CommissionRepository,
        sales_repo: SalesRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self { pool, commission_repo, sales_repo, user_repo }
    }

    /// Recalcula a comissão da venda. Erros são registrados e engolidos:
    /// a operação de venda que disparou o cálculo nunca falha por causa dele.
    pub async fn recompute_commission(&self, scope: &Scope, sale_id: Uuid) {
        if let Err(e) = self.try_recompute(scope, sale_id).await {
            tracing::error!("Erro silencioso ao calcular comissão da venda {}: {}", sale_id, e);
        }
    }

    /// Versão que devolve o erro. `Ok(None)` quando nada foi gravado.
    pub async fn try_recompute(
        &self,
        scope: &Scope,
        sale_id: Uuid,
    ) -> Result<Option<Commission>, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self
            .sales_repo
            .find_sale(&mut *tx, scope.tenant_id, scope.store_id, sale_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Venda não encontrada.".into()))?;

        if !sale.status.accrues_commission() {
            tracing::debug!("Venda {} está {}; comissão não calculada", sale_id, sale.status.label());
            return Ok(None);
        }

        let Some(employee_id) = sale.employee_id else {
            return Ok(None);
        };
        let Some(employee) = self
            .user_repo
            .find_employee(&mut *tx, scope.tenant_id, scope.store_id, employee_id)
            .await?
        else {
            return Ok(None);
        };

        let rates = CommissionRates::from(&employee);
        if rates.is_zero() {
            return Ok(None);
        }

        let payments = self.sales_repo.list_payments(&mut *tx, scope.tenant_id, sale_id).await?;
        let items = self.sales_repo.list_items(&mut *tx, scope.tenant_id, sale_id).await?;

        let breakdown = calculate_commission(&CommissionInput {
            sale_value: sale.final_value,
            payments: payments.into_iter().map(|p| (p.amount, p.method)).collect(),
            item_costs: items.iter().map(|i| (i.unit_cost, i.quantity)).collect(),
            rates,
        });

        // Comissão zerada não apaga nem grava nada.
        if breakdown.total <= Decimal::ZERO {
            return Ok(None);
        }

        let commission = self
            .commission_repo
            .upsert_pending(
                &mut *tx,
                scope.tenant_id,
                scope.store_id,
                employee_id,
                sale_id,
                breakdown.total,
            )
            .await?;

        tx.commit().await?;

        match &commission {
            Some(c) => tracing::info!("💰 Comissão {} da venda {}: {}", c.id, sale_id, c.amount),
            None => tracing::warn!("Comissão da venda {} já paga; recálculo ignorado", sale_id),
        }
        Ok(commission)
    }

    /// Estorna as comissões pendentes da venda (fire-and-forget).
    pub async fn cancel_commission(&self, scope: &Scope, sale_id: Uuid, reason: ReversalReason) {
        match self.reverse_pending(&self.pool, scope, sale_id, reason).await {
            Ok(n) if n > 0 => tracing::info!("↩️ {} comissão(ões) estornada(s) na venda {}", n, sale_id),
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Erro silencioso ao cancelar comissão da venda {}: {}", sale_id, e)
            }
        }
    }

    /// Estorno que participa da transação de quem chama (ex: devolução).
    pub async fn reverse_pending<'e, E>(
        &self,
        executor: E,
        scope: &Scope,
        sale_id: Uuid,
        reason: ReversalReason,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.commission_repo
            .reverse_pending(executor, scope.tenant_id, scope.store_id, sale_id, reason)
            .await
    }

    /// Todas as comissões já geradas para a venda, da mais antiga à mais nova.
    pub async fn sale_commissions(
        &self,
        scope: &Scope,
        sale_id: Uuid,
    ) -> Result<Vec<SaleCommission>, AppError> {
        let rows = self
            .commission_repo
            .list_for_sale(&self.pool, scope.tenant_id, scope.store_id, sale_id)
            .await?;
        Ok(rows.into_iter().map(SaleCommission::from).collect())
    }

    /// Pagamento em lote. Só o que está Pendente vira Pago; o resto é ignorado.
    pub async fn pay_commissions_batch(
        &self,
        scope: &Scope,
        employee_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::Validation("Selecione ao menos uma comissão.".into()));
        }

        let flipped = self
            .commission_repo
            .pay_batch(&self.pool, scope.tenant_id, scope.store_id, employee_id, ids)
            .await?;

        tracing::info!(
            "💸 {} de {} comissão(ões) pagas para o funcionário {}",
            flipped,
            ids.len(),
            employee_id
        );
        Ok(flipped)
    }

    /// Relatório por funcionário no período (dias inclusivos, fuso da loja).
    pub async fn commission_report(
        &self,
        scope: &Scope,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<CommissionSummary>, AppError> {
        if end_date < start_date {
            return Err(AppError::Validation(
                "A data final deve ser igual ou posterior à inicial.".into(),
            ));
        }
        let start = store_local_midnight(start_date);
        let end = end_date.checked_add_days(Days::new(1)).and_then(store_local_midnight);
        let (Some(start), Some(end)) = (start, end) else {
            return Err(AppError::Validation("Período inválido.".into()));
        };

        let rows = self
            .commission_repo
            .list_report_rows(&self.pool, scope.tenant_id, scope.store_id, start, end)
            .await?;

        let mut summaries: Vec<CommissionSummary> = Vec::new();
        for row in rows {
            let idx = match summaries.iter().position(|s| s.employee_id == row.employee_id) {
                Some(idx) => idx,
                None => {
                    summaries.push(CommissionSummary {
                        employee_id: row.employee_id,
                        employee_name: row.employee_name.clone(),
                        sales_total: Decimal::ZERO,
                        pending_total: Decimal::ZERO,
                        paid_total: Decimal::ZERO,
                        details: Vec::new(),
                    });
                    summaries.len() - 1
                }
            };
            let summary = &mut summaries[idx];
            match row.status {
                CommissionStatus::Pago => summary.paid_total += row.amount,
                _ => summary.pending_total += row.amount,
            }
            summary.sales_total += row.sale_value;
            summary.details.push(row);
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(guaranteed: i64, risk: i64, profit: i64) -> CommissionRates {
        CommissionRates {
            guaranteed: Decimal::from(guaranteed),
            risk: Decimal::from(risk),
            profit: Decimal::from(profit),
            ..Default::default()
        }
    }

    #[test]
    fn pix_plus_financed_example() {
        let input = CommissionInput {
            sale_value: Decimal::from(1000),
            payments: vec![
                (Decimal::from(600), "PIX".into()),
                (Decimal::from(400), "Crediário".into()),
            ],
            item_costs: vec![],
            rates: rates(5, 2, 0),
        };
        let b = calculate_commission(&input);
        assert_eq!(b.guaranteed_amount, Decimal::from(600));
        assert_eq!(b.risk_amount, Decimal::from(400));
        assert_eq!(b.total, Decimal::new(3800, 2));
    }

    #[test]
    fn store_credit_payment_is_risk() {
        let input = CommissionInput {
            sale_value: Decimal::from(1000),
            payments: vec![
                (Decimal::from(600), "PIX".into()),
                (Decimal::from(400), "Crédito em Loja".into()),
            ],
            item_costs: vec![],
            rates: rates(5, 2, 0),
        };
        let b = calculate_commission(&input);
        assert_eq!(b.guaranteed_amount, Decimal::from(600));
        assert_eq!(b.total, Decimal::new(3800, 2));
    }

    #[test]
    fn unpaid_balance_counts_as_risk() {
        let input = CommissionInput {
            sale_value: Decimal::from(500),
            payments: vec![(Decimal::from(200), "Dinheiro".into())],
            item_costs: vec![],
            rates: rates(0, 10, 0),
        };
        assert_eq!(calculate_commission(&input).total, Decimal::from(30));
    }

    #[test]
    fn profit_share_uses_margin_over_cost() {
        let input = CommissionInput {
            sale_value: Decimal::from(300),
            payments: vec![(Decimal::from(300), "Cartão de Crédito".into())],
            item_costs: vec![(Decimal::from(50), 2)],
            rates: rates(0, 0, 10),
        };
        let b = calculate_commission(&input);
        assert_eq!(b.margin, Decimal::from(200));
        assert_eq!(b.total, Decimal::from(20));
    }

    #[test]
    fn negative_margin_adds_nothing() {
        let input = CommissionInput {
            sale_value: Decimal::from(100),
            payments: vec![(Decimal::from(100), "PIX".into())],
            item_costs: vec![(Decimal::from(150), 1)],
            rates: rates(0, 0, 10),
        };
        assert_eq!(calculate_commission(&input).total, Decimal::ZERO);
    }

    #[test]
    fn overpayment_never_produces_negative_risk_commission() {
        let input = CommissionInput {
            sale_value: Decimal::from(100),
            payments: vec![(Decimal::from(120), "Dinheiro".into())],
            item_costs: vec![],
            rates: rates(1, 50, 0),
        };
        let b = calculate_commission(&input);
        assert_eq!(b.risk_amount, Decimal::from(-20));
        assert_eq!(b.total, Decimal::new(120, 2));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 0,125 -> 0,13
        let input = CommissionInput {
            sale_value: Decimal::new(25, 1),
            payments: vec![(Decimal::new(25, 1), "PIX".into())],
            item_costs: vec![],
            rates: rates(5, 0, 0),
        };
        assert_eq!(calculate_commission(&input).total, Decimal::new(13, 2));
    }
}
