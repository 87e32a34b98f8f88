// src/services/inventory_service.rs

use sqlx::{Acquire, Postgres};

use crate::{
    common::error::AppError,
    db::{inventory_repo::LedgerEntry, InventoryRepository, UserRepository},
    models::{
        inventory::{
            LowStockProduct, MovementFilters, MovementOutcome, MovementType, NewMovement,
            StockMovementView,
        },
        tenancy::Scope,
    },
    services::leftover_service::{LeftoverOrigin, LeftoverService, LeftoverSource},
};

/// Limite usado quando o produto não tem estoque mínimo cadastrado.
const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Quantidade recuperada de uma quebra: um pedaço por evento.
const BREAKAGE_LEFTOVER_QUANTITY: i32 = 1;

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    user_repo: UserRepository,
    leftover_service: LeftoverService,
    movements_page_limit: i64,
}

impl InventoryService {
    pub fn new(
        inventory_repo: InventoryRepository,
        user_repo: UserRepository,
        leftover_service: LeftoverService,
        movements_page_limit: i64,
    ) -> Self {
        Self { inventory_repo, user_repo, leftover_service, movements_page_limit }
    }

    // --- REGISTRAR MOVIMENTAÇÃO ---
    // Aceita pool ou transação aberta. Dentro de outra transação vira SAVEPOINT.
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        scope: &Scope,
        input: &NewMovement,
    ) -> Result<MovementOutcome, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        input.validate()?;

        let mut tx = executor.begin().await?;

        // 1. Produto, variante e funcionário precisam existir nesta loja
        let product = self
            .inventory_repo
            .find_product(&mut *tx, scope.tenant_id, scope.store_id, input.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Produto não encontrado.".into()))?;

        if let Some(variant_id) = input.variant_id {
            self.inventory_repo
                .find_variant(&mut *tx, scope.tenant_id, scope.store_id, product.id, variant_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Variante não encontrada.".into()))?;
        }

        self.user_repo
            .find_employee(&mut *tx, scope.tenant_id, scope.store_id, input.employee_id)
            .await?
            .filter(|e| e.is_active)
            .ok_or_else(|| AppError::NotFound("Funcionário não encontrado.".into()))?;

        // 2. Incremento atômico. O produto trava primeiro, sempre na mesma ordem.
        let delta = input.delta();
        let product_stock = self
            .inventory_repo
            .increment_product_stock(&mut *tx, scope.tenant_id, scope.store_id, product.id, delta)
            .await?
            .ok_or_else(|| AppError::NotFound("Produto não encontrado.".into()))?;

        let stock_after = match input.variant_id {
            Some(variant_id) => self
                .inventory_repo
                .increment_variant_stock(&mut *tx, scope.tenant_id, scope.store_id, variant_id, delta)
                .await?
                .ok_or_else(|| AppError::NotFound("Variante não encontrada.".into()))?,
            None => product_stock,
        };

        // 3. Livro-razão com o custo do momento
        let movement = self
            .inventory_repo
            .insert_movement(
                &mut *tx,
                scope.tenant_id,
                scope.store_id,
                &LedgerEntry {
                    product_id: product.id,
                    variant_id: input.variant_id,
                    movement_type: input.movement_type,
                    quantity: input.quantity,
                    delta,
                    reason: input.reason.trim(),
                    unit_cost: product.cost_price,
                    employee_id: input.employee_id,
                    registered_by: scope.user_id,
                    related_sale_id: input.related_sale_id,
                    related_ticket_id: input.related_ticket_id,
                },
            )
            .await?;

        // 4. Perda com pedaço aproveitável gera sobra na mesma transação
        let leftover = match (&input.leftover, input.movement_type) {
            (Some(remnant), MovementType::Perda) => Some(
                self.leftover_service
                    .derive_leftover(
                        &mut *tx,
                        scope,
                        LeftoverSource {
                            product_id: product.id,
                            remnant,
                            quantity: BREAKAGE_LEFTOVER_QUANTITY,
                            origin: LeftoverOrigin::Breakage,
                            employee_id: input.employee_id,
                            related_sale_id: input.related_sale_id,
                            related_ticket_id: input.related_ticket_id,
                        },
                    )
                    .await?,
            ),
            _ => None,
        };

        tx.commit().await?;

        tracing::info!(
            "📦 Movimentação {} de {} (delta {}) no produto {}",
            input.movement_type.label(),
            input.quantity,
            delta,
            product.id
        );

        Ok(MovementOutcome { movement, stock_after, leftover })
    }

    // --- HISTÓRICO ---
    pub async fn list_movements(
        &self,
        scope: &Scope,
        filters: &MovementFilters,
    ) -> Result<Vec<StockMovementView>, AppError> {
        let movement_type = filters.type_filter()?;
        let (start, end) = filters.bounds();
        let pattern = filters.search_pattern();

        self.inventory_repo
            .list_movements(
                self.inventory_repo.pool(),
                scope.tenant_id,
                scope.store_id,
                movement_type,
                start,
                end,
                pattern.as_deref(),
                self.movements_page_limit,
            )
            .await
    }

    // --- ESTOQUE BAIXO ---
    pub async fn list_low_stock(
        &self,
        scope: &Scope,
        limit: i64,
    ) -> Result<Vec<LowStockProduct>, AppError> {
        self.inventory_repo
            .list_low_stock(
                self.inventory_repo.pool(),
                scope.tenant_id,
                scope.store_id,
                DEFAULT_LOW_STOCK_THRESHOLD,
                limit.clamp(1, 100),
            )
            .await
    }
}
