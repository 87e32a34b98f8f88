// src/services/leftover_service.rs

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgConnection;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{inventory_repo::{LedgerEntry, NewLeftoverVariant}, InventoryRepository},
    models::{
        inventory::{DerivedLeftover, LeftoverMatch, LeftoverRemnant, MovementType},
        tenancy::Scope,
    },
};

/// De onde veio a sobra. Muda só o nome e o motivo gravados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeftoverOrigin {
    Breakage,
    Return,
}

#[derive(Debug, Clone)]
pub struct LeftoverSource<'a> {
    pub product_id: Uuid,
    pub remnant: &'a LeftoverRemnant,
    pub quantity: i32,
    pub origin: LeftoverOrigin,
    pub employee_id: Uuid,
    pub related_sale_id: Option<Uuid>,
    pub related_ticket_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct LeftoverService {
    inventory_repo: InventoryRepository,
}

impl LeftoverService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    /// Cria uma variante de sobra nova (custo zero) e a sua Entrada no livro-razão.
    /// Roda dentro da transação de quem chamou. Nunca junta com sobras existentes.
    pub async fn derive_leftover(
        &self,
        conn: &mut PgConnection,
        scope: &Scope,
        source: LeftoverSource<'_>,
    ) -> Result<DerivedLeftover, AppError> {
        source.remnant.validate()?;
        if source.quantity <= 0 {
            return Err(AppError::Validation(
                "A quantidade da sobra deve ser maior que zero.".into(),
            ));
        }

        let name = leftover_name(source.remnant, source.origin);
        let variant = self
            .inventory_repo
            .insert_leftover_variant(
                &mut *conn,
                scope.tenant_id,
                scope.store_id,
                &NewLeftoverVariant {
                    product_id: source.product_id,
                    name: &name,
                    diameter: source.remnant.diameter,
                    eye_side: source.remnant.eye_side,
                    sphere: source.remnant.sphere.map(normalize_diopter),
                    cylinder: source.remnant.cylinder.map(normalize_diopter),
                    stock: source.quantity,
                },
            )
            .await?;

        // A variante já nasce com o saldo; o produto pai acompanha.
        self.inventory_repo
            .increment_product_stock(
                &mut *conn,
                scope.tenant_id,
                scope.store_id,
                source.product_id,
                source.quantity,
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Produto não encontrado.".into()))?;

        let reason = leftover_reason(source.origin, source.related_sale_id);
        let movement = self
            .inventory_repo
            .insert_movement(
                &mut *conn,
                scope.tenant_id,
                scope.store_id,
                &LedgerEntry {
                    product_id: source.product_id,
                    variant_id: Some(variant.id),
                    movement_type: MovementType::Entrada,
                    quantity: source.quantity,
                    delta: source.quantity,
                    reason: &reason,
                    unit_cost: Decimal::ZERO,
                    employee_id: source.employee_id,
                    registered_by: scope.user_id,
                    related_sale_id: source.related_sale_id,
                    related_ticket_id: source.related_ticket_id,
                },
            )
            .await?;

        tracing::info!(
            "♻️ Sobra '{}' criada (variante {}) para o produto {}",
            name,
            variant.id,
            source.product_id
        );

        Ok(DerivedLeftover { variant, movement })
    }

    /// Sobras da loja com saldo e grau igual ao pedido.
    /// Grau ilegível devolve lista vazia.
    pub async fn find_compatible_leftovers(
        &self,
        scope: &Scope,
        sphere: &str,
        cylinder: &str,
        min_diameter: Option<Decimal>,
    ) -> Result<Vec<LeftoverMatch>, AppError> {
        let (Some(sphere), Some(cylinder)) = (parse_diopter(sphere), parse_diopter(cylinder)) else {
            tracing::debug!("Busca de sobras ignorada: grau inválido");
            return Ok(Vec::new());
        };
        let min_diameter = min_diameter.filter(|d| *d > Decimal::ZERO);

        self.inventory_repo
            .find_leftovers(
                self.inventory_repo.pool(),
                scope.tenant_id,
                scope.store_id,
                sphere,
                cylinder,
                min_diameter,
            )
            .await
    }
}

/// "-1,25" e "-1.25" viram o mesmo valor, com duas casas.
pub fn parse_diopter(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', ".");
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    Decimal::from_str(cleaned).ok().map(normalize_diopter)
}

fn normalize_diopter(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn leftover_name(remnant: &LeftoverRemnant, origin: LeftoverOrigin) -> String {
    let base = format!("Sobra {} Ø{}", remnant.eye_side, remnant.diameter.normalize());
    match origin {
        LeftoverOrigin::Breakage => format!("{} (Recup. Quebra)", base),
        LeftoverOrigin::Return => format!("{} (Devolução)", base),
    }
}

fn leftover_reason(origin: LeftoverOrigin, related_sale_id: Option<Uuid>) -> String {
    let sale = related_sale_id.map(|id| id.to_string()).unwrap_or_else(|| "N/A".into());
    match origin {
        LeftoverOrigin::Breakage => format!("Sobra gerada da quebra/perda (Origem: Venda #{})", sale),
        LeftoverOrigin::Return => format!("Sobra de Devolução Venda #{}", sale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::EyeSide;

    fn remnant(diameter: Decimal, eye_side: EyeSide) -> LeftoverRemnant {
        LeftoverRemnant { diameter, eye_side, sphere: None, cylinder: None }
    }

    #[test]
    fn parses_comma_and_dot_diopters() {
        assert_eq!(parse_diopter("-1,25"), Some(Decimal::new(-125, 2)));
        assert_eq!(parse_diopter(" -1.25 "), Some(Decimal::new(-125, 2)));
        assert_eq!(parse_diopter("+2"), Some(Decimal::new(2, 0)));
        assert_eq!(parse_diopter("abc"), None);
        assert_eq!(parse_diopter(""), None);
    }

    #[test]
    fn parsed_diopters_compare_equal() {
        assert_eq!(parse_diopter("-0,5"), parse_diopter("-0.50"));
    }

    #[test]
    fn names_follow_eye_and_diameter() {
        let r = remnant(Decimal::new(650, 1), EyeSide::OD);
        assert_eq!(leftover_name(&r, LeftoverOrigin::Breakage), "Sobra OD Ø65 (Recup. Quebra)");
        let r = remnant(Decimal::new(605, 1), EyeSide::OE);
        assert_eq!(leftover_name(&r, LeftoverOrigin::Return), "Sobra OE Ø60.5 (Devolução)");
    }

    #[test]
    fn reason_mentions_origin_sale() {
        assert_eq!(
            leftover_reason(LeftoverOrigin::Breakage, None),
            "Sobra gerada da quebra/perda (Origem: Venda #N/A)"
        );
        let id = Uuid::nil();
        assert!(leftover_reason(LeftoverOrigin::Return, Some(id)).ends_with(&id.to_string()));
    }
}
