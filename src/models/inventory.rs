// src/models/inventory.rs

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::error::AppError;

/// Datas de filtro chegam como dia civil no fuso de Brasília (-03:00).
const STORE_UTC_OFFSET_SECS: i32 = -3 * 3600;

// --- 1. Produto (o "saldo" agregado) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub barcode: Option<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub stock: i32,
    pub min_stock: i32,
    pub created_at: DateTime<Utc>,
}

// --- 2. Variante (grau, diâmetro, olho; sobras também vivem aqui) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "eye_side")]
pub enum EyeSide {
    OD,
    OE,
}

impl fmt::Display for EyeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EyeSide::OD => write!(f, "OD"),
            EyeSide::OE => write!(f, "OE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub name: Option<String>,
    pub sphere: Option<Decimal>,
    pub cylinder: Option<Decimal>,
    pub axis: Option<i32>,
    pub addition: Option<Decimal>,
    pub diameter: Option<Decimal>,
    pub eye_side: Option<EyeSide>,
    pub is_leftover: bool,
    pub stock: i32,
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

// --- 3. Movimentações (livro-razão) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "movement_type")]
pub enum MovementType {
    Entrada,
    Saida,
    Perda,
    Ajuste,
    Devolucao,
    Brinde,
}

impl MovementType {
    /// +1 para o que entra no estoque, -1 para o que sai.
    pub fn sign(self) -> i32 {
        match self {
            MovementType::Entrada | MovementType::Ajuste | MovementType::Devolucao => 1,
            MovementType::Saida | MovementType::Perda | MovementType::Brinde => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MovementType::Entrada => "Entrada",
            MovementType::Saida => "Saida",
            MovementType::Perda => "Perda",
            MovementType::Ajuste => "Ajuste",
            MovementType::Devolucao => "Devolucao",
            MovementType::Brinde => "Brinde",
        }
    }
}

impl FromStr for MovementType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entrada" => Ok(MovementType::Entrada),
            "Saida" => Ok(MovementType::Saida),
            "Perda" => Ok(MovementType::Perda),
            "Ajuste" => Ok(MovementType::Ajuste),
            "Devolucao" => Ok(MovementType::Devolucao),
            "Brinde" => Ok(MovementType::Brinde),
            other => Err(AppError::Validation(format!(
                "Tipo de movimentação desconhecido: {}",
                other
            ))),
        }
    }
}

/// Sentido de um `Ajuste`. Sem indicação, o ajuste soma.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum AdjustmentDirection {
    #[default]
    Increase,
    Decrease,
}

/// Quantidade com sinal que o movimento aplica ao contador de estoque.
pub fn signed_delta(
    movement_type: MovementType,
    quantity: i32,
    adjustment: Option<AdjustmentDirection>,
) -> i32 {
    match (movement_type, adjustment.unwrap_or_default()) {
        (MovementType::Ajuste, AdjustmentDirection::Decrease) => -quantity,
        _ => quantity * movement_type.sign(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub delta: i32,
    pub reason: String,
    pub unit_cost: Decimal,
    pub employee_id: Uuid,
    pub registered_by: Uuid,
    pub related_sale_id: Option<Uuid>,
    pub related_ticket_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Linha do histórico, já com os nomes para exibição.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub delta: i32,
    pub reason: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub barcode: Option<String>,
    pub variant_id: Option<Uuid>,
    pub variant_name: Option<String>,
    pub employee_name: String,
}

/// Pedaço de lente aproveitável que sobrou de uma quebra ou devolução.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeftoverRemnant {
    pub diameter: Decimal,
    pub eye_side: EyeSide,
    // Grau medido no próprio pedaço, quando o operador informa.
    pub sphere: Option<Decimal>,
    pub cylinder: Option<Decimal>,
}

impl LeftoverRemnant {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.diameter <= Decimal::ZERO {
            return Err(AppError::Validation(
                "O diâmetro da sobra deve ser maior que zero.".into(),
            ));
        }
        Ok(())
    }
}

/// Entrada do `record_movement`. `employee_id` é quem autorizou (PIN).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMovement {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: String,
    pub employee_id: Uuid,
    #[serde(default)]
    pub adjustment: Option<AdjustmentDirection>,
    #[serde(default)]
    pub related_sale_id: Option<Uuid>,
    #[serde(default)]
    pub related_ticket_id: Option<Uuid>,
    #[serde(default)]
    pub leftover: Option<LeftoverRemnant>,
}

impl NewMovement {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.quantity <= 0 {
            return Err(AppError::Validation(
                "A quantidade deve ser maior que zero.".into(),
            ));
        }
        if self.reason.trim().chars().count() < 3 {
            return Err(AppError::Validation("O motivo é obrigatório.".into()));
        }
        if let Some(remnant) = &self.leftover {
            if self.movement_type != MovementType::Perda {
                return Err(AppError::Validation(
                    "Sobra só pode ser gerada a partir de uma Perda.".into(),
                ));
            }
            remnant.validate()?;
        }
        Ok(())
    }

    pub fn delta(&self) -> i32 {
        signed_delta(self.movement_type, self.quantity, self.adjustment)
    }
}

/// Sobra criada: a variante nova e a sua linha de Entrada.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivedLeftover {
    pub variant: ProductVariant,
    pub movement: StockMovement,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementOutcome {
    pub movement: StockMovement,
    /// Saldo da variante (ou do produto) depois do movimento
    pub stock_after: i32,
    pub leftover: Option<DerivedLeftover>,
}

// --- 4. Filtros do histórico ---

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MovementFilters {
    /// Dia inicial (inclusive), fuso -03:00
    pub start_date: Option<NaiveDate>,
    /// Dia final (inclusive), fuso -03:00
    pub end_date: Option<NaiveDate>,
    /// Tipo exato; ausente ou "Todos" = qualquer
    pub movement_type: Option<String>,
    /// Trecho do motivo (sem diferenciar maiúsculas)
    pub search: Option<String>,
}

impl MovementFilters {
    pub fn type_filter(&self) -> Result<Option<MovementType>, AppError> {
        match self.movement_type.as_deref().map(str::trim) {
            None | Some("") | Some("Todos") => Ok(None),
            Some(other) => other.parse().map(Some),
        }
    }

    /// Intervalo `[início, fim)` em UTC. O fim é a meia-noite seguinte ao dia final.
    pub fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let start = self.start_date.and_then(store_local_midnight);
        let end = self
            .end_date
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .and_then(store_local_midnight);
        (start, end)
    }

    /// Padrão para `ILIKE ... ESCAPE '\'`; `%` e `_` digitados valem como texto.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                let escaped = s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
                format!("%{}%", escaped)
            })
    }
}

/// Meia-noite do dia civil da loja, em UTC.
pub fn store_local_midnight(day: NaiveDate) -> Option<DateTime<Utc>> {
    let offset = FixedOffset::east_opt(STORE_UTC_OFFSET_SECS)?;
    offset
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

// --- 5. Consultas auxiliares ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeftoverMatch {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: Option<String>,
    pub diameter: Option<Decimal>,
    pub eye_side: Option<EyeSide>,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub barcode: Option<String>,
    pub stock: i32,
    pub min_stock: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(movement_type: MovementType, quantity: i32) -> NewMovement {
        NewMovement {
            product_id: Uuid::new_v4(),
            variant_id: None,
            movement_type,
            quantity,
            reason: "Conferência".into(),
            employee_id: Uuid::new_v4(),
            adjustment: None,
            related_sale_id: None,
            related_ticket_id: None,
            leftover: None,
        }
    }

    #[test]
    fn sign_table() {
        assert_eq!(signed_delta(MovementType::Entrada, 5, None), 5);
        assert_eq!(signed_delta(MovementType::Devolucao, 2, None), 2);
        assert_eq!(signed_delta(MovementType::Ajuste, 4, None), 4);
        assert_eq!(signed_delta(MovementType::Saida, 3, None), -3);
        assert_eq!(signed_delta(MovementType::Perda, 1, None), -1);
        assert_eq!(signed_delta(MovementType::Brinde, 2, None), -2);
    }

    #[test]
    fn adjustment_direction_only_affects_ajuste() {
        let down = Some(AdjustmentDirection::Decrease);
        assert_eq!(signed_delta(MovementType::Ajuste, 4, down), -4);
        assert_eq!(signed_delta(MovementType::Entrada, 4, down), 4);
    }

    #[test]
    fn rejects_non_positive_quantity_and_short_reason() {
        assert!(matches!(
            movement(MovementType::Saida, 0).validate(),
            Err(AppError::Validation(_))
        ));
        let mut m = movement(MovementType::Saida, 1);
        m.reason = " a ".into();
        assert!(matches!(m.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn leftover_only_on_perda() {
        let remnant = LeftoverRemnant {
            diameter: Decimal::new(65, 0),
            eye_side: EyeSide::OD,
            sphere: None,
            cylinder: None,
        };
        let mut m = movement(MovementType::Saida, 1);
        m.leftover = Some(remnant.clone());
        assert!(m.validate().is_err());

        m.movement_type = MovementType::Perda;
        assert!(m.validate().is_ok());
    }

    #[test]
    fn todos_means_any_type() {
        let mut f = MovementFilters::default();
        assert_eq!(f.type_filter().unwrap(), None);
        f.movement_type = Some("Todos".into());
        assert_eq!(f.type_filter().unwrap(), None);
        f.movement_type = Some("Perda".into());
        assert_eq!(f.type_filter().unwrap(), Some(MovementType::Perda));
        f.movement_type = Some("Reserva".into());
        assert!(f.type_filter().is_err());
    }

    #[test]
    fn date_bounds_use_brasilia_offset() {
        let f = MovementFilters {
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 10),
            ..Default::default()
        };
        let (start, end) = f.bounds();
        assert_eq!(start.unwrap().to_rfc3339(), "2025-03-10T03:00:00+00:00");
        assert_eq!(end.unwrap().to_rfc3339(), "2025-03-11T03:00:00+00:00");
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut f = MovementFilters { search: Some("  ".into()), ..Default::default() };
        assert_eq!(f.search_pattern(), None);
        f.search = Some("quebra".into());
        assert_eq!(f.search_pattern().as_deref(), Some("%quebra%"));
    }

    #[test]
    fn search_wildcards_are_literal() {
        let f = MovementFilters { search: Some("10%_off".into()), ..Default::default() };
        assert_eq!(f.search_pattern().as_deref(), Some(r"%10\%\_off%"));
        let f = MovementFilters { search: Some(r"a\b".into()), ..Default::default() };
        assert_eq!(f.search_pattern().as_deref(), Some(r"%a\\b%"));
    }
}
