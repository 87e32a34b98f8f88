mod common;

use rust_decimal::Decimal;
use uuid::Uuid;

use common::{insert_product, insert_variant, movement_count, product_stock, setup, variant_stock};
use otica_backend::{
    common::error::AppError,
    models::inventory::{
        AdjustmentDirection, EyeSide, LeftoverRemnant, MovementFilters, MovementType, NewMovement,
    },
};

fn movement(product_id: Uuid, employee_id: Uuid, movement_type: MovementType, quantity: i32) -> NewMovement {
    NewMovement {
        product_id,
        variant_id: None,
        movement_type,
        quantity,
        reason: format!("Teste {}", movement_type.label()),
        employee_id,
        adjustment: None,
        related_sale_id: None,
        related_ticket_id: None,
        leftover: None,
    }
}

#[tokio::test]
async fn stock_equals_sum_of_deltas() {
    let Some(fx) = setup().await else { return };
    let inventory = &fx.state.inventory_service;
    let product_id = insert_product(&fx.pool, &fx.scope, "Armação Aviador", 0, Decimal::new(8000, 2)).await;

    for (kind, qty) in [(MovementType::Entrada, 10), (MovementType::Saida, 3), (MovementType::Entrada, 5)] {
        inventory
            .record_movement(&fx.pool, &fx.scope, &movement(product_id, fx.manager_id, kind, qty))
            .await
            .unwrap();
    }

    let mut down = movement(product_id, fx.manager_id, MovementType::Ajuste, 2);
    down.adjustment = Some(AdjustmentDirection::Decrease);
    let outcome = inventory.record_movement(&fx.pool, &fx.scope, &down).await.unwrap();
    assert_eq!(outcome.movement.delta, -2);
    assert_eq!(outcome.stock_after, 10);

    let ledger_sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM stock_movements WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_one(&fx.pool)
    .await
    .unwrap();
    assert_eq!(product_stock(&fx.pool, product_id).await, 10);
    assert_eq!(ledger_sum, 10);
}

#[tokio::test]
async fn variant_movement_moves_product_too() {
    let Some(fx) = setup().await else { return };
    let product_id = insert_product(&fx.pool, &fx.scope, "Lente Visão Simples", 8, Decimal::new(4000, 2)).await;
    let variant_id = insert_variant(&fx.pool, &fx.scope, product_id, 8).await;

    let mut input = movement(product_id, fx.manager_id, MovementType::Saida, 3);
    input.variant_id = Some(variant_id);
    let outcome = fx.state.inventory_service.record_movement(&fx.pool, &fx.scope, &input).await.unwrap();

    assert_eq!(outcome.stock_after, 5);
    assert_eq!(variant_stock(&fx.pool, variant_id).await, 5);
    assert_eq!(product_stock(&fx.pool, product_id).await, 5);
    assert_eq!(outcome.movement.unit_cost, Decimal::new(4000, 2));
}

#[tokio::test]
async fn breakage_with_remnant_creates_one_leftover() {
    let Some(fx) = setup().await else { return };
    let product_id = insert_product(&fx.pool, &fx.scope, "Lente Multifocal", 4, Decimal::new(15000, 2)).await;
    let variant_id = insert_variant(&fx.pool, &fx.scope, product_id, 4).await;

    let mut input = movement(product_id, fx.manager_id, MovementType::Perda, 1);
    input.variant_id = Some(variant_id);
    input.reason = "Quebra na montagem".into();
    input.leftover = Some(LeftoverRemnant {
        diameter: Decimal::new(65, 0),
        eye_side: EyeSide::OD,
        sphere: None,
        cylinder: None,
    });

    let outcome = fx.state.inventory_service.record_movement(&fx.pool, &fx.scope, &input).await.unwrap();
    let leftover = outcome.leftover.expect("sobra criada");

    assert!(leftover.variant.is_leftover);
    assert_eq!(leftover.variant.stock, 1);
    assert_eq!(leftover.variant.unit_cost, Decimal::ZERO);
    assert_eq!(leftover.variant.name.as_deref(), Some("Sobra OD Ø65 (Recup. Quebra)"));
    // O pedaço não herda o grau da lente quebrada
    assert_eq!(leftover.variant.sphere, None);
    assert_eq!(leftover.movement.movement_type, MovementType::Entrada);
    assert_eq!(leftover.movement.delta, 1);

    // 4 - 1 (perda) + 1 (sobra)
    assert_eq!(product_stock(&fx.pool, product_id).await, 4);
    assert_eq!(variant_stock(&fx.pool, variant_id).await, 3);
    assert_eq!(movement_count(&fx.pool, product_id).await, 2);

    let leftovers: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM product_variants WHERE product_id = $1 AND is_leftover",
    )
    .bind(product_id)
    .fetch_one(&fx.pool)
    .await
    .unwrap();
    assert_eq!(leftovers, 1);
}

#[tokio::test]
async fn concurrent_exits_do_not_lose_updates() {
    let Some(fx) = setup().await else { return };
    let product_id = insert_product(&fx.pool, &fx.scope, "Estojo", 50, Decimal::new(500, 2)).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let inventory = fx.state.inventory_service.clone();
        let pool = fx.pool.clone();
        let scope = fx.scope;
        let input = movement(product_id, fx.manager_id, MovementType::Saida, 1);
        handles.push(tokio::spawn(async move {
            inventory.record_movement(&pool, &scope, &input).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(product_stock(&fx.pool, product_id).await, 30);
    assert_eq!(movement_count(&fx.pool, product_id).await, 20);
}

#[tokio::test]
async fn ledger_rejects_update_and_delete() {
    let Some(fx) = setup().await else { return };
    let product_id = insert_product(&fx.pool, &fx.scope, "Cordão", 0, Decimal::ZERO).await;
    let outcome = fx
        .state
        .inventory_service
        .record_movement(&fx.pool, &fx.scope, &movement(product_id, fx.manager_id, MovementType::Entrada, 2))
        .await
        .unwrap();

    let update = sqlx::query("UPDATE stock_movements SET reason = 'x' WHERE id = $1")
        .bind(outcome.movement.id)
        .execute(&fx.pool)
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM stock_movements WHERE id = $1")
        .bind(outcome.movement.id)
        .execute(&fx.pool)
        .await;
    assert!(delete.is_err());
    assert_eq!(movement_count(&fx.pool, product_id).await, 1);
}

#[tokio::test]
async fn invalid_input_writes_nothing() {
    let Some(fx) = setup().await else { return };
    let inventory = &fx.state.inventory_service;
    let product_id = insert_product(&fx.pool, &fx.scope, "Flanela", 3, Decimal::ZERO).await;

    let zero = movement(product_id, fx.manager_id, MovementType::Saida, 0);
    assert!(matches!(
        inventory.record_movement(&fx.pool, &fx.scope, &zero).await,
        Err(AppError::Validation(_))
    ));

    let mut ghost = movement(product_id, fx.manager_id, MovementType::Saida, 1);
    ghost.variant_id = Some(Uuid::new_v4());
    assert!(matches!(
        inventory.record_movement(&fx.pool, &fx.scope, &ghost).await,
        Err(AppError::NotFound(_))
    ));

    let unknown = movement(Uuid::new_v4(), fx.manager_id, MovementType::Entrada, 1);
    assert!(matches!(
        inventory.record_movement(&fx.pool, &fx.scope, &unknown).await,
        Err(AppError::NotFound(_))
    ));

    assert_eq!(product_stock(&fx.pool, product_id).await, 3);
    assert_eq!(movement_count(&fx.pool, product_id).await, 0);
}

#[tokio::test]
async fn history_filters_by_type_and_reason() {
    let Some(fx) = setup().await else { return };
    let inventory = &fx.state.inventory_service;
    let product_id = insert_product(&fx.pool, &fx.scope, "Lente Solar", 0, Decimal::ZERO).await;

    inventory
        .record_movement(&fx.pool, &fx.scope, &movement(product_id, fx.manager_id, MovementType::Entrada, 5))
        .await
        .unwrap();
    let mut broken = movement(product_id, fx.manager_id, MovementType::Perda, 1);
    broken.reason = "Quebra no laboratório".into();
    inventory.record_movement(&fx.pool, &fx.scope, &broken).await.unwrap();

    let all = inventory.list_movements(&fx.scope, &MovementFilters::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    // Mais recente primeiro
    assert_eq!(all[0].movement_type, MovementType::Perda);
    assert_eq!(all[0].employee_name, "Gerente Ana");

    let only_losses = MovementFilters { movement_type: Some("Perda".into()), ..Default::default() };
    let rows = inventory.list_movements(&fx.scope, &only_losses).await.unwrap();
    assert_eq!(rows.len(), 1);

    let by_reason = MovementFilters { search: Some("QUEBRA".into()), ..Default::default() };
    let rows = inventory.list_movements(&fx.scope, &by_reason).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].reason, "Quebra no laboratório");
}

#[tokio::test]
async fn reason_search_treats_wildcards_as_text() {
    let Some(fx) = setup().await else { return };
    let inventory = &fx.state.inventory_service;
    let product_id = insert_product(&fx.pool, &fx.scope, "Lente Fotossensível", 0, Decimal::ZERO).await;

    for reason in ["Acerto 10% do lote", "Acerto 100 do lote", "Lote_A conferido", "LoteBA conferido"] {
        let mut input = movement(product_id, fx.manager_id, MovementType::Entrada, 1);
        input.reason = reason.into();
        inventory.record_movement(&fx.pool, &fx.scope, &input).await.unwrap();
    }

    let percent = MovementFilters { search: Some("10%".into()), ..Default::default() };
    let rows = inventory.list_movements(&fx.scope, &percent).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].reason, "Acerto 10% do lote");

    let underscore = MovementFilters { search: Some("lote_a".into()), ..Default::default() };
    let rows = inventory.list_movements(&fx.scope, &underscore).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].reason, "Lote_A conferido");
}

#[tokio::test]
async fn compatible_leftovers_match_by_diopter() {
    let Some(fx) = setup().await else { return };
    let product_id = insert_product(&fx.pool, &fx.scope, "Lente CR-39", 2, Decimal::ZERO).await;
    let variant_id = insert_variant(&fx.pool, &fx.scope, product_id, 2).await;

    let mut input = movement(product_id, fx.manager_id, MovementType::Perda, 1);
    input.variant_id = Some(variant_id);
    input.leftover = Some(LeftoverRemnant {
        diameter: Decimal::new(60, 0),
        eye_side: EyeSide::OE,
        sphere: Some(Decimal::new(-125, 2)),
        cylinder: Some(Decimal::new(-50, 2)),
    });
    fx.state.inventory_service.record_movement(&fx.pool, &fx.scope, &input).await.unwrap();

    let leftovers = &fx.state.leftover_service;
    let found = leftovers.find_compatible_leftovers(&fx.scope, "-1,25", "-0,50", None).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].eye_side, Some(EyeSide::OE));

    let too_small = leftovers
        .find_compatible_leftovers(&fx.scope, "-1.25", "-0.5", Some(Decimal::new(65, 0)))
        .await
        .unwrap();
    assert!(too_small.is_empty());

    let garbage = leftovers.find_compatible_leftovers(&fx.scope, "abc", "-0,50", None).await.unwrap();
    assert!(garbage.is_empty());
}
