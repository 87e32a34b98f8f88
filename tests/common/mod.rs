#![allow(dead_code)]

use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use otica_backend::{
    config::{AppState, Config},
    models::{auth::EmployeeRole, sales::SaleStatus, tenancy::Scope},
};

pub const PIN: &str = "1234";

/// Pool de teste. Sem DATABASE_URL (ou sem banco), o teste é pulado.
pub async fn test_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL ausente; teste de integração ignorado");
        return None;
    };
    let pool = match PgPoolOptions::new().max_connections(10).connect(&url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("banco indisponível ({}); teste de integração ignorado", e);
            return None;
        }
    };
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        eprintln!("migrações falharam ({}); teste de integração ignorado", e);
        return None;
    }
    Some(pool)
}

/// Uma rede e uma loja novas por teste, com gerente, vendedor e cliente.
pub struct Fixture {
    pub pool: PgPool,
    pub state: AppState,
    pub scope: Scope,
    pub manager_id: Uuid,
    pub seller_id: Uuid,
    pub customer_id: Uuid,
}

pub async fn setup() -> Option<Fixture> {
    let pool = test_pool().await?;

    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => std::env::var("DATABASE_URL").ok(),
        "JWT_SECRET" => Some("segredo-de-teste".to_string()),
        _ => None,
    })
    .expect("config de teste");
    let state = AppState::from_pool(pool.clone(), &config);

    let tenant_id: Uuid = sqlx::query_scalar("INSERT INTO tenants (name) VALUES ('Rede Teste') RETURNING id")
        .fetch_one(&pool)
        .await
        .unwrap();
    let store_id: Uuid = sqlx::query_scalar(
        "INSERT INTO stores (tenant_id, name) VALUES ($1, 'Ótica Centro') RETURNING id",
    )
    .bind(tenant_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    let user_id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash) VALUES ($1, 'x') RETURNING id",
    )
    .bind(format!("{}@teste.com", Uuid::new_v4()))
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO tenant_members (tenant_id, user_id) VALUES ($1, $2)")
        .bind(tenant_id)
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

    let scope = Scope::new(tenant_id, store_id, user_id);
    let manager_id = insert_employee(&pool, &scope, "Gerente Ana", EmployeeRole::Gerente, (0, 0, 0)).await;
    let seller_id = insert_employee(&pool, &scope, "Vendedor Beto", EmployeeRole::Vendedor, (5, 2, 0)).await;

    let customer_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO customers (tenant_id, store_id, full_name, mobile_phone)
        VALUES ($1, $2, 'Cliente Carla', '11999990000')
        RETURNING id
        "#,
    )
    .bind(tenant_id)
    .bind(store_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    Some(Fixture { pool, state, scope, manager_id, seller_id, customer_id })
}

/// Taxas em % (garantida, risco, lucro).
pub async fn insert_employee(
    pool: &PgPool,
    scope: &Scope,
    name: &str,
    role: EmployeeRole,
    rates: (i64, i64, i64),
) -> Uuid {
    let pin_hash = bcrypt::hash(PIN, 4).unwrap();
    sqlx::query_scalar(
        r#"
        INSERT INTO employees (
            tenant_id, store_id, full_name, pin_hash, role,
            comm_rate_guaranteed, comm_rate_store_credit, comm_rate_profit
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(scope.tenant_id)
    .bind(scope.store_id)
    .bind(name)
    .bind(pin_hash)
    .bind(role)
    .bind(Decimal::from(rates.0))
    .bind(Decimal::from(rates.1))
    .bind(Decimal::from(rates.2))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_product(pool: &PgPool, scope: &Scope, name: &str, stock: i32, cost: Decimal) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO products (tenant_id, store_id, name, cost_price, sale_price, stock)
        VALUES ($1, $2, $3, $4, $4 * 2, $5)
        RETURNING id
        "#,
    )
    .bind(scope.tenant_id)
    .bind(scope.store_id)
    .bind(name)
    .bind(cost)
    .bind(stock)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_variant(pool: &PgPool, scope: &Scope, product_id: Uuid, stock: i32) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO product_variants (
            product_id, tenant_id, store_id, name, sphere, cylinder, diameter, stock
        )
        VALUES ($1, $2, $3, 'Lente -1,25 / -0,50', -1.25, -0.50, 70, $4)
        RETURNING id
        "#,
    )
    .bind(product_id)
    .bind(scope.tenant_id)
    .bind(scope.store_id)
    .bind(stock)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub struct SaleLine {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
}

/// Venda pronta no banco. Devolve (id da venda, ids dos itens na ordem dada).
pub async fn insert_sale(
    fx: &Fixture,
    status: SaleStatus,
    lines: &[SaleLine],
    payments: &[(Decimal, &str)],
) -> (Uuid, Vec<Uuid>) {
    let total: Decimal = lines.iter().map(|l| l.unit_price * Decimal::from(l.quantity)).sum();
    let sale_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO sales (tenant_id, store_id, customer_id, employee_id, status,
                           total_value, discount, final_value)
        VALUES ($1, $2, $3, $4, $5, $6, 0, $6)
        RETURNING id
        "#,
    )
    .bind(fx.scope.tenant_id)
    .bind(fx.scope.store_id)
    .bind(fx.customer_id)
    .bind(fx.seller_id)
    .bind(status)
    .bind(total)
    .fetch_one(&fx.pool)
    .await
    .unwrap();

    let mut item_ids = Vec::new();
    for line in lines {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO sale_items (sale_id, tenant_id, store_id, product_id, variant_id,
                                    quantity, unit_price, line_total, unit_cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7 * $6, $8)
            RETURNING id
            "#,
        )
        .bind(sale_id)
        .bind(fx.scope.tenant_id)
        .bind(fx.scope.store_id)
        .bind(line.product_id)
        .bind(line.variant_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.unit_cost)
        .fetch_one(&fx.pool)
        .await
        .unwrap();
        item_ids.push(id);
    }

    for (amount, method) in payments {
        sqlx::query(
            r#"
            INSERT INTO payments (sale_id, tenant_id, store_id, amount, method)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(sale_id)
        .bind(fx.scope.tenant_id)
        .bind(fx.scope.store_id)
        .bind(amount)
        .bind(*method)
        .execute(&fx.pool)
        .await
        .unwrap();
    }

    (sale_id, item_ids)
}

pub async fn product_stock(pool: &PgPool, product_id: Uuid) -> i32 {
    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn variant_stock(pool: &PgPool, variant_id: Uuid) -> i32 {
    sqlx::query_scalar("SELECT stock FROM product_variants WHERE id = $1")
        .bind(variant_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn movement_count(pool: &PgPool, product_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn sale_status(pool: &PgPool, sale_id: Uuid) -> SaleStatus {
    sqlx::query_scalar("SELECT status FROM sales WHERE id = $1")
        .bind(sale_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn money(units: i64) -> Decimal {
    Decimal::from(units)
}
