// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::middleware::auth::{auth_guard, tenant_guard};

/// Todas as rotas da API. O `main` só liga o servidor.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let public_routes = Router::new()
        .route("/tickets/{token}", get(handlers::assistance::public_ticket));

    // Só JWT
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/tenants", get(handlers::auth::get_my_tenants))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // JWT + loja
    let store_routes = Router::new()
        .route("/stores", get(handlers::auth::list_stores))
        .route("/verify-pin", post(handlers::auth::verify_pin));

    let inventory_routes = Router::new()
        .route(
            "/movements",
            post(handlers::inventory::record_movement).get(handlers::inventory::list_movements),
        )
        .route("/low-stock", get(handlers::inventory::list_low_stock))
        .route("/leftovers", get(handlers::inventory::find_leftovers));

    let return_routes = Router::new().route("/", post(handlers::returns::process_return));

    let sales_routes = Router::new()
        .route("/{id}", get(handlers::sales::get_sale))
        .route("/{id}/status", patch(handlers::sales::update_sale_status));

    let commission_routes = Router::new()
        .route("/sales/{id}", get(handlers::commissions::list_sale_commissions))
        .route("/sales/{id}/recompute", post(handlers::commissions::recompute_commission))
        .route("/pay", post(handlers::commissions::pay_commissions))
        .route("/report", get(handlers::commissions::commission_report));

    let assistance_routes = Router::new()
        .route(
            "/tickets",
            post(handlers::assistance::create_ticket).get(handlers::assistance::list_open_tickets),
        )
        .route("/tickets/{id}/status", patch(handlers::assistance::advance_ticket_status))
        .route("/tickets/{id}/interactions", post(handlers::assistance::add_interaction))
        .route("/tickets/{id}/timeline", get(handlers::assistance::get_timeline));

    let wallet_routes = Router::new().route("/{customer_id}", get(handlers::wallet::get_wallet));

    // Tudo que depende de loja passa pelo tenant_guard
    let tenant_scoped = |routes: Router<AppState>| {
        routes.layer(axum_middleware::from_fn_with_state(app_state.clone(), tenant_guard))
    };

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/public", public_routes)
        .nest("/api/users", user_routes)
        .nest("/api/store", tenant_scoped(store_routes))
        .nest("/api/inventory", tenant_scoped(inventory_routes))
        .nest("/api/returns", tenant_scoped(return_routes))
        .nest("/api/sales", tenant_scoped(sales_routes))
        .nest("/api/commissions", tenant_scoped(commission_routes))
        .nest("/api/assistance", tenant_scoped(assistance_routes))
        .nest("/api/wallets", tenant_scoped(wallet_routes))
        .with_state(app_state)
}
