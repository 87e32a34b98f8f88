// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AssistanceRepository, CommissionRepository, InventoryRepository, SalesRepository,
        TenantRepository, UserRepository, WalletRepository,
    },
    services::{
        assistance_service::AssistanceService, auth::AuthService,
        commission_service::CommissionService, inventory_service::InventoryService,
        leftover_service::LeftoverService, return_service::ReturnService,
        sales_service::SalesService, wallet_service::PgWalletService,
    },
};

/// Configuração lida do ambiente (.env incluso).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Máximo de linhas no histórico de movimentações
    pub movements_page_limit: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?,
            movements_page_limit: parse_or(&lookup, "MOVEMENTS_PAGE_LIMIT", 100)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: '{}'", key, raw)),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub tenant_repo: TenantRepository,
    pub inventory_service: InventoryService,
    pub leftover_service: LeftoverService,
    pub commission_service: CommissionService,
    pub sales_service: SalesService,
    pub return_service: ReturnService,
    pub assistance_service: AssistanceService,
    pub wallet_service: PgWalletService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências em cima de um pool já aberto.
    pub fn from_pool(db_pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let sales_repo = SalesRepository::new(db_pool.clone());
        let commission_repo = CommissionRepository::new(db_pool.clone());
        let assistance_repo = AssistanceRepository::new(db_pool.clone());
        let wallet_repo = WalletRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let leftover_service = LeftoverService::new(inventory_repo.clone());
        let inventory_service = InventoryService::new(
            inventory_repo,
            user_repo.clone(),
            leftover_service.clone(),
            config.movements_page_limit,
        );
        let commission_service = CommissionService::new(
            db_pool.clone(),
            commission_repo,
            sales_repo.clone(),
            user_repo,
        );
        let sales_service =
            SalesService::new(sales_repo.clone(), commission_service.clone(), db_pool.clone());
        let wallet_service = PgWalletService::new(wallet_repo);
        let return_service = ReturnService::new(
            db_pool.clone(),
            sales_repo,
            inventory_service.clone(),
            leftover_service.clone(),
            commission_service.clone(),
            Arc::new(wallet_service.clone()),
        );
        let assistance_service =
            AssistanceService::new(db_pool.clone(), assistance_repo, inventory_service.clone());

        Self {
            db_pool,
            auth_service,
            tenant_repo,
            inventory_service,
            leftover_service,
            commission_service,
            sales_service,
            return_service,
            assistance_service,
            wallet_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_keys_are_missing() {
        let cfg = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/otica"),
            ("JWT_SECRET", "s3cr3t"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");
        assert_eq!(cfg.db_max_connections, 5);
        assert_eq!(cfg.db_acquire_timeout_secs, 3);
        assert_eq!(cfg.movements_page_limit, 100);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn malformed_number_is_reported() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("MOVEMENTS_PAGE_LIMIT", "muitos"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("MOVEMENTS_PAGE_LIMIT"));
    }
}
