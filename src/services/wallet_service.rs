// src/services/wallet_service.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::WalletRepository,
    models::{
        tenancy::Scope,
        wallet::{WalletCreditRequest, WalletStatement, WalletTransaction, RETURN_CREDIT_OPERATION},
    },
};

const WALLET_UNAVAILABLE: &str = "Não foi possível creditar a carteira do cliente.";

/// Conflito sobe como está; o resto vai pro log e volta com mensagem fixa.
fn wallet_failure(step: &str, e: AppError) -> AppError {
    match e {
        AppError::Conflict(_) => e,
        other => {
            tracing::error!("Falha na carteira ({}): {:?}", step, other);
            AppError::Dependency(WALLET_UNAVAILABLE.into())
        }
    }
}

/// Crédito em carteira usado pela devolução. É um trait para que a devolução
/// não dependa da implementação concreta da carteira.
#[async_trait]
pub trait WalletCreditService: Send + Sync {
    /// Roda na transação de quem chama. Qualquer erro desfaz a devolução inteira.
    async fn grant_credit(
        &self,
        conn: &mut PgConnection,
        scope: &Scope,
        req: &WalletCreditRequest,
    ) -> Result<WalletTransaction, AppError>;
}

#[derive(Clone)]
pub struct PgWalletService {
    wallet_repo: WalletRepository,
}

impl PgWalletService {
    pub fn new(wallet_repo: WalletRepository) -> Self {
        Self { wallet_repo }
    }

    pub async fn get_wallet(
        &self,
        scope: &Scope,
        customer_id: Uuid,
    ) -> Result<WalletStatement, AppError> {
        let pool = self.wallet_repo.pool();
        let Some(wallet) = self
            .wallet_repo
            .find_wallet(pool, scope.tenant_id, scope.store_id, customer_id)
            .await?
        else {
            return Ok(WalletStatement {
                customer_id,
                balance: Decimal::ZERO,
                transactions: Vec::new(),
            });
        };

        let transactions = self
            .wallet_repo
            .list_transactions(pool, scope.tenant_id, wallet.id)
            .await?;

        Ok(WalletStatement { customer_id, balance: wallet.balance, transactions })
    }
}

#[async_trait]
impl WalletCreditService for PgWalletService {
    async fn grant_credit(
        &self,
        conn: &mut PgConnection,
        scope: &Scope,
        req: &WalletCreditRequest,
    ) -> Result<WalletTransaction, AppError> {
        if req.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "O valor do crédito deve ser maior que zero.".into(),
            ));
        }

        let wallet = self
            .wallet_repo
            .credit_balance(&mut *conn, scope.tenant_id, scope.store_id, req.customer_id, req.amount)
            .await
            .map_err(|e| wallet_failure("saldo", e))?;

        let transaction = self
            .wallet_repo
            .insert_transaction(
                &mut *conn,
                scope.tenant_id,
                scope.store_id,
                wallet.id,
                req.amount,
                RETURN_CREDIT_OPERATION,
                &req.description,
                req.related_sale_id,
                req.employee_id,
                scope.user_id,
            )
            .await
            .map_err(|e| wallet_failure("extrato", e))?;

        tracing::info!(
            "👛 Crédito de {} na carteira do cliente {} (saldo {})",
            req.amount,
            req.customer_id,
            wallet.balance
        );
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_passes_through() {
        let err = wallet_failure("saldo", AppError::Conflict("Carteira bloqueada".into()));
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Carteira bloqueada"));
    }

    #[test]
    fn database_detail_stays_out_of_the_message() {
        let err = wallet_failure("extrato", AppError::DatabaseError(sqlx::Error::RowNotFound));
        match err {
            AppError::Dependency(msg) => assert_eq!(msg, WALLET_UNAVAILABLE),
            other => panic!("esperava Dependency, veio {:?}", other),
        }
    }
}
