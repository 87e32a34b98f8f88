// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{Claims, EmployeeIdentity, User},
        tenancy::Scope,
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn register_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        // Hash fora da transação: não toca no banco
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let new_user = self
            .user_repo
            .create_user(&self.pool, email.trim(), &hashed_password)
            .await?;

        tracing::info!("👤 Usuário {} registrado", new_user.id);
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // bcrypt é caro; roda fora do executor assíncrono
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Confere o PIN do funcionário no balcão e devolve quem autorizou.
    /// Funcionário inativo, inexistente ou PIN errado dão o mesmo erro.
    pub async fn verify_pin(
        &self,
        scope: &Scope,
        employee_id: Uuid,
        pin: &str,
    ) -> Result<EmployeeIdentity, AppError> {
        let employee = self
            .user_repo
            .find_employee(&self.pool, scope.tenant_id, scope.store_id, employee_id)
            .await?
            .filter(|e| e.is_active)
            .ok_or(AppError::InvalidPin)?;

        let pin_clone = pin.to_owned();
        let pin_hash_clone = employee.pin_hash.clone();
        let is_pin_valid = tokio::task::spawn_blocking(move || verify(&pin_clone, &pin_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de PIN: {}", e))?
            .unwrap_or(false);

        if !is_pin_valid {
            tracing::warn!("PIN recusado para o funcionário {}", employee_id);
            return Err(AppError::InvalidPin);
        }

        Ok(EmployeeIdentity::from(&employee))
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("url válida");
        AuthService::new(UserRepository::new(pool.clone()), "segredo-de-teste".into(), pool)
    }

    #[tokio::test]
    async fn issued_token_decodes_with_same_secret() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let token = svc.create_token(user_id).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"segredo-de-teste"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, user_id);
        assert!(data.claims.exp > data.claims.iat);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_before_touching_db() {
        let svc = service();
        let err = svc.validate_token("nao-e-um-jwt").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
