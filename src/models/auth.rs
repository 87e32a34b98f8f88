// src/models/auth.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário (login do sistema) vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

// ---
// Funcionários (quem opera o balcão e autoriza com PIN)
// ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "employee_role")]
pub enum EmployeeRole {
    Vendedor,
    Gerente,
    Tecnico,
    Admin,
}

impl EmployeeRole {
    /// Reembolso em dinheiro exige gerente ou administrador.
    pub fn can_authorize_refund(self) -> bool {
        matches!(self, EmployeeRole::Gerente | EmployeeRole::Admin)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub full_name: String,

    #[serde(skip_serializing)]
    pub pin_hash: String,

    pub role: EmployeeRole,
    pub is_active: bool,

    // Taxas em percentual (ex: 3.00 = 3%)
    pub comm_rate_guaranteed: Decimal,
    pub comm_rate_store_credit: Decimal,
    pub comm_rate_store_total: Decimal,
    pub comm_rate_received: Decimal,
    pub comm_rate_profit: Decimal,

    pub created_at: DateTime<Utc>,
}

/// Funcionário já autenticado por PIN. É o "autorizador" das operações sensíveis.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeIdentity {
    pub employee_id: Uuid,
    pub full_name: String,
    pub role: EmployeeRole,
}

impl From<&Employee> for EmployeeIdentity {
    fn from(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id,
            full_name: employee.full_name.clone(),
            role: employee.role,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinPayload {
    pub employee_id: Uuid,
    #[validate(length(min = 4, max = 8, message = "O PIN deve ter entre 4 e 8 dígitos."))]
    pub pin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_managers_and_admins_authorize_refunds() {
        assert!(EmployeeRole::Gerente.can_authorize_refund());
        assert!(EmployeeRole::Admin.can_authorize_refund());
        assert!(!EmployeeRole::Vendedor.can_authorize_refund());
        assert!(!EmployeeRole::Tecnico.can_authorize_refund());
    }
}
