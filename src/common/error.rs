// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::middleware::i18n::Locale;

/// Códigos SQLSTATE que indicam disputa de escrita (falha de serialização / deadlock).
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// As variantes seguem a taxonomia do núcleo: validação, não encontrado,
// autorização, conflito e dependência.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Erro de validação")]
    ValidationFields(#[from] validator::ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Dependency(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("PIN inválido")]
    InvalidPin,

    // Variante para erros de banco de dados que não couberam em outra categoria.
    // A conversão é manual (ver `From<sqlx::Error>`) para classificar o erro.
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = e {
            return AppError::NotFound("Registro não encontrado.".into());
        }
        if let Some(db_err) = e.as_database_error() {
            let code = db_err.code();
            if matches!(code.as_deref(), Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)) {
                return AppError::Conflict(
                    "Outra operação alterou o mesmo registro. Tente novamente.".into(),
                );
            }
        }
        AppError::DatabaseError(e)
    }
}

/// A resposta de erro que sai pela API. Segue o contrato `{ success, message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "message": self.error,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::ValidationFields(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Dependency(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::InvalidPin => {
                StatusCode::UNAUTHORIZED
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensagem pronta para o usuário final. Mensagens de regra de negócio
    /// já nascem em português nos serviços; as fixas são traduzidas aqui.
    pub fn user_message(&self, locale: &Locale) -> String {
        let english = locale.is_english();
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Authorization(msg)
            | AppError::Conflict(msg)
            | AppError::Dependency(msg) => msg.clone(),
            AppError::ValidationFields(_) if english => "One or more fields are invalid.".into(),
            AppError::ValidationFields(_) => "Um ou mais campos são inválidos.".into(),
            AppError::InvalidCredentials if english => "Invalid e-mail or password.".into(),
            AppError::InvalidCredentials => "E-mail ou senha inválidos.".into(),
            AppError::InvalidToken if english => "Missing or invalid authentication token.".into(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".into(),
            AppError::InvalidPin if english => "Invalid employee PIN.".into(),
            AppError::InvalidPin => "PIN do funcionário inválido.".into(),
            _ if english => "An unexpected error occurred.".into(),
            _ => "Ocorreu um erro inesperado.".into(),
        }
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        // Retornar todos os detalhes da validação, campo a campo.
        let details = match self {
            AppError::ValidationFields(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            _ => None,
        };

        ApiError {
            status,
            error: self.user_message(locale),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
