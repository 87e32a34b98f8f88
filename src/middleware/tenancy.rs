// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
    models::tenancy::Scope,
};

// Cabeçalhos HTTP que escolhem a rede e a loja
const TENANT_ID_HEADER: &str = "x-tenant-id";
const STORE_ID_HEADER: &str = "x-store-id";

/// Rede e loja em que a requisição opera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub store_id: Uuid,
}

impl TenantContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        Ok(Self {
            tenant_id: read_uuid_header(headers, TENANT_ID_HEADER, "X-Tenant-ID")?,
            store_id: read_uuid_header(headers, STORE_ID_HEADER, "X-Store-ID")?,
        })
    }

    pub fn scope(&self, user_id: Uuid) -> Scope {
        Scope::new(self.tenant_id, self.store_id, user_id)
    }
}

fn read_uuid_header(headers: &HeaderMap, key: &str, label: &str) -> Result<Uuid, AppError> {
    let value = headers
        .get(key)
        .ok_or_else(|| AppError::Validation(format!("O cabeçalho {} é obrigatório.", label)))?;

    let value_str = value.to_str().map_err(|_| {
        AppError::Validation(format!("Cabeçalho {} contém caracteres inválidos.", label))
    })?;

    Uuid::parse_str(value_str.trim())
        .map_err(|_| AppError::Validation(format!("Cabeçalho {} inválido (não é um UUID).", label)))
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    // ApiError já implementa IntoResponse
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // O tenant_guard já validou e deixou o contexto nas extensões
        if let Some(ctx) = parts.extensions.get::<TenantContext>() {
            return Ok(*ctx);
        }

        let locale = parts
            .headers
            .get(axum::http::header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        TenantContext::from_headers(&parts.headers).map_err(|e| e.to_api_error(&locale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_both_headers() {
        let tenant = Uuid::new_v4();
        let store = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_str(&tenant.to_string()).unwrap());
        headers.insert(STORE_ID_HEADER, HeaderValue::from_str(&store.to_string()).unwrap());

        let ctx = TenantContext::from_headers(&headers).unwrap();
        assert_eq!(ctx, TenantContext { tenant_id: tenant, store_id: store });
    }

    #[test]
    fn missing_store_is_a_validation_error() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap());

        let err = TenantContext::from_headers(&headers).unwrap_err();
        assert_eq!(err.to_string(), "O cabeçalho X-Store-ID é obrigatório.");
    }

    #[test]
    fn malformed_uuid_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_static("loja-1"));
        headers.insert(STORE_ID_HEADER, HeaderValue::from_static("loja-1"));

        assert!(matches!(TenantContext::from_headers(&headers), Err(AppError::Validation(_))));
    }
}
