// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::auth::User,
};

async fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)?;

    app_state.auth_service.validate_token(bearer.token()).await
}

// Só exige um JWT válido. Usado nas rotas que não dependem de loja.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&app_state, request.headers())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// JWT + rede/loja nos cabeçalhos + vínculo ativo do usuário com aquela loja.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&app_state, request.headers())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let ctx = TenantContext::from_headers(request.headers()).map_err(|e| e.to_api_error(&locale))?;

    let allowed = app_state
        .tenant_repo
        .check_user_store_access(user.id, ctx.tenant_id, ctx.store_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    if !allowed {
        tracing::warn!(
            "Usuário {} sem acesso à loja {} (tenant {})",
            user.id,
            ctx.store_id,
            ctx.tenant_id
        );
        return Err(AppError::Authorization("Acesso negado a esta loja.".into())
            .to_api_error(&locale));
    }

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&Locale::default()))
    }
}
