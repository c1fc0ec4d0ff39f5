use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{config::AuthMode, error::AppError, state::AppState};

use super::jwt::decode_jwt;

/// Organization scope injected into request extensions after successful auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgContext {
    pub organization_id: String,
}

/// Resolve the caller's organization or reject with 401 before any handler runs.
pub async fn require_org(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match &state.config.auth_mode {
        AuthMode::None => state
            .config
            .default_organization
            .clone()
            .map(|organization_id| OrgContext { organization_id }),
        AuthMode::Jwt(secret) => bearer_token(&request).and_then(|token| {
            match decode_jwt(token, secret) {
                Ok(claims) if !claims.org.trim().is_empty() => Some(OrgContext {
                    organization_id: claims.org,
                }),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected bearer token");
                    None
                }
            }
        }),
    };

    match context {
        Some(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        None => AppError::Unauthorized.into_response(),
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
