use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use careline_application::DecodedToken;
use careline_core::{AppError, AppResult, CompanyId, Credentials};

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the bearer token into credentials and attaches them to the
/// request. Any validation fault maps to 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let validation = state
        .authorization_service
        .validate(&DecodedToken {
            subject: Some(token.to_owned()),
        })
        .await;

    let Some(credentials) = validation.credentials else {
        return Err(AppError::Unauthorized("invalid credentials".to_owned()).into());
    };

    request.extensions_mut().insert(credentials);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Ensures the caller holds a scope token.
pub fn require_scope(credentials: &Credentials, scope: &str) -> AppResult<()> {
    if credentials.has_scope(scope) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("missing scope '{scope}'")))
    }
}

/// Returns the caller's company scope, required by contract operations.
pub fn requester_company(credentials: &Credentials) -> AppResult<CompanyId> {
    credentials
        .company_id()
        .ok_or_else(|| AppError::Forbidden("request has no company context".to_owned()))
}
