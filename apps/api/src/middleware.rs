use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use phishwise_core::AppError;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::ApiResult;
use crate::state::AppState;

/// Rejects admin API calls without the configured bearer token.
///
/// When no token is configured the API is open.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(expected) = state.admin_api_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    if bearer_token_matches(presented, expected) {
        return Ok(next.run(request).await);
    }

    warn!(path = %request.uri().path(), "admin API call rejected");
    Err(AppError::Unauthorized("a valid admin bearer token is required".to_owned()).into())
}

fn bearer_token_matches(presented: Option<&str>, expected: &str) -> bool {
    presented
        .is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())))
}
