//! Bearer token check applied to every route.

use super::AppState;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Returns the token from `Authorization: Bearer <token>`, if present.
fn extract_bearer_token<B>(req: &axum::http::Request<B>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Rejects requests without the server token with 401.
///
/// Preflight `OPTIONS` requests pass through unauthenticated.
pub async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    if state.validate_token(extract_bearer_token(&req)) {
        next.run(req).await
    } else {
        tracing::debug!(method = %req.method(), uri = %req.uri(), "rejected unauthenticated request");
        (StatusCode::UNAUTHORIZED, "unauthenticated request").into_response()
    }
}
