use super::AppState;
use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use subtle::ConstantTimeEq;

/// Bearer tokens accepted by the `/api` routes. Empty means open access.
#[derive(Debug, Clone, Default)]
pub struct BearerAuth {
    tokens: Vec<String>,
}

impl BearerAuth {
    pub fn new(tokens: &[String]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Compare against every configured token in constant time.
    pub fn is_authorized(&self, authorization: Option<&str>) -> bool {
        if !self.is_enabled() {
            return true;
        }
        let Some(token) = authorization.and_then(|v| v.strip_prefix("Bearer ")) else {
            return false;
        };
        let token = token.trim().as_bytes();
        self.tokens
            .iter()
            .fold(false, |found, expected| {
                found | bool::from(expected.as_bytes().ct_eq(token))
            })
    }
}

pub(super) async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if state.auth.is_authorized(authorization) {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "rejected request with missing or invalid bearer token");
    let body = serde_json::json!({
        "error": "Unauthorized: missing or invalid bearer token"
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
