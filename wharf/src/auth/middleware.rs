use crate::{AppState, errors::Error};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, trace};

/// Message returned when the write-route gate refuses a request.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or missing API token.";

/// Header accepted as an alternative to `Authorization: Bearer`.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Pull the presented token out of `Authorization: Bearer <token>` or `X-Api-Key: <token>`.
pub(crate) fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    bearer
        .or_else(|| headers.get(API_KEY_HEADER).and_then(|value| value.to_str().ok()).map(str::trim))
        .filter(|token| !token.is_empty())
}

/// Middleware guarding write routes. With no configured tokens the gate is open.
pub async fn require_api_token(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, Error> {
    let tokens = &state.config.auth.api_tokens;

    if tokens.is_empty() {
        trace!("No API tokens configured, letting request through");
        return Ok(next.run(request).await);
    }

    match presented_token(request.headers()) {
        Some(token) if tokens.iter().any(|t| t == token) => Ok(next.run(request).await),
        presented => {
            debug!(
                path = %request.uri().path(),
                token_present = presented.is_some(),
                "Rejected request at API token gate"
            );
            Err(Error::Unauthenticated {
                message: Some(INVALID_TOKEN_MESSAGE.to_string()),
            })
        }
    }
}
