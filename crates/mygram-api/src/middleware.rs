use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// The caller, as proven by a verified access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

/// Extract and validate the bearer token from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::NotAuthorized)?;
    let claims = state.tokens.verify(&token)?;

    // The signature alone is not enough: the user must still exist.
    let user_id = claims.user_id.clone();
    let known = run_blocking(&state, move |s| Ok(s.db.get_user_by_id(&user_id)?.is_some())).await?;
    if !known {
        warn!("Rejected token for unknown user {}", claims.user_id);
        return Err(ApiError::InvalidToken);
    }

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        email: claims.email,
    });
    Ok(next.run(req).await)
}

/// `Authorization: bearer <token>`, scheme matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
