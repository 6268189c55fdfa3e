//! Request gates for protected routes.
//!
//! `authenticate` resolves the session cookie into a [`CurrentUser`] stored in
//! request extensions; `require_capability` checks that user's role. Layer the
//! authorization gate inside the authentication gate.

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    auth::{cookie::extract_session_token, jwt::JwtKeys, repo_types::User, roles::Capability},
    error::{ApiError, ApiResult},
    state::AppState,
};

/// User resolved by the authentication gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = extract_session_token(req.headers(), &state.config.cookie.name)
        .ok_or_else(|| {
            warn!("session cookie missing");
            ApiError::bad_request("token not found")
        })?;

    let claims = JwtKeys::from_ref(&state).verify(&token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        ApiError::unauthorized("invalid or expired token")
    })?;

    let user = state.users.find_by_id(claims.sub).await?.ok_or_else(|| {
        warn!(user_id = %claims.sub, "token references unknown user");
        ApiError::bad_request("user not found")
    })?;

    debug!(user_id = %user.id, role = %user.role, "request authenticated");
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

pub async fn require_capability(
    capability: Capability,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let allowed = req
        .extensions()
        .get::<CurrentUser>()
        .is_some_and(|CurrentUser(user)| user.role.grants(capability));
    if !allowed {
        warn!(?capability, "capability denied");
        return Err(ApiError::bad_request("unauthorized"));
    }
    Ok(next.run(req).await)
}
