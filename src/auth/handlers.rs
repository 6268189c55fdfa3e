use anyhow::Context;
use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        cookie::{clear_session_cookie, session_cookie},
        dto::{normalize_email, LoginRequest, MessageResponse, SignUpRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::NewUser,
        roles::Role,
    },
    db::RepoError,
    error::{ApiError, ApiResult},
    extract::AppJson,
    state::AppState,
};

type SessionResponse = (StatusCode, HeaderMap, Json<MessageResponse>);

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Mints a token for `user_id` and attaches it as the session cookie.
fn start_session(
    state: &AppState,
    user_id: Uuid,
    status: StatusCode,
    message: &str,
) -> ApiResult<SessionResponse> {
    let token = JwtKeys::from_ref(state).sign(user_id)?;
    let cookie = session_cookie(&state.config, &token).context("build session cookie")?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((status, headers, Json(MessageResponse::new(message))))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignUpRequest>,
) -> ApiResult<SessionResponse> {
    let email = normalize_email(&payload.email);
    let name = payload.name.trim().to_string();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        warn!("signup with missing fields");
        return Err(ApiError::bad_request("all fields are required"));
    }

    if payload.password != payload.confirm_password {
        warn!(email = %email, "signup password confirmation mismatch");
        return Err(ApiError::bad_request("password does not match"));
    }

    let role = match payload.role.as_deref().map(str::trim) {
        None | Some("") => Role::default(),
        Some(raw) => raw.parse::<Role>().map_err(|_| {
            warn!(role = %raw, "signup with unknown role");
            ApiError::bad_request("invalid role")
        })?,
    };

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::bad_request("user already exists"));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = match state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
            role,
        })
        .await
    {
        Ok(u) => u,
        Err(RepoError::Conflict) => {
            warn!("email registered concurrently");
            return Err(ApiError::bad_request("user already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    start_session(&state, user.id, StatusCode::CREATED, "user successfully registered")
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<SessionResponse> {
    let email = normalize_email(&payload.email);

    if email.is_empty() || payload.password.is_empty() {
        warn!("login with missing fields");
        return Err(ApiError::bad_request("all fields are required"));
    }

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::bad_request("user does not exist"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::bad_request("password does not match"));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    start_session(&state, user.id, StatusCode::CREATED, "user logged in successfully")
}

/// Expires the cookie. The token itself stays valid until `exp`.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> ApiResult<(HeaderMap, Json<MessageResponse>)> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        clear_session_cookie(&state.config).context("build clearing cookie")?,
    );
    info!("user logged out");
    Ok((headers, Json(MessageResponse::new("user logged out successfully"))))
}
