use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use crate::config::AppConfig;

/// `HttpOnly` cookie carrying the session token.
pub fn session_cookie(config: &AppConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let name = &config.cookie.name;
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie =
        format!("{name}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={ttl_seconds}");
    if config.cookie.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Expires the session cookie on the client. Nothing is revoked server-side.
pub fn clear_session_cookie(config: &AppConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let name = &config.cookie.name;
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if config.cookie.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn extract_session_token(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, val)| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
