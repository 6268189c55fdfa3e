use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod cookie;
pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod roles;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
