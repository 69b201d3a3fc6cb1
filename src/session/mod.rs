use crate::state::AppState;
use axum::Router;

pub mod context;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod registry;
pub mod store;
pub mod user;

pub fn router() -> Router<AppState> {
    handlers::session_routes()
}
