pub mod handlers;
pub mod model;
pub mod provider;
pub mod query;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::catalog_routes()
}
