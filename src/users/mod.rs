use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod policy;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::admin_routes())
}
