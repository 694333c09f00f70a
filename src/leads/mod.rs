use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod export;
pub mod handlers;
pub mod import;
pub mod repo;
pub mod temperature;

pub fn router() -> Router<AppState> {
    handlers::lead_routes()
}
