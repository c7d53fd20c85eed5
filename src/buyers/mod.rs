mod dto;
pub mod handlers;
pub mod model;
pub mod services;
pub mod validator;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::buyer_routes())
}
