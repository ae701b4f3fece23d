use axum::{Router, routing::get};

use super::handlers::get_counts;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/counts", get(get_counts))
}
