use axum::{Router, middleware, routing::get};

use super::handlers::get_vote;
use crate::middleware::auth::{ApiKeys, optional_auth};
use crate::state::AppState;

/// Vote lookups by vote id. Per-competition vote routes live with the
/// competition routes.
pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_vote))
        .route_layer(middleware::from_fn_with_state(api_keys, optional_auth))
}
