use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    create_competition, deactivate_competition, get_competition, list_competitions_for_voting,
    list_my_competitions, toggle_competition_status,
};
use crate::features::votes::handlers::{has_voted, list_competition_votes, submit_vote};
use crate::middleware::auth::{ApiKeys, optional_auth, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_competition))
        .route("/voting", get(list_competitions_for_voting))
        .route("/mine", get(list_my_competitions))
        .route("/:id/toggle", post(toggle_competition_status))
        .route("/:id/deactivate", post(deactivate_competition))
        .route("/:id/votes", post(submit_vote))
        .route("/:id/has-voted", get(has_voted))
        .route_layer(middleware::from_fn_with_state(api_keys.clone(), require_auth));

    let public = Router::new()
        .route("/:id", get(get_competition))
        .route("/:id/votes", get(list_competition_votes))
        .route_layer(middleware::from_fn_with_state(api_keys, optional_auth));

    public.merge(protected)
}
