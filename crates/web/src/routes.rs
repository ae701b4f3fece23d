use std::time::Duration;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{competitions, events, stats, votes};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Assemble the full HTTP application.
pub fn router(state: AppState) -> Router {
    let api_keys = state.api_keys.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/competitions",
            competitions::routes::routes(api_keys.clone()),
        )
        .nest("/api/votes", votes::routes::routes(api_keys))
        .nest("/api/stats", stats::routes::routes())
        .nest("/api/events", events::routes::routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
