use axum::{Json, extract::State};
use storage::models::Counts;

use crate::{error::ApiResult, state::AppState};

#[utoipa::path(
    get,
    path = "/api/stats/counts",
    responses(
        (status = 200, description = "Total competitions and votes", body = Counts)
    ),
    tag = "stats"
)]
pub async fn get_counts(State(state): State<AppState>) -> ApiResult<Json<Counts>> {
    let counts = state.registry.counts().await?;

    Ok(Json(counts))
}
