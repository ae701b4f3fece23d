use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::CreateCompetitionRequest,
    models::{Competition, CompetitionId},
};

use crate::{error::ApiResult, middleware::auth::Caller, state::AppState};

#[utoipa::path(
    post,
    path = "/api/competitions",
    request_body = CreateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Competition created successfully", body = Competition),
        (status = 400, description = "A required text field is blank or too long"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "competitions"
)]
pub async fn create_competition(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    payload: Result<Json<CreateCompetitionRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    let competition = state.registry.create_competition(&caller, &req).await?;

    Ok((StatusCode::CREATED, Json(competition)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/voting",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Active competitions the caller may still vote on, ascending by id", body = Vec<Competition>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "competitions"
)]
pub async fn list_competitions_for_voting(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
) -> ApiResult<Json<Vec<Competition>>> {
    let competitions = state.registry.competitions_for_voting(&caller).await?;

    Ok(Json(competitions))
}

#[utoipa::path(
    get,
    path = "/api/competitions/mine",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Competitions organized by the caller, in creation order", body = Vec<Competition>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "competitions"
)]
pub async fn list_my_competitions(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
) -> ApiResult<Json<Vec<Competition>>> {
    let competitions = state.registry.organized_competitions(&caller).await?;

    Ok(Json(competitions))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}",
    params(
        ("id" = i64, Path, description = "Competition ID")
    ),
    responses(
        (status = 200, description = "Competition found", body = Competition),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
) -> ApiResult<Json<Competition>> {
    let competition = state.registry.competition(id).await?;

    Ok(Json(competition))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/toggle",
    params(
        ("id" = i64, Path, description = "Competition ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Active flag flipped", body = Competition),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the organizer"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn toggle_competition_status(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Path(id): Path<CompetitionId>,
) -> ApiResult<Json<Competition>> {
    let competition = state
        .registry
        .toggle_competition_status(&caller, id)
        .await?;

    Ok(Json(competition))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/deactivate",
    params(
        ("id" = i64, Path, description = "Competition ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Competition forced inactive", body = Competition),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the registry owner"),
        (status = 404, description = "Competition not found")
    ),
    tag = "admin"
)]
pub async fn deactivate_competition(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Path(id): Path<CompetitionId>,
) -> ApiResult<Json<Competition>> {
    let competition = state.registry.deactivate_competition(&caller, id).await?;

    Ok(Json(competition))
}
