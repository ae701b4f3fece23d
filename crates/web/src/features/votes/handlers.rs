use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{HasVotedResponse, SubmitVoteRequest},
    models::{CompetitionId, Vote, VoteId},
};

use crate::{error::ApiResult, middleware::auth::Caller, state::AppState};

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/votes",
    params(
        ("id" = i64, Path, description = "Competition ID")
    ),
    request_body = SubmitVoteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Vote recorded", body = Vote),
        (status = 400, description = "Rating outside 1..=5 or comment too long"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Organizers cannot vote on their own competition"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Caller has already voted"),
        (status = 422, description = "Competition is inactive")
    ),
    tag = "votes"
)]
pub async fn submit_vote(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Path(id): Path<CompetitionId>,
    payload: Result<Json<SubmitVoteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    let vote = state.registry.submit_vote(&caller, id, &req).await?;

    Ok((StatusCode::CREATED, Json(vote)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}/votes",
    params(
        ("id" = i64, Path, description = "Competition ID")
    ),
    responses(
        (status = 200, description = "Votes in submission order", body = Vec<Vote>),
        (status = 403, description = "Votes are visible to the organizer and registry owner only"),
        (status = 404, description = "Competition not found")
    ),
    tag = "votes"
)]
pub async fn list_competition_votes(
    State(state): State<AppState>,
    caller: Option<Extension<Caller>>,
    Path(id): Path<CompetitionId>,
) -> ApiResult<Json<Vec<Vote>>> {
    let caller = caller.map(|Extension(Caller(identity))| identity);
    let votes = state.registry.competition_votes(caller.as_ref(), id).await?;

    Ok(Json(votes))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}/has-voted",
    params(
        ("id" = i64, Path, description = "Competition ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Whether the caller has voted", body = HasVotedResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "votes"
)]
pub async fn has_voted(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Path(id): Path<CompetitionId>,
) -> ApiResult<Json<HasVotedResponse>> {
    let has_voted = state.registry.has_voted(&caller, id).await?;

    Ok(Json(HasVotedResponse {
        competition_id: id,
        has_voted,
    }))
}

#[utoipa::path(
    get,
    path = "/api/votes/{id}",
    params(
        ("id" = i64, Path, description = "Vote ID")
    ),
    responses(
        (status = 200, description = "Vote found", body = Vote),
        (status = 403, description = "Votes are visible to the organizer and registry owner only"),
        (status = 404, description = "Vote not found")
    ),
    tag = "votes"
)]
pub async fn get_vote(
    State(state): State<AppState>,
    caller: Option<Extension<Caller>>,
    Path(id): Path<VoteId>,
) -> ApiResult<Json<Vote>> {
    let caller = caller.map(|Extension(Caller(identity))| identity);
    let vote = state.registry.vote(caller.as_ref(), id).await?;

    Ok(Json(vote))
}
