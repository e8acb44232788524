use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::join_request::{
    ExpireSweepResponse, JoinRequestResponse, JoinRequestStats, MyJoinRequestsResponse,
    ProcessJoinRequestRequest, ProcessJoinRequestResponse, SendJoinRequestRequest,
    TeamJoinRequestsResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::ActorId;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/join-requests",
    request_body = SendJoinRequestRequest,
    responses(
        (status = 201, description = "Join request sent", body = JoinRequestResponse),
        (status = 400, description = "Invalid request body"),
        (status = 404, description = "Team or user not found"),
        (status = 409, description = "Caller cannot request to join this team")
    ),
    security(("user_identity" = [])),
    tag = "join-requests"
)]
pub async fn send_join_request(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
    Json(req): Json<SendJoinRequestRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let request = services::send_join_request(&state, user_id, &req).await?;

    Ok((StatusCode::CREATED, Json(request)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/join-requests/{join_request_id}/process",
    params(("join_request_id" = Uuid, Path, description = "Join request identifier")),
    request_body = ProcessJoinRequestRequest,
    responses(
        (status = 200, description = "Join request processed", body = ProcessJoinRequestResponse),
        (status = 403, description = "Caller is not the team leader"),
        (status = 404, description = "Join request not found"),
        (status = 409, description = "Request already processed or team is full"),
        (status = 410, description = "Request has expired")
    ),
    security(("user_identity" = [])),
    tag = "join-requests"
)]
pub async fn process_join_request(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
    Path(join_request_id): Path<Uuid>,
    Json(req): Json<ProcessJoinRequestRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let result = services::process_join_request(&state, join_request_id, user_id, &req).await?;

    Ok(Json(result).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/join-requests/{join_request_id}",
    params(("join_request_id" = Uuid, Path, description = "Join request identifier")),
    responses(
        (status = 204, description = "Join request cancelled"),
        (status = 403, description = "Caller does not own this request"),
        (status = 404, description = "Join request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(("user_identity" = [])),
    tag = "join-requests"
)]
pub async fn cancel_join_request(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
    Path(join_request_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::cancel_join_request(&state, join_request_id, user_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/join-requests/my",
    responses(
        (status = 200, description = "Caller's join requests", body = MyJoinRequestsResponse)
    ),
    security(("user_identity" = [])),
    tag = "join-requests"
)]
pub async fn get_my_join_requests(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
) -> Result<Response, WebError> {
    let response = services::get_my_join_requests(&state, user_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/join-requests/team/{team_id}",
    params(("team_id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Join requests against the team", body = TeamJoinRequestsResponse),
        (status = 403, description = "Caller is not the team leader"),
        (status = 404, description = "Team not found")
    ),
    security(("user_identity" = [])),
    tag = "join-requests"
)]
pub async fn get_team_join_requests(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::get_team_join_requests(&state, team_id, user_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/join-requests/stats",
    responses(
        (status = 200, description = "Caller's join request statistics", body = JoinRequestStats)
    ),
    security(("user_identity" = [])),
    tag = "join-requests"
)]
pub async fn get_join_request_stats(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
) -> Result<Response, WebError> {
    let stats = services::get_join_request_stats(&state, user_id).await?;

    Ok(Json(stats).into_response())
}

#[utoipa::path(
    post,
    path = "/api/join-requests/expire-sweep",
    responses(
        (status = 200, description = "Overdue requests rejected", body = ExpireSweepResponse)
    ),
    security(("user_identity" = [])),
    tag = "join-requests"
)]
pub async fn expire_sweep(State(state): State<AppState>) -> Result<Response, WebError> {
    let expired = services::expire_old_requests(&state).await?;

    Ok(Json(ExpireSweepResponse { expired }).into_response())
}
