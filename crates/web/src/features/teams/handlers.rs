use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::{
    common::PaginatedResponse,
    team::{
        CreateTeamRequest, TeamDetailsResponse, TeamListItem, TeamResponse, TeamSearchQuery,
        UpdateTeamRequest,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::ActorId;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created successfully", body = TeamResponse),
        (status = 400, description = "Invalid request body"),
        (status = 404, description = "Hackathon not found or not approved"),
        (status = 409, description = "Caller already has a team for this hackathon")
    ),
    security(("user_identity" = [])),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
    Json(req): Json<CreateTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let team = services::create_team(state.db.pool(), user_id, &req).await?;

    Ok((StatusCode::CREATED, Json(team)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams",
    params(TeamSearchQuery),
    responses(
        (status = 200, description = "Teams retrieved successfully", body = PaginatedResponse<TeamListItem>),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Hackathon not found or not approved")
    ),
    security(("user_identity" = [])),
    tag = "teams"
)]
pub async fn search_teams(
    State(state): State<AppState>,
    Query(query): Query<TeamSearchQuery>,
) -> Result<Response, WebError> {
    query.validate().map_err(WebError::BadRequest)?;

    let page = services::search_teams(state.db.pool(), &query).await?;

    Ok(Json(page).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/my",
    responses(
        (status = 200, description = "Caller's teams retrieved successfully", body = Vec<TeamListItem>)
    ),
    security(("user_identity" = [])),
    tag = "teams"
)]
pub async fn get_my_teams(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
) -> Result<Response, WebError> {
    let teams = services::get_user_teams(state.db.pool(), user_id).await?;

    Ok(Json(teams).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}",
    params(("team_id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Team details retrieved successfully", body = TeamDetailsResponse),
        (status = 403, description = "Team is private"),
        (status = 404, description = "Team not found")
    ),
    security(("user_identity" = [])),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let details = services::get_team_details(state.db.pool(), team_id, user_id).await?;

    Ok(Json(details).into_response())
}

#[utoipa::path(
    put,
    path = "/api/teams/{team_id}",
    params(("team_id" = Uuid, Path, description = "Team identifier")),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated successfully", body = TeamResponse),
        (status = 400, description = "Invalid request body"),
        (status = 403, description = "Caller is not the team leader"),
        (status = 404, description = "Team not found")
    ),
    security(("user_identity" = [])),
    tag = "teams"
)]
pub async fn update_team(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
    Path(team_id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let team = services::update_team(state.db.pool(), team_id, user_id, &req).await?;

    Ok(Json(team).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/teams/{team_id}/members/{user_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team identifier"),
        ("user_id" = Uuid, Path, description = "Member to remove")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Caller is not the team leader"),
        (status = 404, description = "Team not found"),
        (status = 409, description = "User is not a removable member")
    ),
    security(("user_identity" = [])),
    tag = "teams"
)]
pub async fn remove_member(
    State(state): State<AppState>,
    ActorId(leader_id): ActorId,
    Path((team_id, member_user_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    services::remove_member(state.db.pool(), team_id, leader_id, member_user_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/leave",
    params(("team_id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 204, description = "Left the team"),
        (status = 404, description = "Team not found"),
        (status = 409, description = "Caller is the leader or not a member")
    ),
    security(("user_identity" = [])),
    tag = "teams"
)]
pub async fn leave_team(
    State(state): State<AppState>,
    ActorId(user_id): ActorId,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::leave_team(state.db.pool(), team_id, user_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
