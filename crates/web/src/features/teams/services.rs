use sqlx::PgPool;
use storage::{
    dto::{
        common::PaginatedResponse,
        team::{
            CreateTeamRequest, TeamDetailsResponse, TeamListItem, TeamResponse, TeamSearchQuery,
            UpdateTeamRequest,
        },
    },
    error::Result,
    services::teams,
};
use uuid::Uuid;

pub async fn create_team(
    pool: &PgPool,
    leader_id: Uuid,
    req: &CreateTeamRequest,
) -> Result<TeamResponse> {
    teams::create_team(pool, leader_id, req).await
}

pub async fn get_team_details(
    pool: &PgPool,
    team_id: Uuid,
    viewer_id: Uuid,
) -> Result<TeamDetailsResponse> {
    teams::get_team_details(pool, team_id, viewer_id).await
}

pub async fn update_team(
    pool: &PgPool,
    team_id: Uuid,
    actor_id: Uuid,
    req: &UpdateTeamRequest,
) -> Result<TeamResponse> {
    teams::update_team(pool, team_id, actor_id, req).await
}

/// Ranked team search with filtering and pagination
pub async fn search_teams(
    pool: &PgPool,
    query: &TeamSearchQuery,
) -> Result<PaginatedResponse<TeamListItem>> {
    teams::search_teams(pool, query).await
}

pub async fn get_user_teams(pool: &PgPool, user_id: Uuid) -> Result<Vec<TeamListItem>> {
    teams::get_user_teams(pool, user_id).await
}

pub async fn remove_member(
    pool: &PgPool,
    team_id: Uuid,
    leader_id: Uuid,
    member_user_id: Uuid,
) -> Result<()> {
    teams::remove_member(pool, team_id, leader_id, member_user_id).await
}

pub async fn leave_team(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<()> {
    teams::leave_team(pool, team_id, user_id).await
}
