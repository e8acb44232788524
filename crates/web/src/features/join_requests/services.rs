use storage::{
    dto::join_request::{
        JoinRequestResponse, JoinRequestStats, MyJoinRequestsResponse, ProcessJoinRequestRequest,
        ProcessJoinRequestResponse, SendJoinRequestRequest, TeamJoinRequestsResponse,
    },
    error::Result,
    services::join_requests,
};
use uuid::Uuid;

use crate::state::AppState;

pub async fn send_join_request(
    state: &AppState,
    requester_id: Uuid,
    req: &SendJoinRequestRequest,
) -> Result<JoinRequestResponse> {
    join_requests::send_join_request(
        state.db.pool(),
        requester_id,
        req,
        state.notifier.as_ref(),
    )
    .await
}

pub async fn process_join_request(
    state: &AppState,
    join_request_id: Uuid,
    leader_id: Uuid,
    req: &ProcessJoinRequestRequest,
) -> Result<ProcessJoinRequestResponse> {
    join_requests::process_join_request(
        state.db.pool(),
        join_request_id,
        leader_id,
        req,
        state.notifier.as_ref(),
        state.emailer.as_ref(),
    )
    .await
}

pub async fn cancel_join_request(
    state: &AppState,
    join_request_id: Uuid,
    requester_id: Uuid,
) -> Result<()> {
    join_requests::cancel_join_request(state.db.pool(), join_request_id, requester_id).await
}

pub async fn get_my_join_requests(
    state: &AppState,
    user_id: Uuid,
) -> Result<MyJoinRequestsResponse> {
    join_requests::get_my_join_requests(state.db.pool(), user_id).await
}

pub async fn get_team_join_requests(
    state: &AppState,
    team_id: Uuid,
    leader_id: Uuid,
) -> Result<TeamJoinRequestsResponse> {
    join_requests::get_team_join_requests(state.db.pool(), team_id, leader_id).await
}

pub async fn get_join_request_stats(state: &AppState, user_id: Uuid) -> Result<JoinRequestStats> {
    join_requests::get_join_request_stats(state.db.pool(), user_id).await
}

pub async fn expire_old_requests(state: &AppState) -> Result<u64> {
    join_requests::expire_old_requests(state.db.pool()).await
}
