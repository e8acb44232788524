use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{JoinRequest, JoinRequestStatus};

/// Request payload for asking to join a team.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendJoinRequestRequest {
    pub team_id: Uuid,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Requested role must be between 1 and 100 characters"
    ))]
    pub requested_role: String,

    #[serde(default)]
    pub user_skills: Vec<String>,

    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JoinRequestResponse {
    pub join_request_id: Uuid,
    pub team_id: Uuid,
    pub requester_id: Uuid,
    pub requested_role: String,
    pub status: JoinRequestStatus,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl From<JoinRequest> for JoinRequestResponse {
    fn from(request: JoinRequest) -> Self {
        Self {
            join_request_id: request.join_request_id,
            team_id: request.team_id,
            requester_id: request.requester_id,
            requested_role: request.requested_role,
            status: request.status,
            created_at: request.created_at,
            expires_at: request.expires_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinRequestAction {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProcessJoinRequestRequest {
    pub action: JoinRequestAction,

    #[validate(length(max = 500, message = "Response message must be at most 500 characters"))]
    pub response_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProcessJoinRequestResponse {
    pub join_request_id: Uuid,
    pub status: JoinRequestStatus,
    pub requester_name: String,
    pub team_name: String,
    pub processed_at: Option<NaiveDateTime>,
}

/// One of the caller's own requests, with team context.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyJoinRequestItem {
    pub join_request_id: Uuid,
    pub team_id: Uuid,
    pub team_name: String,
    pub hackathon_title: String,
    pub requested_role: String,
    pub user_skills: Vec<String>,
    pub message: String,
    pub status: JoinRequestStatus,
    pub response_message: Option<String>,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
    pub can_cancel: bool,
    pub is_expired: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MyJoinRequestsResponse {
    pub active: Vec<MyJoinRequestItem>,
    pub past: Vec<MyJoinRequestItem>,
    pub has_active_request: bool,
}

/// A request against the leader's team, with requester context and skill
/// match against the team's current needed list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamJoinRequestItem {
    pub join_request_id: Uuid,
    pub requester_id: Uuid,
    pub requester_name: String,
    pub requested_role: String,
    pub user_skills: Vec<String>,
    pub message: String,
    pub matching_skills: Vec<String>,
    pub match_percentage: i32,
    pub status: JoinRequestStatus,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
    pub is_expired: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamJoinRequestsResponse {
    pub pending: Vec<TeamJoinRequestItem>,
    pub processed: Vec<TeamJoinRequestItem>,
    pub pending_count: usize,
    pub processed_count: usize,
    pub team_name: String,
    pub available_slots: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JoinRequestStats {
    pub total_sent: i64,
    pub total_accepted: i64,
    pub total_rejected: i64,
    pub total_expired: i64,
    pub current_pending: i64,
    pub acceptance_rate: f64,
    pub first_request_at: Option<NaiveDateTime>,
    pub last_request_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpireSweepResponse {
    pub expired: u64,
}
