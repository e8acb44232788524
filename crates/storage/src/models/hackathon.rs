use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Hackathon directory entry. Listing, search and approval workflows live
/// elsewhere; team formation only needs the approved lookup and the team
/// counter.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Hackathon {
    pub hackathon_id: Uuid,
    pub title: String,
    pub organizer: Option<String>,
    pub status: String,
    pub deadline: Option<NaiveDateTime>,
    pub team_count: i32,
    pub created_at: NaiveDateTime,
}
