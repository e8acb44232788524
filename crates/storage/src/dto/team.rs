use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::PaginationParams;
use crate::models::{Team, TeamRole, TeamStatus};

/// Request payload for forming a new team.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    pub hackathon_id: Uuid,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Team name must be between 1 and 100 characters"
    ))]
    pub team_name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 2, max = 10, message = "Team size must be between 2 and 10"))]
    pub max_size: i32,

    #[serde(default)]
    pub skills_needed: Vec<String>,

    #[validate(email(message = "Contact email must be a valid email address"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub discord_server: Option<String>,

    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

/// Partial update of team metadata; absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTeamRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Team name must be between 1 and 100 characters"
    ))]
    pub team_name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub skills_needed: Option<Vec<String>>,

    #[validate(email(message = "Contact email must be a valid email address"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub discord_server: Option<String>,

    pub is_public: Option<bool>,
    pub is_active: Option<bool>,
}

/// Basic team information, safe for any viewer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub team_id: Uuid,
    pub team_name: String,
    pub description: Option<String>,
    pub max_size: i32,
    pub current_size: i32,
    pub available_slots: i32,
    pub skills_needed: Vec<String>,
    pub skills_filled: Vec<String>,
    pub status: TeamStatus,
    pub is_public: bool,
    pub hackathon_id: Uuid,
    pub leader_id: Uuid,
    pub created_at: NaiveDateTime,
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        Self {
            available_slots: team.available_slots(),
            status: team.status(),
            team_id: team.team_id,
            team_name: team.team_name,
            description: team.description,
            max_size: team.max_size,
            current_size: team.current_size,
            skills_needed: team.skills_needed,
            skills_filled: team.skills_filled,
            is_public: team.is_public,
            hackathon_id: team.hackathon_id,
            leader_id: team.leader_id,
            created_at: team.created_at,
        }
    }
}

/// One active member, enriched with directory data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamMemberInfo {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: TeamRole,
    pub assigned_role: Option<String>,
    pub skills: Vec<String>,
    pub joined_at: NaiveDateTime,
}

/// Contact channels, visible to active members and the leader only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamContactInfo {
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub discord_server: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HackathonSummary {
    pub hackathon_id: Uuid,
    pub title: String,
    pub organizer: Option<String>,
    pub deadline: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamDetailsResponse {
    #[serde(flatten)]
    pub team: TeamResponse,
    pub members: Vec<TeamMemberInfo>,
    pub hackathon: HackathonSummary,
    pub is_member: bool,
    pub is_leader: bool,
    pub has_pending_request: bool,
    pub can_join: bool,
    /// Present only when the viewer is a member or the leader.
    pub contact: Option<TeamContactInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TeamSortBy {
    #[default]
    MatchPercentage,
    CreatedAt,
    TeamName,
    AvailableSlots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatusFilter {
    #[default]
    All,
    Open,
    Full,
    Closed,
}

/// Query parameters for the ranked team search.
///
/// `page`/`page_size` are plain fields rather than a flattened
/// [`PaginationParams`]: query strings are deserialized by serde_urlencoded,
/// which cannot decode numbers inside a `#[serde(flatten)]` struct.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TeamSearchQuery {
    pub hackathon_id: Uuid,

    /// Candidate skills as a comma-separated list, e.g. `Rust,React`.
    pub skills: Option<String>,

    /// Free-text match against team name and description.
    pub search: Option<String>,

    #[serde(default)]
    pub status: TeamStatusFilter,

    #[serde(default)]
    pub sort_by: TeamSortBy,

    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl TeamSearchQuery {
    pub fn candidate_skills(&self) -> Vec<String> {
        self.skills
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.pagination().validate()
    }
}

/// Search result entry, ranked by skill match.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamListItem {
    pub team_id: Uuid,
    pub team_name: String,
    pub description: Option<String>,
    pub max_size: i32,
    pub current_size: i32,
    pub available_slots: i32,
    pub leader_name: String,
    pub skills_needed: Vec<String>,
    pub status: TeamStatus,
    pub is_public: bool,
    pub matching_skills: Vec<String>,
    pub match_percentage: i32,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_parses_explicit_pagination() {
        let query: TeamSearchQuery = serde_urlencoded::from_str(
            "hackathon_id=7a4c1f2e-9b3d-4e5f-8a6b-0c1d2e3f4a5b&page=2&page_size=10",
        )
        .unwrap();

        assert_eq!(query.page, 2);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.pagination().offset(), 10);
    }

    #[test]
    fn test_search_query_defaults() {
        let query: TeamSearchQuery = serde_urlencoded::from_str(
            "hackathon_id=7a4c1f2e-9b3d-4e5f-8a6b-0c1d2e3f4a5b&skills=Rust,%20React&sort_by=created_at",
        )
        .unwrap();

        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 20);
        assert_eq!(query.sort_by, TeamSortBy::CreatedAt);
        assert_eq!(query.candidate_skills(), vec!["Rust", "React"]);
    }
}
