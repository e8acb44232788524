use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Position a user holds within a team. Membership rows themselves are
/// deactivated rather than deleted, so at most one row per (team, user) pair
/// is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "team_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TeamRole {
    Leader,
    Member,
}
