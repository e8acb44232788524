use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::skill_match;

/// A hackathon team. Capacity and skill-slot mutations go through
/// [`Team::add_member`] / [`Team::remove_member`] so the
/// `current_size <= max_size` invariant holds on every persisted row;
/// callers must apply them to a row-locked snapshot (see the repository's
/// `lock_for_update`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub team_id: Uuid,
    pub team_name: String,
    pub description: Option<String>,
    pub max_size: i32,
    pub current_size: i32,
    pub skills_needed: Vec<String>,
    pub skills_filled: Vec<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub discord_server: Option<String>,
    pub is_public: bool,
    pub is_full: bool,
    pub is_active: bool,
    pub deleted: bool,
    pub hackathon_id: Uuid,
    pub leader_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TeamStatus {
    Open,
    Closed,
}

impl Team {
    pub fn available_slots(&self) -> i32 {
        self.max_size - self.current_size
    }

    pub fn status(&self) -> TeamStatus {
        if self.is_active && !self.is_full {
            TeamStatus::Open
        } else {
            TeamStatus::Closed
        }
    }

    pub fn is_accepting_members(&self) -> bool {
        self.is_active && !self.is_full
    }

    pub fn is_leader(&self, user_id: Uuid) -> bool {
        self.leader_id == user_id
    }

    /// Claims a slot for a new member with the given assigned role.
    ///
    /// The role moves from `skills_needed` to `skills_filled`; a role the team
    /// never listed as needed is still recorded as filled. Fails when the role
    /// is already filled or the team is at capacity.
    pub fn add_member(&mut self, assigned_role: &str) -> Result<()> {
        if self.skills_filled.iter().any(|s| s == assigned_role) {
            return Err(StorageError::Conflict(format!(
                "Team already has the role '{assigned_role}' filled"
            )));
        }
        if self.current_size >= self.max_size {
            return Err(StorageError::Conflict("Team is already full".to_string()));
        }

        self.skills_needed.retain(|s| s != assigned_role);
        self.skills_filled.push(assigned_role.to_string());
        self.current_size += 1;
        if self.current_size >= self.max_size {
            self.is_full = true;
        }

        Ok(())
    }

    /// Releases the slot held by a departing member.
    ///
    /// The vacated assigned role stays in `skills_filled` and is not returned
    /// to `skills_needed`; relisting the role is left to the leader via a
    /// team update (see DESIGN.md).
    pub fn remove_member(&mut self) {
        self.current_size -= 1;
        self.is_full = false;
    }

    pub fn matching_skills(&self, candidate_skills: &[String]) -> Vec<String> {
        skill_match::matching_skills(candidate_skills, &self.skills_needed)
    }

    pub fn match_percentage(&self, candidate_skills: &[String]) -> i32 {
        skill_match::match_percentage(candidate_skills, &self.skills_needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(max_size: i32, current_size: i32, skills_needed: &[&str]) -> Team {
        let now = chrono::Utc::now().naive_utc();
        Team {
            team_id: Uuid::new_v4(),
            team_name: "Rustaceans".to_string(),
            description: None,
            max_size,
            current_size,
            skills_needed: skills_needed.iter().map(|s| s.to_string()).collect(),
            skills_filled: vec![],
            contact_email: None,
            contact_phone: None,
            discord_server: None,
            is_public: true,
            is_full: current_size >= max_size,
            is_active: true,
            deleted: false,
            hackathon_id: Uuid::new_v4(),
            leader_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_member_moves_role_to_filled() {
        let mut t = team(2, 1, &["Backend"]);
        t.add_member("Backend").unwrap();

        assert_eq!(t.current_size, 2);
        assert!(t.is_full);
        assert!(t.skills_needed.is_empty());
        assert_eq!(t.skills_filled, vec!["Backend".to_string()]);
        assert_eq!(t.status(), TeamStatus::Closed);
    }

    #[test]
    fn test_add_member_role_not_in_needed_list() {
        let mut t = team(3, 1, &["Backend"]);
        t.add_member("Design").unwrap();

        assert_eq!(t.skills_needed, vec!["Backend".to_string()]);
        assert_eq!(t.skills_filled, vec!["Design".to_string()]);
        assert!(!t.is_full);
    }

    #[test]
    fn test_add_member_rejects_filled_role() {
        let mut t = team(4, 1, &["Backend", "Frontend"]);
        t.add_member("Backend").unwrap();

        let err = t.add_member("Backend").unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(t.current_size, 2);
    }

    #[test]
    fn test_add_member_rejects_full_team() {
        let mut t = team(2, 2, &["Backend"]);

        let err = t.add_member("Backend").unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(t.current_size, 2);
    }

    #[test]
    fn test_remove_member_does_not_restore_needed_role() {
        let mut t = team(2, 1, &["Backend"]);
        t.add_member("Backend").unwrap();
        t.remove_member();

        assert_eq!(t.current_size, 1);
        assert!(!t.is_full);
        assert_eq!(t.status(), TeamStatus::Open);
        // The vacated role is not advertised as needed again.
        assert!(t.skills_needed.is_empty());
        assert_eq!(t.skills_filled, vec!["Backend".to_string()]);
    }

    #[test]
    fn test_inactive_team_is_closed() {
        let mut t = team(3, 1, &[]);
        t.is_active = false;
        assert_eq!(t.status(), TeamStatus::Closed);
        assert!(!t.is_accepting_members());
    }

    #[test]
    fn test_available_slots() {
        let t = team(5, 2, &[]);
        assert_eq!(t.available_slots(), 3);
    }
}
