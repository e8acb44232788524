use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

/// Join requests expire this many hours after creation.
pub const EXPIRY_HOURS: i64 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "join_request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A request from a user to join a team.
///
/// The lifecycle is PENDING -> ACCEPTED | REJECTED; expiry and cancellation
/// are both recorded as REJECTED. Terminal states are absorbing: every
/// transition method fails once the request has left PENDING.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JoinRequest {
    pub join_request_id: Uuid,
    pub team_id: Uuid,
    pub requester_id: Uuid,
    pub requested_role: String,
    pub user_skills: Vec<String>,
    pub message: String,
    pub status: JoinRequestStatus,
    pub response_message: Option<String>,
    pub expires_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
    pub processed_by: Option<Uuid>,
    pub deleted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl JoinRequest {
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        now > self.expires_at
    }

    pub fn can_cancel_at(&self, now: NaiveDateTime) -> bool {
        self.status == JoinRequestStatus::Pending && !self.is_expired_at(now)
    }

    fn ensure_actionable(&self, now: NaiveDateTime) -> Result<()> {
        if self.status != JoinRequestStatus::Pending {
            return Err(StorageError::Conflict(
                "Join request has already been processed".to_string(),
            ));
        }
        if self.is_expired_at(now) {
            return Err(StorageError::Expired(
                "Join request has expired".to_string(),
            ));
        }
        Ok(())
    }

    pub fn accept(
        &mut self,
        processed_by: Uuid,
        response_message: Option<String>,
        now: NaiveDateTime,
    ) -> Result<()> {
        self.ensure_actionable(now)?;
        self.status = JoinRequestStatus::Accepted;
        self.processed_at = Some(now);
        self.processed_by = Some(processed_by);
        self.response_message = response_message;
        Ok(())
    }

    pub fn reject(
        &mut self,
        processed_by: Uuid,
        response_message: Option<String>,
        now: NaiveDateTime,
    ) -> Result<()> {
        self.ensure_actionable(now)?;
        self.status = JoinRequestStatus::Rejected;
        self.processed_at = Some(now);
        self.processed_by = Some(processed_by);
        self.response_message = response_message;
        Ok(())
    }

    /// Requester-driven cancellation, recorded as a rejection.
    pub fn cancel(&mut self, requester_id: Uuid, now: NaiveDateTime) -> Result<()> {
        if !self.can_cancel_at(now) {
            return Err(StorageError::Conflict(
                "This join request cannot be cancelled".to_string(),
            ));
        }
        self.status = JoinRequestStatus::Rejected;
        self.processed_at = Some(now);
        self.processed_by = Some(requester_id);
        self.response_message = Some("Cancelled by user".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(created: NaiveDateTime) -> JoinRequest {
        JoinRequest {
            join_request_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            requester_id: Uuid::new_v4(),
            requested_role: "Backend".to_string(),
            user_skills: vec!["Rust".to_string()],
            message: "Hi!".to_string(),
            status: JoinRequestStatus::Pending,
            response_message: None,
            expires_at: created + Duration::hours(EXPIRY_HOURS),
            processed_at: None,
            processed_by: None,
            deleted: false,
            created_at: created,
            updated_at: created,
        }
    }

    fn t0() -> NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }

    #[test]
    fn test_accept_records_processing_metadata() {
        let now = t0();
        let mut r = request(now);
        let leader = Uuid::new_v4();

        r.accept(leader, Some("Welcome!".to_string()), now).unwrap();

        assert_eq!(r.status, JoinRequestStatus::Accepted);
        assert_eq!(r.processed_by, Some(leader));
        assert_eq!(r.processed_at, Some(now));
        assert_eq!(r.response_message.as_deref(), Some("Welcome!"));
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        let now = t0();
        let mut r = request(now);
        r.accept(Uuid::new_v4(), None, now).unwrap();

        let err = r.reject(Uuid::new_v4(), None, now).unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(r.status, JoinRequestStatus::Accepted);
    }

    #[test]
    fn test_accept_after_expiry_fails() {
        let now = t0();
        let mut r = request(now);
        let later = now + Duration::hours(EXPIRY_HOURS + 1);

        let err = r.accept(Uuid::new_v4(), None, later).unwrap_err();
        assert!(matches!(err, StorageError::Expired(_)));
        assert_eq!(r.status, JoinRequestStatus::Pending);
    }

    #[test]
    fn test_cancel_records_reason() {
        let now = t0();
        let mut r = request(now);
        let requester = r.requester_id;

        r.cancel(requester, now).unwrap();

        assert_eq!(r.status, JoinRequestStatus::Rejected);
        assert_eq!(r.response_message.as_deref(), Some("Cancelled by user"));
        assert_eq!(r.processed_by, Some(requester));
    }

    #[test]
    fn test_cancel_after_expiry_fails() {
        let now = t0();
        let mut r = request(now);
        let later = now + Duration::hours(EXPIRY_HOURS + 1);

        assert!(!r.can_cancel_at(later));
        let err = r.cancel(r.requester_id, later).unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = t0();
        let r = request(now);
        assert!(!r.is_expired_at(r.expires_at));
        assert!(r.is_expired_at(r.expires_at + Duration::seconds(1)));
    }
}
