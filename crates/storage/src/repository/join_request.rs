use chrono::NaiveDateTime;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::join_request::SendJoinRequestRequest;
use crate::error::{Result, StorageError};
use crate::models::JoinRequest;

const REQUEST_COLUMNS: &str = "join_request_id, team_id, requester_id, requested_role, \
     user_skills, message, status, response_message, expires_at, processed_at, \
     processed_by, deleted, created_at, updated_at";

/// A join request joined with its team and hackathon names, for the
/// requester's own listings.
#[derive(FromRow)]
pub struct RequestWithTeam {
    #[sqlx(flatten)]
    pub request: JoinRequest,
    pub team_name: String,
    pub hackathon_title: String,
}

/// A join request joined with the requester's display name, for the
/// leader-facing listings.
#[derive(FromRow)]
pub struct RequestWithRequester {
    #[sqlx(flatten)]
    pub request: JoinRequest,
    pub requester_name: String,
}

#[derive(FromRow)]
pub struct RequesterStats {
    pub total_sent: i64,
    pub total_accepted: i64,
    pub total_rejected: i64,
    pub total_expired: i64,
    pub current_pending: i64,
    pub first_request_at: Option<NaiveDateTime>,
    pub last_request_at: Option<NaiveDateTime>,
}

/// Repository for JoinRequest database operations.
pub struct JoinRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> JoinRequestRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, join_request_id: Uuid) -> Result<JoinRequest> {
        let request = sqlx::query_as::<_, JoinRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM join_requests WHERE join_request_id = $1 AND NOT deleted"
        ))
        .bind(join_request_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(request)
    }

    /// Locks the request row for the duration of the surrounding transaction
    /// so concurrent processing of the same request serializes.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        join_request_id: Uuid,
    ) -> Result<JoinRequest> {
        let request = sqlx::query_as::<_, JoinRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM join_requests \
             WHERE join_request_id = $1 AND NOT deleted FOR UPDATE"
        ))
        .bind(join_request_id)
        .fetch_optional(conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(request)
    }

    pub async fn insert(
        conn: &mut PgConnection,
        requester_id: Uuid,
        req: &SendJoinRequestRequest,
        expires_at: NaiveDateTime,
    ) -> Result<JoinRequest> {
        let request = sqlx::query_as::<_, JoinRequest>(&format!(
            r#"
            INSERT INTO join_requests (
                team_id, requester_id, requested_role, user_skills, message, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(req.team_id)
        .bind(requester_id)
        .bind(&req.requested_role)
        .bind(&req.user_skills)
        .bind(&req.message)
        .bind(expires_at)
        .fetch_one(conn)
        .await?;

        Ok(request)
    }

    /// Persists a state transition produced by the aggregate.
    pub async fn save_transition(conn: &mut PgConnection, request: &JoinRequest) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE join_requests
            SET status = $2, response_message = $3, processed_at = $4,
                processed_by = $5, updated_at = now()
            WHERE join_request_id = $1
            "#,
        )
        .bind(request.join_request_id)
        .bind(request.status)
        .bind(&request.response_message)
        .bind(request.processed_at)
        .bind(request.processed_by)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Whether the user holds any PENDING, unexpired request, system-wide.
    pub async fn has_active_request<'e>(
        executor: impl sqlx::PgExecutor<'e>,
        requester_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM join_requests
                WHERE requester_id = $1 AND NOT deleted
                  AND status = 'PENDING' AND expires_at > $2
            )
            "#,
        )
        .bind(requester_id)
        .bind(now)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn has_active_request_for_team<'e>(
        executor: impl sqlx::PgExecutor<'e>,
        requester_id: Uuid,
        team_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM join_requests
                WHERE requester_id = $1 AND team_id = $2 AND NOT deleted
                  AND status = 'PENDING' AND expires_at > $3
            )
            "#,
        )
        .bind(requester_id)
        .bind(team_id)
        .bind(now)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Self-heal before inserting a new request: the requester's own expired
    /// PENDING rows are swept to REJECTED so the one-active-request unique
    /// index never blocks a legitimate new request.
    pub async fn reject_expired_for_requester(
        conn: &mut PgConnection,
        requester_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE join_requests
            SET status = 'REJECTED', processed_at = $2,
                response_message = 'Request expired', updated_at = now()
            WHERE requester_id = $1 AND NOT deleted
              AND status = 'PENDING' AND expires_at <= $2
            "#,
        )
        .bind(requester_id)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Bulk expiry sweep: transitions every overdue PENDING request to
    /// REJECTED. Idempotent, a second run matches no rows.
    pub async fn mark_expired_as_rejected(&self, now: NaiveDateTime) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE join_requests
            SET status = 'REJECTED', processed_at = $1,
                response_message = 'Request expired', updated_at = now()
            WHERE NOT deleted AND status = 'PENDING' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_by_requester(&self, requester_id: Uuid) -> Result<Vec<RequestWithTeam>> {
        let rows: Vec<RequestWithTeam> = sqlx::query_as(
            r#"
            SELECT jr.*, t.team_name, h.title AS hackathon_title
            FROM join_requests jr
            INNER JOIN teams t ON t.team_id = jr.team_id
            INNER JOIN hackathons h ON h.hackathon_id = t.hackathon_id
            WHERE jr.requester_id = $1 AND NOT jr.deleted
            ORDER BY jr.created_at DESC
            "#,
        )
        .bind(requester_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn pending_by_team(
        &self,
        team_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<Vec<RequestWithRequester>> {
        let rows: Vec<RequestWithRequester> = sqlx::query_as(
            r#"
            SELECT jr.*, COALESCE(u.display_name, u.email) AS requester_name
            FROM join_requests jr
            INNER JOIN users u ON u.user_id = jr.requester_id
            WHERE jr.team_id = $1 AND NOT jr.deleted
              AND jr.status = 'PENDING' AND jr.expires_at > $2
            ORDER BY jr.created_at ASC
            "#,
        )
        .bind(team_id)
        .bind(now)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn processed_by_team(&self, team_id: Uuid) -> Result<Vec<RequestWithRequester>> {
        let rows: Vec<RequestWithRequester> = sqlx::query_as(
            r#"
            SELECT jr.*, COALESCE(u.display_name, u.email) AS requester_name
            FROM join_requests jr
            INNER JOIN users u ON u.user_id = jr.requester_id
            WHERE jr.team_id = $1 AND NOT jr.deleted
              AND jr.status IN ('ACCEPTED', 'REJECTED')
            ORDER BY jr.processed_at DESC NULLS LAST
            "#,
        )
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn stats_for_requester(
        &self,
        requester_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<RequesterStats> {
        let stats: RequesterStats = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS total_sent,
                   COUNT(*) FILTER (WHERE status = 'ACCEPTED') AS total_accepted,
                   COUNT(*) FILTER (WHERE status = 'REJECTED') AS total_rejected,
                   COUNT(*) FILTER (
                       WHERE status = 'REJECTED' AND response_message = 'Request expired'
                   ) AS total_expired,
                   COUNT(*) FILTER (
                       WHERE status = 'PENDING' AND expires_at > $2
                   ) AS current_pending,
                   MIN(created_at) AS first_request_at,
                   MAX(created_at) AS last_request_at
            FROM join_requests
            WHERE requester_id = $1 AND NOT deleted
            "#,
        )
        .bind(requester_id)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
