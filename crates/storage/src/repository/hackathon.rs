use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Hackathon;

/// Repository for hackathon directory lookups.
pub struct HackathonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HackathonRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, hackathon_id: Uuid) -> Result<Hackathon> {
        let hackathon = sqlx::query_as::<_, Hackathon>(
            r#"
            SELECT hackathon_id, title, organizer, status, deadline, team_count, created_at
            FROM hackathons
            WHERE hackathon_id = $1
            "#,
        )
        .bind(hackathon_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(hackathon)
    }

    /// Teams may only be formed for approved hackathons.
    pub async fn find_approved_by_id(&self, hackathon_id: Uuid) -> Result<Hackathon> {
        let hackathon = sqlx::query_as::<_, Hackathon>(
            r#"
            SELECT hackathon_id, title, organizer, status, deadline, team_count, created_at
            FROM hackathons
            WHERE hackathon_id = $1 AND status = 'APPROVED'
            "#,
        )
        .bind(hackathon_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(hackathon)
    }

    /// Recomputes the stored team counter from the teams table inside the
    /// caller's transaction, instead of a racing increment statement.
    pub async fn recompute_team_count(
        conn: &mut PgConnection,
        hackathon_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE hackathons
            SET team_count = (
                SELECT COUNT(*) FROM teams
                WHERE hackathon_id = $1 AND NOT deleted
            )
            WHERE hackathon_id = $1
            "#,
        )
        .bind(hackathon_id)
        .execute(conn)
        .await?;

        Ok(())
    }
}
