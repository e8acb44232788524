use sqlx::{FromRow, PgConnection, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::dto::team::{CreateTeamRequest, TeamMemberInfo, TeamStatusFilter};
use crate::error::{Result, StorageError};
use crate::models::{Team, TeamRole};

const TEAM_COLUMNS: &str = "team_id, team_name, description, max_size, current_size, \
     skills_needed, skills_filled, contact_email, contact_phone, discord_server, \
     is_public, is_full, is_active, deleted, hackathon_id, leader_id, created_at, updated_at";

#[derive(FromRow)]
struct MemberRow {
    user_id: Uuid,
    display_name: String,
    role: TeamRole,
    assigned_role: Option<String>,
    skills: Vec<String>,
    joined_at: chrono::NaiveDateTime,
}

/// Repository for team and membership database operations.
///
/// Membership mutations take a `&mut PgConnection` so they run inside the
/// caller's transaction, after [`TeamRepository::lock_for_update`] has
/// serialized access to the team row.
pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, team_id: Uuid) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = $1 AND NOT deleted"
        ))
        .bind(team_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(team)
    }

    /// Fetches the team row under `FOR UPDATE`, blocking concurrent membership
    /// mutations until the surrounding transaction commits. This is the
    /// serialization point for every capacity check-then-act.
    pub async fn lock_for_update(conn: &mut PgConnection, team_id: Uuid) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = $1 AND NOT deleted FOR UPDATE"
        ))
        .bind(team_id)
        .fetch_optional(conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(team)
    }

    pub async fn create(
        conn: &mut PgConnection,
        req: &CreateTeamRequest,
        leader_id: Uuid,
    ) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(&format!(
            r#"
            INSERT INTO teams (
                team_name, description, max_size, current_size, skills_needed,
                skills_filled, contact_email, contact_phone, discord_server,
                is_public, is_full, hackathon_id, leader_id
            )
            VALUES ($1, $2, $3, 1, $4, '{{}}'::text[], $5, $6, $7, $8, 1 >= $3, $9, $10)
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(&req.team_name)
        .bind(&req.description)
        .bind(req.max_size)
        .bind(&req.skills_needed)
        .bind(&req.contact_email)
        .bind(&req.contact_phone)
        .bind(&req.discord_server)
        .bind(req.is_public)
        .bind(req.hackathon_id)
        .bind(leader_id)
        .fetch_one(conn)
        .await?;

        Ok(team)
    }

    /// Persists metadata fields that do not touch membership or capacity.
    pub async fn save_profile(&self, team: &Team) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE teams
            SET team_name = $2, description = $3, skills_needed = $4,
                contact_email = $5, contact_phone = $6, discord_server = $7,
                is_public = $8, is_active = $9, updated_at = now()
            WHERE team_id = $1 AND NOT deleted
            "#,
        )
        .bind(team.team_id)
        .bind(&team.team_name)
        .bind(&team.description)
        .bind(&team.skills_needed)
        .bind(&team.contact_email)
        .bind(&team.contact_phone)
        .bind(&team.discord_server)
        .bind(team.is_public)
        .bind(team.is_active)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Writes the aggregate's skill slots back and recomputes
    /// `current_size`/`is_full` from the member table, all inside the caller's
    /// transaction. The table CHECK on `current_size <= max_size` backstops
    /// the aggregate's capacity validation.
    pub async fn save_membership_change(conn: &mut PgConnection, team: &Team) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE teams t
            SET skills_needed = $2,
                skills_filled = $3,
                current_size = m.cnt,
                is_full = m.cnt >= t.max_size,
                updated_at = now()
            FROM (
                SELECT COUNT(*)::int AS cnt
                FROM team_members
                WHERE team_id = $1 AND is_active
            ) m
            WHERE t.team_id = $1
            "#,
        )
        .bind(team.team_id)
        .bind(&team.skills_needed)
        .bind(&team.skills_filled)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn insert_member(
        conn: &mut PgConnection,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
        assigned_role: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role, assigned_role)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .bind(assigned_role)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Deactivates the active membership row; returns the number of rows
    /// affected (0 when the user was not an active member).
    pub async fn deactivate_member(
        conn: &mut PgConnection,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE team_members
            SET is_active = FALSE
            WHERE team_id = $1 AND user_id = $2 AND is_active
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn active_members(&self, team_id: Uuid) -> Result<Vec<TeamMemberInfo>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            r#"
            SELECT tm.user_id, COALESCE(u.display_name, u.email) AS display_name,
                   tm.role, tm.assigned_role, u.skills, tm.created_at AS joined_at
            FROM team_members tm
            INNER JOIN users u ON u.user_id = tm.user_id
            WHERE tm.team_id = $1 AND tm.is_active
            ORDER BY tm.created_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TeamMemberInfo {
                user_id: row.user_id,
                display_name: row.display_name,
                role: row.role,
                assigned_role: row.assigned_role,
                skills: row.skills,
                joined_at: row.joined_at,
            })
            .collect())
    }

    pub async fn is_user_active_member<'e>(
        executor: impl sqlx::PgExecutor<'e>,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM team_members
                WHERE team_id = $1 AND user_id = $2 AND is_active
            )
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// A user may hold at most one active membership per hackathon.
    pub async fn is_user_in_any_team_for_hackathon<'e>(
        executor: impl sqlx::PgExecutor<'e>,
        user_id: Uuid,
        hackathon_id: Uuid,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM team_members tm
                INNER JOIN teams t ON t.team_id = tm.team_id
                WHERE tm.user_id = $1 AND tm.is_active
                  AND t.hackathon_id = $2 AND NOT t.deleted
            )
            "#,
        )
        .bind(user_id)
        .bind(hackathon_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn find_teams_by_member(&self, user_id: Uuid) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(&format!(
            r#"
            SELECT {TEAM_COLUMNS}
            FROM teams t
            WHERE NOT t.deleted AND EXISTS (
                SELECT 1 FROM team_members tm
                WHERE tm.team_id = t.team_id AND tm.user_id = $1 AND tm.is_active
            )
            ORDER BY t.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(teams)
    }

    /// Candidate set for the ranked search: public, not deleted, filtered by
    /// status and free text. Ordered by creation time so the in-memory
    /// ranking's tie-break is deterministic.
    pub async fn search_candidates(
        &self,
        hackathon_id: Uuid,
        status: TeamStatusFilter,
        search: Option<&str>,
    ) -> Result<Vec<Team>> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE NOT deleted AND is_public AND hackathon_id = "
        ));
        query.push_bind(hackathon_id);

        match status {
            TeamStatusFilter::All => {}
            TeamStatusFilter::Open => {
                query.push(" AND is_active AND NOT is_full");
            }
            TeamStatusFilter::Full => {
                query.push(" AND is_full");
            }
            TeamStatusFilter::Closed => {
                query.push(" AND NOT is_active");
            }
        }

        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            query.push(" AND (team_name ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR description ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        query.push(" ORDER BY created_at ASC");

        let teams: Vec<Team> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(teams)
    }

    pub async fn leader_display_names(&self, leader_ids: &[Uuid]) -> Result<Vec<(Uuid, String)>> {
        #[derive(FromRow)]
        struct LeaderRow {
            user_id: Uuid,
            display_name: String,
        }

        let rows: Vec<LeaderRow> = sqlx::query_as(
            r#"
            SELECT user_id, COALESCE(display_name, email) AS display_name
            FROM users
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(leader_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.user_id, row.display_name))
            .collect())
    }
}
