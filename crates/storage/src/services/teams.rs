//! Team lifecycle and the ranked team search.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::PaginatedResponse;
use crate::dto::team::{
    CreateTeamRequest, HackathonSummary, TeamContactInfo, TeamDetailsResponse, TeamListItem,
    TeamResponse, TeamSearchQuery, TeamSortBy, UpdateTeamRequest,
};
use crate::error::{Result, StorageError};
use crate::models::{Team, TeamRole};
use crate::repository::hackathon::HackathonRepository;
use crate::repository::join_request::JoinRequestRepository;
use crate::repository::team::TeamRepository;
use crate::repository::user::UserRepository;

pub async fn create_team(
    pool: &PgPool,
    leader_id: Uuid,
    req: &CreateTeamRequest,
) -> Result<TeamResponse> {
    tracing::info!(%leader_id, hackathon_id = %req.hackathon_id, "creating team");

    UserRepository::new(pool).find_by_id(leader_id).await?;
    let hackathon = HackathonRepository::new(pool)
        .find_approved_by_id(req.hackathon_id)
        .await?;

    let mut tx = pool.begin().await?;

    if TeamRepository::is_user_in_any_team_for_hackathon(&mut *tx, leader_id, req.hackathon_id)
        .await?
    {
        return Err(StorageError::Conflict(
            "You already have a team for this hackathon".to_string(),
        ));
    }

    let team = TeamRepository::create(&mut tx, req, leader_id).await?;
    TeamRepository::insert_member(&mut tx, team.team_id, leader_id, TeamRole::Leader, "Leader")
        .await?;
    HackathonRepository::recompute_team_count(&mut tx, hackathon.hackathon_id).await?;

    tx.commit().await?;

    tracing::info!(team_id = %team.team_id, "team created");
    Ok(team.into())
}

pub async fn get_team_details(
    pool: &PgPool,
    team_id: Uuid,
    viewer_id: Uuid,
) -> Result<TeamDetailsResponse> {
    let teams = TeamRepository::new(pool);
    let team = teams.find_by_id(team_id).await?;

    let is_member = TeamRepository::is_user_active_member(pool, team_id, viewer_id).await?;
    let is_leader = team.is_leader(viewer_id);

    if !team.is_public && !is_member && !is_leader {
        return Err(StorageError::Unauthorized(
            "This team is private".to_string(),
        ));
    }

    let members = teams.active_members(team_id).await?;
    let hackathon = HackathonRepository::new(pool)
        .find_by_id(team.hackathon_id)
        .await?;

    let now = Utc::now().naive_utc();
    let (has_pending_request, can_join) = if is_member {
        (false, false)
    } else {
        let pending =
            JoinRequestRepository::has_active_request_for_team(pool, viewer_id, team_id, now)
                .await?;
        let in_other_team = TeamRepository::is_user_in_any_team_for_hackathon(
            pool,
            viewer_id,
            team.hackathon_id,
        )
        .await?;
        (
            pending,
            !pending && !in_other_team && team.is_accepting_members(),
        )
    };

    // Contact channels stay hidden from non-members.
    let contact = (is_member || is_leader).then(|| TeamContactInfo {
        contact_email: team.contact_email.clone(),
        contact_phone: team.contact_phone.clone(),
        discord_server: team.discord_server.clone(),
    });

    Ok(TeamDetailsResponse {
        members,
        hackathon: HackathonSummary {
            hackathon_id: hackathon.hackathon_id,
            title: hackathon.title,
            organizer: hackathon.organizer,
            deadline: hackathon.deadline,
        },
        is_member,
        is_leader,
        has_pending_request,
        can_join,
        contact,
        team: team.into(),
    })
}

pub async fn update_team(
    pool: &PgPool,
    team_id: Uuid,
    actor_id: Uuid,
    req: &UpdateTeamRequest,
) -> Result<TeamResponse> {
    let teams = TeamRepository::new(pool);
    let mut team = teams.find_by_id(team_id).await?;

    if !team.is_leader(actor_id) {
        return Err(StorageError::Unauthorized(
            "Only the team leader can update team details".to_string(),
        ));
    }

    if let Some(team_name) = &req.team_name {
        team.team_name = team_name.clone();
    }
    if let Some(description) = &req.description {
        team.description = Some(description.clone());
    }
    if let Some(skills_needed) = &req.skills_needed {
        team.skills_needed = skills_needed.clone();
    }
    if let Some(contact_email) = &req.contact_email {
        team.contact_email = Some(contact_email.clone());
    }
    if let Some(contact_phone) = &req.contact_phone {
        team.contact_phone = Some(contact_phone.clone());
    }
    if let Some(discord_server) = &req.discord_server {
        team.discord_server = Some(discord_server.clone());
    }
    if let Some(is_public) = req.is_public {
        team.is_public = is_public;
    }
    if let Some(is_active) = req.is_active {
        team.is_active = is_active;
    }

    teams.save_profile(&team).await?;

    tracing::info!(%team_id, "team updated");
    Ok(team.into())
}

/// Ranked team search. Candidates are filtered in SQL, then scored and sorted
/// in memory against the caller's skills, then paginated.
pub async fn search_teams(
    pool: &PgPool,
    query: &TeamSearchQuery,
) -> Result<PaginatedResponse<TeamListItem>> {
    HackathonRepository::new(pool)
        .find_approved_by_id(query.hackathon_id)
        .await?;

    let teams = TeamRepository::new(pool);
    let candidates = teams
        .search_candidates(query.hackathon_id, query.status, query.search.as_deref())
        .await?;

    let leader_ids: Vec<Uuid> = candidates.iter().map(|t| t.leader_id).collect();
    let leader_names: HashMap<Uuid, String> = teams
        .leader_display_names(&leader_ids)
        .await?
        .into_iter()
        .collect();

    let candidate_skills = query.candidate_skills();
    let mut items: Vec<TeamListItem> = candidates
        .into_iter()
        .map(|team| to_list_item(team, &candidate_skills, &leader_names))
        .collect();

    rank_teams(&mut items, query.sort_by);

    let pagination = query.pagination();
    let total = items.len() as i64;
    let page_items: Vec<TeamListItem> = items
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.limit())
        .collect();

    Ok(PaginatedResponse::new(
        page_items,
        pagination.page,
        pagination.page_size,
        total,
    ))
}

pub async fn get_user_teams(pool: &PgPool, user_id: Uuid) -> Result<Vec<TeamListItem>> {
    let teams = TeamRepository::new(pool);
    let memberships = teams.find_teams_by_member(user_id).await?;

    let leader_ids: Vec<Uuid> = memberships.iter().map(|t| t.leader_id).collect();
    let leader_names: HashMap<Uuid, String> = teams
        .leader_display_names(&leader_ids)
        .await?
        .into_iter()
        .collect();

    Ok(memberships
        .into_iter()
        .map(|team| to_list_item(team, &[], &leader_names))
        .collect())
}

pub async fn remove_member(
    pool: &PgPool,
    team_id: Uuid,
    leader_id: Uuid,
    member_user_id: Uuid,
) -> Result<()> {
    tracing::info!(%team_id, %member_user_id, "removing team member");

    let mut tx = pool.begin().await?;
    let mut team = TeamRepository::lock_for_update(&mut tx, team_id).await?;

    if !team.is_leader(leader_id) {
        return Err(StorageError::Unauthorized(
            "Only the team leader can remove members".to_string(),
        ));
    }
    if team.is_leader(member_user_id) {
        return Err(StorageError::Conflict(
            "The team leader cannot be removed from the team".to_string(),
        ));
    }

    let affected = TeamRepository::deactivate_member(&mut tx, team_id, member_user_id).await?;
    if affected == 0 {
        return Err(StorageError::Conflict(
            "User is not an active member of this team".to_string(),
        ));
    }

    team.remove_member();
    TeamRepository::save_membership_change(&mut tx, &team).await?;

    tx.commit().await?;

    tracing::info!(%team_id, %member_user_id, "team member removed");
    Ok(())
}

pub async fn leave_team(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<()> {
    tracing::info!(%team_id, %user_id, "leaving team");

    let mut tx = pool.begin().await?;
    let mut team = TeamRepository::lock_for_update(&mut tx, team_id).await?;

    if team.is_leader(user_id) {
        return Err(StorageError::Conflict(
            "The team leader cannot leave the team".to_string(),
        ));
    }

    let affected = TeamRepository::deactivate_member(&mut tx, team_id, user_id).await?;
    if affected == 0 {
        return Err(StorageError::Conflict(
            "You are not an active member of this team".to_string(),
        ));
    }

    team.remove_member();
    TeamRepository::save_membership_change(&mut tx, &team).await?;

    tx.commit().await?;

    tracing::info!(%team_id, %user_id, "left team");
    Ok(())
}

fn to_list_item(
    team: Team,
    candidate_skills: &[String],
    leader_names: &HashMap<Uuid, String>,
) -> TeamListItem {
    let matching_skills = team.matching_skills(candidate_skills);
    let match_percentage = team.match_percentage(candidate_skills);
    let leader_name = leader_names
        .get(&team.leader_id)
        .cloned()
        .unwrap_or_default();

    TeamListItem {
        team_id: team.team_id,
        available_slots: team.available_slots(),
        status: team.status(),
        team_name: team.team_name,
        description: team.description,
        max_size: team.max_size,
        current_size: team.current_size,
        leader_name,
        skills_needed: team.skills_needed,
        is_public: team.is_public,
        matching_skills,
        match_percentage,
        created_at: team.created_at,
    }
}

/// Sorts the scored items. The default ranking is match percentage descending
/// with creation time ascending as the tie-break, so equally-scored teams
/// surface oldest first.
fn rank_teams(items: &mut [TeamListItem], sort_by: TeamSortBy) {
    match sort_by {
        TeamSortBy::MatchPercentage => items.sort_by(|a, b| {
            b.match_percentage
                .cmp(&a.match_percentage)
                .then(a.created_at.cmp(&b.created_at))
        }),
        TeamSortBy::CreatedAt => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        TeamSortBy::TeamName => items.sort_by(|a, b| a.team_name.cmp(&b.team_name)),
        TeamSortBy::AvailableSlots => items.sort_by(|a, b| {
            b.available_slots
                .cmp(&a.available_slots)
                .then(a.created_at.cmp(&b.created_at))
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::TeamStatus;

    fn item(name: &str, match_percentage: i32, slots: i32, day: u32) -> TeamListItem {
        TeamListItem {
            team_id: Uuid::new_v4(),
            team_name: name.to_string(),
            description: None,
            max_size: 5,
            current_size: 5 - slots,
            available_slots: slots,
            leader_name: "Lena".to_string(),
            skills_needed: vec![],
            status: TeamStatus::Open,
            is_public: true,
            matching_skills: vec![],
            match_percentage,
            created_at: NaiveDate::from_ymd_opt(2025, 6, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    fn names(items: &[TeamListItem]) -> Vec<&str> {
        items.iter().map(|i| i.team_name.as_str()).collect()
    }

    #[test]
    fn ranks_by_match_percentage_descending() {
        let mut items = vec![item("low", 20, 2, 1), item("high", 90, 2, 2), item("mid", 50, 2, 3)];
        rank_teams(&mut items, TeamSortBy::MatchPercentage);
        assert_eq!(names(&items), ["high", "mid", "low"]);
    }

    #[test]
    fn equal_match_breaks_tie_by_oldest_first() {
        let mut items = vec![item("newer", 50, 2, 9), item("older", 50, 2, 3)];
        rank_teams(&mut items, TeamSortBy::MatchPercentage);
        assert_eq!(names(&items), ["older", "newer"]);
    }

    #[test]
    fn created_at_sort_is_newest_first() {
        let mut items = vec![item("old", 0, 2, 1), item("new", 0, 2, 20)];
        rank_teams(&mut items, TeamSortBy::CreatedAt);
        assert_eq!(names(&items), ["new", "old"]);
    }

    #[test]
    fn team_name_sort_is_alphabetical() {
        let mut items = vec![item("zeta", 0, 2, 1), item("alpha", 0, 2, 2)];
        rank_teams(&mut items, TeamSortBy::TeamName);
        assert_eq!(names(&items), ["alpha", "zeta"]);
    }

    #[test]
    fn available_slots_sort_puts_emptiest_first() {
        let mut items = vec![item("one", 0, 1, 1), item("four", 0, 4, 2), item("two", 0, 2, 3)];
        rank_teams(&mut items, TeamSortBy::AvailableSlots);
        assert_eq!(names(&items), ["four", "two", "one"]);
    }
}
