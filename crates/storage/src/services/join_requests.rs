//! Join-request lifecycle orchestration.
//!
//! Every mutation runs inside a single transaction. The accept path locks the
//! team row first, so a capacity check and the membership insert it guards
//! commit as one atomic unit; of N concurrent accepts against the last open
//! slot, exactly one succeeds and the rest observe the team as full.

use chrono::{Duration, NaiveDateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::join_request::{
    JoinRequestAction, JoinRequestResponse, JoinRequestStats, MyJoinRequestItem,
    MyJoinRequestsResponse, ProcessJoinRequestRequest, ProcessJoinRequestResponse,
    SendJoinRequestRequest, TeamJoinRequestItem, TeamJoinRequestsResponse,
};
use crate::error::{Result, StorageError};
use crate::models::join_request::EXPIRY_HOURS;
use crate::models::{JoinRequestStatus, Team, TeamRole, User, skill_match};
use crate::notify::{EmailSink, NotificationEvent, NotificationSink};
use crate::repository::hackathon::HackathonRepository;
use crate::repository::join_request::{JoinRequestRepository, RequestWithRequester};
use crate::repository::team::TeamRepository;
use crate::repository::user::UserRepository;

pub async fn send_join_request(
    pool: &PgPool,
    requester_id: Uuid,
    req: &SendJoinRequestRequest,
    notifier: &dyn NotificationSink,
) -> Result<JoinRequestResponse> {
    tracing::info!(%requester_id, team_id = %req.team_id, "sending join request");
    let now = Utc::now().naive_utc();

    let requester = UserRepository::new(pool).find_by_id(requester_id).await?;
    let team = TeamRepository::new(pool).find_by_id(req.team_id).await?;

    let mut tx = pool.begin().await?;

    // Sweep the requester's own overdue PENDING rows so the one-active-request
    // unique index cannot block this insert.
    JoinRequestRepository::reject_expired_for_requester(&mut tx, requester_id, now).await?;

    if JoinRequestRepository::has_active_request(&mut *tx, requester_id, now).await? {
        return Err(StorageError::Conflict(
            "You already have an active join request. Wait for it to be processed or cancel it first"
                .to_string(),
        ));
    }
    if JoinRequestRepository::has_active_request_for_team(&mut *tx, requester_id, req.team_id, now)
        .await?
    {
        return Err(StorageError::Conflict(
            "You already have a pending request for this team".to_string(),
        ));
    }
    if TeamRepository::is_user_active_member(&mut *tx, req.team_id, requester_id).await? {
        return Err(StorageError::Conflict(
            "You are already a member of this team".to_string(),
        ));
    }
    if !team.is_accepting_members() {
        return Err(StorageError::Conflict(
            "This team is not accepting new members".to_string(),
        ));
    }
    if TeamRepository::is_user_in_any_team_for_hackathon(&mut *tx, requester_id, team.hackathon_id)
        .await?
    {
        return Err(StorageError::Conflict(
            "You are already part of a team for this hackathon".to_string(),
        ));
    }

    let expires_at = now + Duration::hours(EXPIRY_HOURS);
    let request = JoinRequestRepository::insert(&mut tx, requester_id, req, expires_at)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                StorageError::Conflict(
                    "You already have an active join request. Wait for it to be processed or cancel it first"
                        .to_string(),
                )
            } else {
                e
            }
        })?;

    tx.commit().await?;

    notifier.notify(&NotificationEvent::JoinRequestReceived {
        recipient: team.leader_id,
        join_request_id: request.join_request_id,
        team_id: team.team_id,
        team_name: team.team_name.clone(),
        requester_name: requester.name().to_string(),
    });

    tracing::info!(
        join_request_id = %request.join_request_id,
        team_id = %team.team_id,
        "join request created"
    );

    Ok(request.into())
}

pub async fn process_join_request(
    pool: &PgPool,
    join_request_id: Uuid,
    leader_id: Uuid,
    req: &ProcessJoinRequestRequest,
    notifier: &dyn NotificationSink,
    emailer: &dyn EmailSink,
) -> Result<ProcessJoinRequestResponse> {
    tracing::info!(%join_request_id, %leader_id, action = ?req.action, "processing join request");
    let now = Utc::now().naive_utc();

    let mut tx = pool.begin().await?;

    let mut request = JoinRequestRepository::lock_for_update(&mut tx, join_request_id).await?;
    let mut team = TeamRepository::lock_for_update(&mut tx, request.team_id).await?;

    if !team.is_leader(leader_id) {
        return Err(StorageError::Unauthorized(
            "Only the team leader can process this join request".to_string(),
        ));
    }

    let requester = UserRepository::new(pool)
        .find_by_id(request.requester_id)
        .await?;

    match req.action {
        JoinRequestAction::Accept => {
            request.accept(leader_id, req.response_message.clone(), now)?;

            // Capacity and cross-team state may have changed since the request
            // was sent; re-validate against the locked team row.
            if team.is_full {
                return Err(StorageError::Conflict("Team is now full".to_string()));
            }
            if TeamRepository::is_user_in_any_team_for_hackathon(
                &mut *tx,
                request.requester_id,
                team.hackathon_id,
            )
            .await?
            {
                return Err(StorageError::Conflict(
                    "User has already joined another team for this hackathon".to_string(),
                ));
            }

            team.add_member(&request.requested_role)?;

            TeamRepository::insert_member(
                &mut tx,
                team.team_id,
                request.requester_id,
                TeamRole::Member,
                &request.requested_role,
            )
            .await?;
            TeamRepository::save_membership_change(&mut tx, &team).await?;
            JoinRequestRepository::save_transition(&mut tx, &request).await?;

            tx.commit().await?;

            tracing::info!(%join_request_id, team_id = %team.team_id, "join request accepted");

            notifier.notify(&NotificationEvent::JoinRequestAccepted {
                recipient: request.requester_id,
                team_id: team.team_id,
                team_name: team.team_name.clone(),
            });
            send_welcome_email(pool, emailer, &requester, &team).await;
        }
        JoinRequestAction::Reject => {
            request.reject(leader_id, req.response_message.clone(), now)?;
            JoinRequestRepository::save_transition(&mut tx, &request).await?;

            tx.commit().await?;

            tracing::info!(%join_request_id, "join request rejected");

            notifier.notify(&NotificationEvent::JoinRequestRejected {
                recipient: request.requester_id,
                team_id: team.team_id,
                team_name: team.team_name.clone(),
            });
        }
    }

    Ok(ProcessJoinRequestResponse {
        join_request_id: request.join_request_id,
        status: request.status,
        requester_name: requester.name().to_string(),
        team_name: team.team_name,
        processed_at: request.processed_at,
    })
}

pub async fn cancel_join_request(
    pool: &PgPool,
    join_request_id: Uuid,
    requester_id: Uuid,
) -> Result<()> {
    tracing::info!(%join_request_id, %requester_id, "cancelling join request");
    let now = Utc::now().naive_utc();

    let mut tx = pool.begin().await?;

    let mut request = JoinRequestRepository::lock_for_update(&mut tx, join_request_id).await?;
    if request.requester_id != requester_id {
        return Err(StorageError::Unauthorized(
            "You can only cancel your own join requests".to_string(),
        ));
    }

    request.cancel(requester_id, now)?;
    JoinRequestRepository::save_transition(&mut tx, &request).await?;

    tx.commit().await?;

    tracing::info!(%join_request_id, "join request cancelled");
    Ok(())
}

pub async fn get_my_join_requests(pool: &PgPool, user_id: Uuid) -> Result<MyJoinRequestsResponse> {
    let now = Utc::now().naive_utc();
    let rows = JoinRequestRepository::new(pool)
        .list_by_requester(user_id)
        .await?;

    let mut active = Vec::new();
    let mut past = Vec::new();

    for row in rows {
        let request = row.request;
        let is_active =
            request.status == JoinRequestStatus::Pending && !request.is_expired_at(now);
        let item = MyJoinRequestItem {
            join_request_id: request.join_request_id,
            team_id: request.team_id,
            team_name: row.team_name,
            hackathon_title: row.hackathon_title,
            requested_role: request.requested_role,
            user_skills: request.user_skills,
            message: request.message,
            status: request.status,
            response_message: request.response_message,
            created_at: request.created_at,
            expires_at: request.expires_at,
            processed_at: request.processed_at,
            can_cancel: is_active,
            is_expired: now > request.expires_at,
        };
        if is_active {
            active.push(item);
        } else {
            past.push(item);
        }
    }

    let has_active_request = !active.is_empty();
    Ok(MyJoinRequestsResponse {
        active,
        past,
        has_active_request,
    })
}

pub async fn get_team_join_requests(
    pool: &PgPool,
    team_id: Uuid,
    leader_id: Uuid,
) -> Result<TeamJoinRequestsResponse> {
    let now = Utc::now().naive_utc();

    let team = TeamRepository::new(pool).find_by_id(team_id).await?;
    if !team.is_leader(leader_id) {
        return Err(StorageError::Unauthorized(
            "Only the team leader can view these join requests".to_string(),
        ));
    }

    let requests = JoinRequestRepository::new(pool);
    let pending: Vec<TeamJoinRequestItem> = requests
        .pending_by_team(team_id, now)
        .await?
        .into_iter()
        .map(|row| team_request_item(row, &team, now))
        .collect();
    let processed: Vec<TeamJoinRequestItem> = requests
        .processed_by_team(team_id)
        .await?
        .into_iter()
        .map(|row| team_request_item(row, &team, now))
        .collect();

    let available_slots = team.available_slots();
    Ok(TeamJoinRequestsResponse {
        pending_count: pending.len(),
        processed_count: processed.len(),
        pending,
        processed,
        team_name: team.team_name,
        available_slots,
    })
}

pub async fn get_join_request_stats(pool: &PgPool, user_id: Uuid) -> Result<JoinRequestStats> {
    let now = Utc::now().naive_utc();
    let stats = JoinRequestRepository::new(pool)
        .stats_for_requester(user_id, now)
        .await?;

    let acceptance_rate = if stats.total_sent > 0 {
        stats.total_accepted as f64 / stats.total_sent as f64 * 100.0
    } else {
        0.0
    };

    Ok(JoinRequestStats {
        total_sent: stats.total_sent,
        total_accepted: stats.total_accepted,
        total_rejected: stats.total_rejected,
        total_expired: stats.total_expired,
        current_pending: stats.current_pending,
        acceptance_rate,
        first_request_at: stats.first_request_at,
        last_request_at: stats.last_request_at,
    })
}

/// Bulk-rejects every PENDING request past its expiry. Idempotent: a second
/// immediate run affects zero rows.
pub async fn expire_old_requests(pool: &PgPool) -> Result<u64> {
    let now = Utc::now().naive_utc();
    let expired = JoinRequestRepository::new(pool)
        .mark_expired_as_rejected(now)
        .await?;

    if expired > 0 {
        tracing::info!(expired, "expired overdue join requests");
    }
    Ok(expired)
}

fn team_request_item(
    row: RequestWithRequester,
    team: &Team,
    now: NaiveDateTime,
) -> TeamJoinRequestItem {
    let request = row.request;
    // Match is scored against the team's current needed list, not the
    // snapshot the request was sent with.
    let matching_skills = skill_match::matching_skills(&request.user_skills, &team.skills_needed);
    let match_percentage =
        skill_match::match_percentage(&request.user_skills, &team.skills_needed);

    TeamJoinRequestItem {
        join_request_id: request.join_request_id,
        requester_id: request.requester_id,
        requester_name: row.requester_name,
        requested_role: request.requested_role,
        user_skills: request.user_skills,
        message: request.message,
        matching_skills,
        match_percentage,
        status: request.status,
        created_at: request.created_at,
        expires_at: request.expires_at,
        processed_at: request.processed_at,
        is_expired: now > request.expires_at,
    }
}

/// Best-effort welcome email; failures are logged, never surfaced.
async fn send_welcome_email(pool: &PgPool, emailer: &dyn EmailSink, user: &User, team: &Team) {
    let hackathon_title = match HackathonRepository::new(pool)
        .find_by_id(team.hackathon_id)
        .await
    {
        Ok(hackathon) => hackathon.title,
        Err(e) => {
            tracing::warn!(team_id = %team.team_id, error = %e, "skipping welcome email");
            return;
        }
    };

    let subject = format!("Welcome to Team {}!", team.team_name);
    let body = format!(
        "Hello {},\n\n\
         Congratulations! You have joined team '{}' for the hackathon '{}'.\n\n\
         Team size: {}/{}\n\n\
         You can now access the team contact information and coordinate with \
         your teammates. Best of luck!",
        user.name(),
        team.team_name,
        hackathon_title,
        team.current_size,
        team.max_size,
    );
    emailer.send(&user.email, &subject, &body);
}
