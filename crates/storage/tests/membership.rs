//! Database-backed tests for the membership consistency rules: the team row
//! lock under concurrent accepts, sweep idempotence, and the leader-facing
//! request listing.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use storage::dto::join_request::{
    JoinRequestAction, ProcessJoinRequestRequest, SendJoinRequestRequest,
};
use storage::dto::team::CreateTeamRequest;
use storage::error::StorageError;
use storage::models::JoinRequestStatus;
use storage::notify::{LogEmailer, LogNotifier};
use storage::repository::join_request::JoinRequestRepository;
use storage::repository::team::TeamRepository;
use storage::services::{join_requests, teams};
use uuid::Uuid;

async fn seed_user(pool: &PgPool, name: &str, skills: &[&str]) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO users (email, display_name, skills) VALUES ($1, $2, $3) RETURNING user_id",
    )
    .bind(format!("{name}@example.com"))
    .bind(name)
    .bind(skills.iter().map(|s| s.to_string()).collect::<Vec<String>>())
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_hackathon(pool: &PgPool) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO hackathons (title, status) VALUES ('Harbor Hack', 'APPROVED') \
         RETURNING hackathon_id",
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

fn team_request(hackathon_id: Uuid, max_size: i32, skills_needed: &[&str]) -> CreateTeamRequest {
    CreateTeamRequest {
        hackathon_id,
        team_name: "Rustaceans".to_string(),
        description: None,
        max_size,
        skills_needed: skills_needed.iter().map(|s| s.to_string()).collect(),
        contact_email: None,
        contact_phone: None,
        discord_server: None,
        is_public: true,
    }
}

fn join_request(team_id: Uuid, role: &str, skills: &[&str]) -> SendJoinRequestRequest {
    SendJoinRequestRequest {
        team_id,
        requested_role: role.to_string(),
        user_skills: skills.iter().map(|s| s.to_string()).collect(),
        message: String::new(),
    }
}

#[sqlx::test]
async fn last_open_slot_admits_exactly_one_of_two_concurrent_accepts(pool: PgPool) {
    let leader = seed_user(&pool, "lena", &[]).await;
    let first = seed_user(&pool, "ravi", &["Backend"]).await;
    let second = seed_user(&pool, "mika", &["Frontend"]).await;
    let hackathon_id = seed_hackathon(&pool).await;

    let team = teams::create_team(
        &pool,
        leader,
        &team_request(hackathon_id, 2, &["Backend", "Frontend"]),
    )
    .await
    .unwrap();

    let r1 = join_requests::send_join_request(
        &pool,
        first,
        &join_request(team.team_id, "Backend", &["Backend"]),
        &LogNotifier,
    )
    .await
    .unwrap();
    let r2 = join_requests::send_join_request(
        &pool,
        second,
        &join_request(team.team_id, "Frontend", &["Frontend"]),
        &LogNotifier,
    )
    .await
    .unwrap();

    let action = ProcessJoinRequestRequest {
        action: JoinRequestAction::Accept,
        response_message: None,
    };
    let (a, b) = tokio::join!(
        join_requests::process_join_request(
            &pool,
            r1.join_request_id,
            leader,
            &action,
            &LogNotifier,
            &LogEmailer,
        ),
        join_requests::process_join_request(
            &pool,
            r2.join_request_id,
            leader,
            &action,
            &LogNotifier,
            &LogEmailer,
        ),
    );

    let (winner, loser) = match (a, b) {
        (Ok(w), Err(l)) => (w, l),
        (Err(l), Ok(w)) => (w, l),
        other => panic!("expected exactly one accept to succeed, got {other:?}"),
    };
    assert_eq!(winner.status, JoinRequestStatus::Accepted);
    assert!(matches!(loser, StorageError::Conflict(_)));

    let team = TeamRepository::new(&pool).find_by_id(team.team_id).await.unwrap();
    assert_eq!(team.current_size, 2);
    assert!(team.is_full);

    // The losing request rolls back untouched; the leader can still reject it.
    let lost_id = if winner.join_request_id == r1.join_request_id {
        r2.join_request_id
    } else {
        r1.join_request_id
    };
    let lost = JoinRequestRepository::new(&pool)
        .find_by_id(lost_id)
        .await
        .unwrap();
    assert_eq!(lost.status, JoinRequestStatus::Pending);
}

#[sqlx::test]
async fn expiry_sweep_is_idempotent(pool: PgPool) {
    let leader = seed_user(&pool, "lena", &[]).await;
    let requester = seed_user(&pool, "ravi", &["Backend"]).await;
    let hackathon_id = seed_hackathon(&pool).await;

    let team = teams::create_team(&pool, leader, &team_request(hackathon_id, 3, &["Backend"]))
        .await
        .unwrap();
    let request = join_requests::send_join_request(
        &pool,
        requester,
        &join_request(team.team_id, "Backend", &["Backend"]),
        &LogNotifier,
    )
    .await
    .unwrap();

    let past = Utc::now().naive_utc() - Duration::hours(1);
    sqlx::query("UPDATE join_requests SET expires_at = $2 WHERE join_request_id = $1")
        .bind(request.join_request_id)
        .bind(past)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(join_requests::expire_old_requests(&pool).await.unwrap(), 1);
    assert_eq!(join_requests::expire_old_requests(&pool).await.unwrap(), 0);

    let swept = JoinRequestRepository::new(&pool)
        .find_by_id(request.join_request_id)
        .await
        .unwrap();
    assert_eq!(swept.status, JoinRequestStatus::Rejected);
    assert_eq!(swept.response_message.as_deref(), Some("Request expired"));

    let stats = join_requests::get_join_request_stats(&pool, requester)
        .await
        .unwrap();
    assert_eq!(stats.total_expired, 1);
    assert_eq!(stats.current_pending, 0);
}

#[sqlx::test]
async fn leader_sees_pending_requests_scored_against_needed_list(pool: PgPool) {
    let leader = seed_user(&pool, "lena", &[]).await;
    let requester = seed_user(&pool, "ravi", &["Backend", "Design"]).await;
    let hackathon_id = seed_hackathon(&pool).await;

    let team = teams::create_team(
        &pool,
        leader,
        &team_request(hackathon_id, 3, &["Backend", "Frontend"]),
    )
    .await
    .unwrap();
    join_requests::send_join_request(
        &pool,
        requester,
        &join_request(team.team_id, "Backend", &["Backend", "Design"]),
        &LogNotifier,
    )
    .await
    .unwrap();

    let listing = join_requests::get_team_join_requests(&pool, team.team_id, leader)
        .await
        .unwrap();
    assert_eq!(listing.pending_count, 1);
    assert_eq!(listing.processed_count, 0);
    assert_eq!(listing.available_slots, 2);
    assert_eq!(listing.team_name, "Rustaceans");

    let item = &listing.pending[0];
    assert_eq!(item.match_percentage, 50);
    assert_eq!(item.matching_skills, vec!["Backend"]);
    assert!(!item.is_expired);

    let err = join_requests::get_team_join_requests(&pool, team.team_id, requester)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Unauthorized(_)));
}
