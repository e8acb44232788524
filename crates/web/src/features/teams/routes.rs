use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::handlers::{
    create_team, get_my_teams, get_team, leave_team, remove_member, search_teams, update_team,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_team).get(search_teams))
        .route("/my", get(get_my_teams))
        .route("/:team_id", get(get_team).put(update_team))
        .route("/:team_id/members/:user_id", delete(remove_member))
        .route("/:team_id/leave", post(leave_team))
}
