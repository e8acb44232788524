use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

use super::handlers::{
    cancel_join_request, expire_sweep, get_join_request_stats, get_my_join_requests,
    get_team_join_requests, process_join_request, send_join_request,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(send_join_request))
        .route("/my", get(get_my_join_requests))
        .route("/stats", get(get_join_request_stats))
        .route("/expire-sweep", post(expire_sweep))
        .route("/team/:team_id", get(get_team_join_requests))
        .route("/:join_request_id", delete(cancel_join_request))
        .route("/:join_request_id/process", put(process_join_request))
}
