use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use storage::Database;
use storage::notify::{LogEmailer, LogNotifier};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod state;
mod sweeper;

use config::Config;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::teams::handlers::create_team,
        features::teams::handlers::search_teams,
        features::teams::handlers::get_my_teams,
        features::teams::handlers::get_team,
        features::teams::handlers::update_team,
        features::teams::handlers::remove_member,
        features::teams::handlers::leave_team,
        features::join_requests::handlers::send_join_request,
        features::join_requests::handlers::process_join_request,
        features::join_requests::handlers::cancel_join_request,
        features::join_requests::handlers::get_my_join_requests,
        features::join_requests::handlers::get_team_join_requests,
        features::join_requests::handlers::get_join_request_stats,
        features::join_requests::handlers::expire_sweep,
    ),
    components(
        schemas(
            storage::dto::team::CreateTeamRequest,
            storage::dto::team::UpdateTeamRequest,
            storage::dto::team::TeamResponse,
            storage::dto::team::TeamDetailsResponse,
            storage::dto::team::TeamListItem,
            storage::dto::team::TeamMemberInfo,
            storage::dto::team::TeamContactInfo,
            storage::dto::team::HackathonSummary,
            storage::dto::team::TeamSortBy,
            storage::dto::team::TeamStatusFilter,
            storage::dto::join_request::SendJoinRequestRequest,
            storage::dto::join_request::JoinRequestResponse,
            storage::dto::join_request::JoinRequestAction,
            storage::dto::join_request::ProcessJoinRequestRequest,
            storage::dto::join_request::ProcessJoinRequestResponse,
            storage::dto::join_request::MyJoinRequestItem,
            storage::dto::join_request::MyJoinRequestsResponse,
            storage::dto::join_request::TeamJoinRequestItem,
            storage::dto::join_request::TeamJoinRequestsResponse,
            storage::dto::join_request::JoinRequestStats,
            storage::dto::join_request::ExpireSweepResponse,
            storage::dto::common::PaginationMeta,
            storage::models::TeamStatus,
            storage::models::TeamRole,
            storage::models::JoinRequestStatus,
        )
    ),
    tags(
        (name = "teams", description = "Team formation and membership endpoints"),
        (name = "join-requests", description = "Join request lifecycle endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_identity",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(
                            middleware::auth::USER_ID_HEADER,
                        ),
                    ),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting HackMatch API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let _scheduler = sweeper::start(db.clone()).await?;

    let state = AppState {
        db,
        notifier: Arc::new(LogNotifier),
        emailer: Arc::new(LogEmailer),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/teams", features::teams::routes::routes())
        .nest("/api/join-requests", features::join_requests::routes::routes())
        .layer(cors)
        .with_state(state);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
