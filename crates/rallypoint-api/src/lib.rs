pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rallypoint_engine::CoordinatorAssigner;
use sea_orm::DatabaseConnection;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    /// Email allowed through the super-admin gate (bulk import, export)
    pub super_admin_email: String,
    pub assigner: Arc<dyn CoordinatorAssigner>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rallypoint API",
        version = "0.1.0",
        description = "REST API for team provisioning and the points ledger",
        contact(
            name = "Rallypoint Team",
            email = "team@rallypoint.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::login,
        handlers::dashboard,
        handlers::list_teams,
        handlers::get_team,
        handlers::create_team,
        handlers::adjust_team_points,
        handlers::disqualify_team,
        handlers::requalify_team,
        handlers::upsert_week_config,
        handlers::bulk_register,
        handlers::export_teams,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::HealthResponse,
            models::LoginRequest,
            models::User,
            models::LoginResponse,
            models::DashboardStats,
            models::TeamSummary,
            models::TeamList,
            models::Member,
            models::AdjustmentEntry,
            models::TeamDetail,
            models::MemberRequest,
            models::CreateTeamRequest,
            models::CreateTeamResponse,
            models::AdjustPointsRequest,
            models::AdjustPointsResponse,
            models::WeekConfigRequest,
            models::WeekConfig,
            models::ExportLeader,
            models::ExportTeam,
            models::ExportDocument,
            models::ImportRowError,
            models::ImportReport,
        )
    ),
    tags(
        (name = "teams", description = "Team provisioning and management endpoints"),
        (name = "points", description = "Points ledger endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 8080).into(),
            enable_cors: true,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiServerConfig,
        db: DatabaseConnection,
        jwt_secret: String,
        super_admin_email: String,
        assigner: Arc<dyn CoordinatorAssigner>,
    ) -> Self {
        let state = Arc::new(AppState {
            db,
            jwt_secret,
            super_admin_email,
            assigner,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let jwt_state = Arc::new(middleware::JwtState::new(
            self.state.jwt_secret.as_bytes(),
        ));

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/login", post(handlers::login))
            .with_state(self.state.clone());

        // Build PROTECTED routes (require session token authentication)
        let protected_router = Router::new()
            .route("/api/dashboard", get(handlers::dashboard))
            .route(
                "/api/teams",
                get(handlers::list_teams).post(handlers::create_team),
            )
            .route("/api/teams/import", post(handlers::bulk_register))
            .route("/api/teams/export", get(handlers::export_teams))
            .route("/api/teams/{id}", get(handlers::get_team))
            .route("/api/teams/{id}/points", post(handlers::adjust_team_points))
            .route(
                "/api/teams/{id}/disqualify",
                post(handlers::disqualify_team),
            )
            .route("/api/teams/{id}/requalify", post(handlers::requalify_team))
            .route("/api/weeks/{week}", put(handlers::upsert_week_config))
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state.clone(),
                middleware::require_auth,
            ));

        let api_router = public_router.merge(protected_router);

        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // Cookie auth needs credentials, which rules out allow_origin(Any)
            let cors_layer = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            Some(cors_layer)
        } else {
            None
        };

        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let bind_addr = self.config.bind_addr;
        let router = self.build_router();

        info!("Starting API server on {}", bind_addr);
        info!("OpenAPI spec: http://{}/api/openapi.json", bind_addr);
        info!("Swagger UI: http://{}/swagger-ui", bind_addr);

        let listener = tokio::net::TcpListener::bind(bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}
