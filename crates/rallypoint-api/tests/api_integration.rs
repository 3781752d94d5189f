//! Integration tests for the HTTP API
//!
//! Each test builds a router over a fresh in-memory database and drives it
//! with `oneshot` requests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use rallypoint_api::{models::*, ApiServer, ApiServerConfig};
use rallypoint_auth::hash_password;
use rallypoint_db::{connect, entities::user, migrate};
use rallypoint_engine::NullAssigner;
use sea_orm::{ActiveModelTrait, DatabaseConnection, NotSet, Set};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const JWT_SECRET: &str = "test-secret";
const SUPER_ADMIN_EMAIL: &str = "root@example.com";

/// Helper to create an in-memory database with migrations applied
async fn create_test_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

/// Helper to create a test API server
fn create_test_server(db: DatabaseConnection) -> ApiServer {
    let config = ApiServerConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(), // Random port
        enable_cors: true,
    };

    ApiServer::new(
        config,
        db,
        JWT_SECRET.to_string(),
        SUPER_ADMIN_EMAIL.to_string(),
        Arc::new(NullAssigner),
    )
}

/// Insert a user with a real password hash and return its model
async fn seed_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    role: user::UserRole,
) -> user::Model {
    user::ActiveModel {
        id: NotSet,
        name: Set("Seeded".to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password).expect("hashing failed")),
        role: Set(role),
        phone: Set(None),
        academic_year: Set(None),
        department: Set(None),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

/// Log in through the API and return the session token
async fn login_token(app: &axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .uri("/api/auth/login")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "login failed");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let login: LoginResponse = serde_json::from_slice(&body).unwrap();
    login.token
}

fn authed_post(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn create_team_body(team_name: &str, leader_email: &str) -> serde_json::Value {
    json!({
        "team_name": team_name,
        "leader_name": "Lead",
        "leader_email": leader_email,
        "leader_password": "lead-pass"
    })
}

#[tokio::test]
async fn test_health_is_public() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_success_and_bad_password() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "right-pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();

    let token = login_token(&app, "m@example.com", "right-pass").await;
    assert!(!token.is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/login")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "email": "m@example.com", "password": "wrong" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/teams")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_team_allocates_from_floor() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    let response = app
        .clone()
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Alpha", "alpha@example.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: CreateTeamResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.team_id, 101);

    let response = app
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Beta", "beta@example.com"),
        ))
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: CreateTeamResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.team_id, 102);
}

#[tokio::test]
async fn test_coordinator_can_create_teams() {
    let db = create_test_db().await;
    seed_user(&db, "c@example.com", "pass", user::UserRole::Coordinator).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "c@example.com", "pass").await;

    let response = app
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Alpha", "alpha@example.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_team_role_cannot_create_teams() {
    let db = create_test_db().await;
    seed_user(&db, "t@example.com", "pass", user::UserRole::Team).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "t@example.com", "pass").await;

    let response = app
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Alpha", "alpha@example.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_leader_email_is_conflict() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    let response = app
        .clone()
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Alpha", "dup@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Beta", "dup@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_adjust_points_clamps_to_cap() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    let response = app
        .clone()
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Alpha", "alpha@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed_post(
            "/api/teams/101/points",
            &token,
            json!({ "points": 50, "reason": "sweep" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let outcome: AdjustPointsResponse = serde_json::from_slice(&body).unwrap();

    // Default weekly cap is 30
    assert_eq!(outcome.applied_delta, 30);
    assert_eq!(outcome.new_weekly, 30);

    let response = app
        .oneshot(authed_get("/api/teams/101", &token))
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let detail: TeamDetail = serde_json::from_slice(&body).unwrap();
    assert!(detail.summary.weekly_cap_reached);
    assert_eq!(detail.adjustments.len(), 1);
    assert_eq!(detail.adjustments[0].points_changed, 30);
}

#[tokio::test]
async fn test_adjust_points_requires_reason() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    app.clone()
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Alpha", "alpha@example.com"),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(authed_post(
            "/api/teams/101/points",
            &token,
            json!({ "points": 5, "reason": "  " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_week_config_raises_cap() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    app.clone()
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Alpha", "alpha@example.com"),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/weeks/1")
                .method("PUT")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(json!({ "weekly_cap": 60 }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_post(
            "/api/teams/101/points",
            &token,
            json!({ "points": 50, "reason": "big week" }),
        ))
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let outcome: AdjustPointsResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(outcome.applied_delta, 50);
}

#[tokio::test]
async fn test_disqualify_and_requalify() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    app.clone()
        .oneshot(authed_post(
            "/api/teams",
            &token,
            create_team_body("Alpha", "alpha@example.com"),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(authed_post(
            "/api/teams/101/disqualify",
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let summary: TeamSummary = serde_json::from_slice(&body).unwrap();
    assert!(summary.is_disqualified);

    let response = app
        .oneshot(authed_post(
            "/api/teams/101/requalify",
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let summary: TeamSummary = serde_json::from_slice(&body).unwrap();
    assert!(!summary.is_disqualified);
}

#[tokio::test]
async fn test_bulk_import_gated_to_super_admin() {
    let db = create_test_db().await;
    // Master role, but not the configured super-admin address
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/teams/import")
                .method("POST")
                .header("content-type", "text/csv")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from("Team,N,Lead,Email,P,Y,D\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bulk_import_creates_teams_and_reports_errors() {
    let db = create_test_db().await;
    seed_user(&db, SUPER_ADMIN_EMAIL, "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, SUPER_ADMIN_EMAIL, "pass").await;

    let csv = "Team,Notes,Leader,Email,Phone,Year,Dept\n\
               Alpha,,Lead A,a@example.com,,,\n\
               Beta,,Lead B,a@example.com,,,\n\
               Gamma,,Lead C,c@example.com,,,\n";

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/teams/import")
                .method("POST")
                .header("content-type", "text/csv")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(csv))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let report: ImportReport = serde_json::from_slice(&body).unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 2);

    let response = app
        .oneshot(authed_get("/api/dashboard", &token))
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let stats: DashboardStats = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats.total_teams, 2);
}

#[tokio::test]
async fn test_export_round_trips_every_field() {
    let db = create_test_db().await;
    seed_user(&db, SUPER_ADMIN_EMAIL, "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, SUPER_ADMIN_EMAIL, "pass").await;

    let response = app
        .clone()
        .oneshot(authed_post(
            "/api/teams",
            &token,
            json!({
                "team_name": "Alpha",
                "leader_name": "Lead A",
                "leader_email": "alpha@example.com",
                "leader_password": "lead-pass",
                "leader_phone": "555-0101",
                "leader_academic_year": "3rd",
                "leader_department": "CS",
                "members": [
                    {
                        "name": "M1",
                        "email": "m1@example.com",
                        "academic_year": "2nd",
                        "department": "EE"
                    },
                    { "name": "M2", "email": "m2@example.com" }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Put some state on every exported counter and flag
    app.clone()
        .oneshot(authed_post(
            "/api/teams/101/points",
            &token,
            json!({ "points": 50, "reason": "cap out" }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(authed_post("/api/teams/101/disqualify", &token, json!({})))
        .await
        .unwrap();

    let response = app
        .oneshot(authed_get("/api/teams/export", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let doc: ExportDocument = serde_json::from_slice(&body).unwrap();

    assert_eq!(doc.total_teams, 1);
    assert!(doc.export_date <= chrono::Utc::now());

    let t = &doc.teams[0];
    assert_eq!(t.id, 101);
    assert_eq!(t.team_name, "Alpha");
    assert_eq!(t.leader.name, "Lead A");
    assert_eq!(t.leader.email, "alpha@example.com");
    assert_eq!(t.leader.phone, "555-0101");
    assert_eq!(t.leader.academic_year, "3rd");
    assert_eq!(t.leader.department, "CS");
    assert_eq!(t.coordinator_id, None);
    assert_eq!(t.total_points, 30);
    assert_eq!(t.weekly_points, 30);
    assert_eq!(t.week_number, 1);
    assert!(t.weekly_cap_reached);
    assert!(t.is_disqualified);

    assert_eq!(t.members.len(), 2);
    assert_eq!(t.members[0].name, "M1");
    assert_eq!(t.members[0].email, "m1@example.com");
    assert_eq!(t.members[0].academic_year, "2nd");
    assert_eq!(t.members[0].department, "EE");
    assert_eq!(t.members[1].name, "M2");
    assert_eq!(t.members[1].academic_year, "", "absent metadata exports as empty string");
}

#[tokio::test]
async fn test_team_list_orders_by_total_points() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    for (name, email) in [("Alpha", "a@example.com"), ("Beta", "b@example.com")] {
        app.clone()
            .oneshot(authed_post(
                "/api/teams",
                &token,
                create_team_body(name, email),
            ))
            .await
            .unwrap();
    }

    // Give Beta (102) the lead
    app.clone()
        .oneshot(authed_post(
            "/api/teams/102/points",
            &token,
            json!({ "points": 10, "reason": "win" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(authed_get("/api/teams", &token))
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let list: TeamList = serde_json::from_slice(&body).unwrap();

    assert_eq!(list.total, 2);
    assert_eq!(list.teams[0].id, 102);
    assert_eq!(list.teams[1].id, 101);
}

#[tokio::test]
async fn test_unknown_team_detail_is_not_found() {
    let db = create_test_db().await;
    seed_user(&db, "m@example.com", "pass", user::UserRole::Master).await;
    let app = create_test_server(db).build_router();
    let token = login_token(&app, "m@example.com", "pass").await;

    let response = app
        .oneshot(authed_get("/api/teams/999", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
