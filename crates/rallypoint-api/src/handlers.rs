use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use rallypoint_auth::{verify_password, JwtClaims, JwtValidator, SESSION_TOKEN_TYPE};
use rallypoint_db::entities::{point_adjustment, team, team_member, user, week_config};
use rallypoint_engine::{adjust_points, import_table, provision_team, EngineError, MemberDraft, TeamDraft};

use crate::middleware::{require_admin, require_master, AuthUser};
use crate::models::*;
use crate::AppState;

/// Session token validity window
const SESSION_VALIDITY_HOURS: i64 = 24;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(e: impl std::fmt::Display) -> ApiError {
    warn!("internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            code: Some("INTERNAL".to_string()),
        }),
    )
}

/// Map engine failures onto HTTP status codes
fn engine_error(e: EngineError) -> ApiError {
    let (status, code) = match &e {
        EngineError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        EngineError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        EngineError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        EngineError::Encoding(_) => (StatusCode::BAD_REQUEST, "BAD_ENCODING"),
        EngineError::Password(_) | EngineError::Database(_) => {
            return internal_error(e);
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            code: Some(code.to_string()),
        }),
    )
}

/// Load the caller's user row and verify the super-admin email gate.
///
/// Bulk import and export are restricted beyond the master role: the caller's
/// email must match the configured super-admin address.
async fn require_super_admin(state: &AppState, auth: &AuthUser) -> Result<(), ApiError> {
    require_master(auth)?;

    let caller = user::Entity::find_by_id(auth.user_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Authenticated user no longer exists".to_string(),
                    code: Some("UNKNOWN_USER".to_string()),
                }),
            )
        })?;

    if !caller
        .email
        .eq_ignore_ascii_case(&state.super_admin_email)
    {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "This operation is restricted to the super admin".to_string(),
                code: Some("FORBIDDEN".to_string()),
            }),
        ));
    }

    Ok(())
}

fn team_summary(t: &team::Model, leader_name: String) -> TeamSummary {
    TeamSummary {
        id: t.id,
        team_name: t.team_name.clone(),
        leader_name,
        total_points: t.total_points,
        weekly_points: t.weekly_points,
        week_number: t.week_number,
        weekly_cap_reached: t.weekly_cap_reached,
        is_disqualified: t.is_disqualified,
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid email or password".to_string(),
                code: Some("INVALID_CREDENTIALS".to_string()),
            }),
        )
    };

    let account = user::Entity::find()
        .filter(user::Column::Email.eq(req.email.trim()))
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(invalid)?;

    if !account.is_active {
        return Err(invalid());
    }

    let ok = verify_password(&req.password, &account.password_hash).map_err(internal_error)?;
    if !ok {
        return Err(invalid());
    }

    let validity = Duration::hours(SESSION_VALIDITY_HOURS);
    let expires_at = Utc::now() + validity;

    let claims = JwtClaims::new(
        account.id,
        "rallypoint".to_string(),
        "rallypoint-web".to_string(),
        validity,
    )
    .with_role(account.role.as_str().to_string())
    .with_token_type(SESSION_TOKEN_TYPE.to_string());

    let token =
        JwtValidator::encode(state.jwt_secret.as_bytes(), &claims).map_err(internal_error)?;

    info!(user_id = account.id, "user logged in");

    Ok(Json(LoginResponse {
        user: User {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role.as_str().to_string(),
        },
        token,
        expires_at,
    }))
}

/// Aggregate counts for the admin dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, ApiError> {
    let total_teams = team::Entity::find()
        .count(&state.db)
        .await
        .map_err(internal_error)?;

    let disqualified_teams = team::Entity::find()
        .filter(team::Column::IsDisqualified.eq(true))
        .count(&state.db)
        .await
        .map_err(internal_error)?;

    let total_members = team_member::Entity::find()
        .count(&state.db)
        .await
        .map_err(internal_error)?;

    let total_coordinators = user::Entity::find()
        .filter(user::Column::Role.eq(user::UserRole::Coordinator))
        .count(&state.db)
        .await
        .map_err(internal_error)?;

    let active = team::Entity::find()
        .filter(team::Column::IsDisqualified.eq(false))
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    let total_points = active.iter().map(|t| t.total_points as i64).sum();

    Ok(Json(DashboardStats {
        total_teams,
        active_teams: total_teams - disqualified_teams,
        disqualified_teams,
        total_members,
        total_coordinators,
        total_points,
    }))
}

/// List all teams, highest total first
#[utoipa::path(
    get,
    path = "/api/teams",
    responses(
        (status = 200, description = "List of teams", body = TeamList),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn list_teams(State(state): State<Arc<AppState>>) -> Result<Json<TeamList>, ApiError> {
    debug!("Listing teams");

    let rows = team::Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(team::Column::TotalPoints)
        .order_by_asc(team::Column::Id)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    let teams: Vec<TeamSummary> = rows
        .iter()
        .map(|(t, leader)| {
            let leader_name = leader.as_ref().map(|u| u.name.clone()).unwrap_or_default();
            team_summary(t, leader_name)
        })
        .collect();

    let total = teams.len();

    Ok(Json(TeamList { teams, total }))
}

/// Get one team with roster and adjustment history
#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    params(
        ("id" = i32, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team detail", body = TeamDetail),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<TeamDetail>, ApiError> {
    let t = team::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Team {} not found", id),
                    code: Some("TEAM_NOT_FOUND".to_string()),
                }),
            )
        })?;

    let leader = user::Entity::find_by_id(t.leader_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?;

    let coordinator_name = match t.coordinator_id {
        Some(cid) => user::Entity::find_by_id(cid)
            .one(&state.db)
            .await
            .map_err(internal_error)?
            .map(|u| u.name),
        None => None,
    };

    let members = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(id))
        .order_by_asc(team_member::Column::Id)
        .all(&state.db)
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(|m| Member {
            name: m.name,
            email: m.email,
            academic_year: m.academic_year,
            department: m.department,
        })
        .collect();

    let adjustments = point_adjustment::Entity::find()
        .filter(point_adjustment::Column::TeamId.eq(id))
        .order_by_desc(point_adjustment::Column::Id)
        .all(&state.db)
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(|a| AdjustmentEntry {
            points_changed: a.points_changed,
            reason: a.reason,
            week_number: a.week_number,
            proof_url: a.proof_url,
            created_at: a.created_at,
        })
        .collect();

    let (leader_name, leader_email) = leader
        .map(|u| (u.name, u.email))
        .unwrap_or_default();

    Ok(Json(TeamDetail {
        summary: team_summary(&t, leader_name),
        leader_email,
        coordinator_name,
        members,
        adjustments,
    }))
}

/// Provision a new team
#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = CreateTeamResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 403, description = "Master or coordinator role required", body = ErrorResponse),
        (status = 409, description = "Leader email already registered", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<CreateTeamResponse>), ApiError> {
    require_admin(&auth)?;

    let draft = TeamDraft {
        team_name: req.team_name,
        leader_name: req.leader_name,
        leader_email: req.leader_email,
        leader_password: req.leader_password,
        leader_phone: req.leader_phone,
        leader_academic_year: req.leader_academic_year,
        leader_department: req.leader_department,
        members: req
            .members
            .into_iter()
            .map(|m| MemberDraft {
                name: m.name,
                email: m.email,
                academic_year: m.academic_year,
                department: m.department,
            })
            .collect(),
    };

    let team_id = provision_team(&state.db, state.assigner.as_ref(), draft)
        .await
        .map_err(engine_error)?;

    Ok((StatusCode::CREATED, Json(CreateTeamResponse { team_id })))
}

/// Adjust a team's points
#[utoipa::path(
    post,
    path = "/api/teams/{id}/points",
    params(
        ("id" = i32, Path, description = "Team ID")
    ),
    request_body = AdjustPointsRequest,
    responses(
        (status = 200, description = "Adjustment applied", body = AdjustPointsResponse),
        (status = 400, description = "Missing reason", body = ErrorResponse),
        (status = 403, description = "Master role required", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "points"
)]
pub async fn adjust_team_points(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(req): Json<AdjustPointsRequest>,
) -> Result<Json<AdjustPointsResponse>, ApiError> {
    require_master(&auth)?;

    let outcome = adjust_points(
        &state.db,
        id,
        req.points,
        &req.reason,
        req.proof_url,
        auth.user_id,
    )
    .await
    .map_err(engine_error)?;

    Ok(Json(AdjustPointsResponse {
        applied_delta: outcome.applied_delta,
        new_total: outcome.new_total,
        new_weekly: outcome.new_weekly,
    }))
}

async fn set_disqualified(
    state: &AppState,
    id: i32,
    disqualified: bool,
) -> Result<Json<TeamSummary>, ApiError> {
    let t = team::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Team {} not found", id),
                    code: Some("TEAM_NOT_FOUND".to_string()),
                }),
            )
        })?;

    let leader_id = t.leader_id;

    let mut active = t.into_active_model();
    active.is_disqualified = Set(disqualified);
    let updated = active.update(&state.db).await.map_err(internal_error)?;

    let leader_name = user::Entity::find_by_id(leader_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .map(|u| u.name)
        .unwrap_or_default();

    info!(team_id = id, disqualified, "team status changed");

    Ok(Json(team_summary(&updated, leader_name)))
}

/// Disqualify a team from the challenge
#[utoipa::path(
    post,
    path = "/api/teams/{id}/disqualify",
    params(
        ("id" = i32, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team disqualified", body = TeamSummary),
        (status = 403, description = "Master role required", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn disqualify_team(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<TeamSummary>, ApiError> {
    require_master(&auth)?;
    set_disqualified(&state, id, true).await
}

/// Restore a disqualified team
#[utoipa::path(
    post,
    path = "/api/teams/{id}/requalify",
    params(
        ("id" = i32, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team requalified", body = TeamSummary),
        (status = 403, description = "Master role required", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn requalify_team(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<TeamSummary>, ApiError> {
    require_master(&auth)?;
    set_disqualified(&state, id, false).await
}

/// Set the point cap for a week
#[utoipa::path(
    put,
    path = "/api/weeks/{week}",
    params(
        ("week" = i32, Path, description = "Week number")
    ),
    request_body = WeekConfigRequest,
    responses(
        (status = 200, description = "Week cap stored", body = WeekConfig),
        (status = 400, description = "Invalid week or cap", body = ErrorResponse),
        (status = 403, description = "Master role required", body = ErrorResponse)
    ),
    tag = "points"
)]
pub async fn upsert_week_config(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(week): Path<i32>,
    Json(req): Json<WeekConfigRequest>,
) -> Result<Json<WeekConfig>, ApiError> {
    require_master(&auth)?;

    if week < 1 || req.weekly_cap < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Week must be >= 1 and cap must be >= 0".to_string(),
                code: Some("INVALID_INPUT".to_string()),
            }),
        ));
    }

    let existing = week_config::Entity::find_by_id(week)
        .one(&state.db)
        .await
        .map_err(internal_error)?;

    let stored = match existing {
        Some(cfg) => {
            let mut active = cfg.into_active_model();
            active.weekly_cap = Set(req.weekly_cap);
            active.update(&state.db).await.map_err(internal_error)?
        }
        None => week_config::ActiveModel {
            week_number: Set(week),
            weekly_cap: Set(req.weekly_cap),
        }
        .insert(&state.db)
        .await
        .map_err(internal_error)?,
    };

    info!(week, cap = stored.weekly_cap, "week cap configured");

    Ok(Json(WeekConfig {
        week_number: stored.week_number,
        weekly_cap: stored.weekly_cap,
    }))
}

/// Bulk-register teams from an uploaded CSV
#[utoipa::path(
    post,
    path = "/api/teams/import",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, description = "File is not readable text", body = ErrorResponse),
        (status = 403, description = "Super admin only", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn bulk_register(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    body: Bytes,
) -> Result<Json<ImportReport>, ApiError> {
    require_super_admin(&state, &auth).await?;

    let outcome = import_table(&state.db, state.assigner.as_ref(), &body)
        .await
        .map_err(engine_error)?;

    Ok(Json(ImportReport {
        created: outcome.created,
        errors: outcome
            .errors
            .into_iter()
            .map(|e| ImportRowError {
                row: e.row,
                message: e.message,
            })
            .collect(),
    }))
}

/// Export all teams with nested leaders and rosters
#[utoipa::path(
    get,
    path = "/api/teams/export",
    responses(
        (status = 200, description = "Export document", body = ExportDocument),
        (status = 403, description = "Super admin only", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn export_teams(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ExportDocument>, ApiError> {
    require_super_admin(&state, &auth).await?;

    let rows = team::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(team::Column::Id)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    let mut teams = Vec::with_capacity(rows.len());

    for (t, leader_row) in rows {
        // Absent optional profile fields export as empty strings
        let leader = leader_row
            .map(|u| ExportLeader {
                name: u.name,
                email: u.email,
                phone: u.phone.unwrap_or_default(),
                academic_year: u.academic_year.unwrap_or_default(),
                department: u.department.unwrap_or_default(),
            })
            .unwrap_or_else(|| ExportLeader {
                name: String::new(),
                email: String::new(),
                phone: String::new(),
                academic_year: String::new(),
                department: String::new(),
            });

        let members = team_member::Entity::find()
            .filter(team_member::Column::TeamId.eq(t.id))
            .order_by_asc(team_member::Column::Id)
            .all(&state.db)
            .await
            .map_err(internal_error)?
            .into_iter()
            .map(|m| Member {
                name: m.name,
                email: m.email,
                academic_year: m.academic_year,
                department: m.department,
            })
            .collect();

        teams.push(ExportTeam {
            id: t.id,
            team_name: t.team_name,
            leader,
            coordinator_id: t.coordinator_id,
            total_points: t.total_points,
            weekly_points: t.weekly_points,
            week_number: t.week_number,
            weekly_cap_reached: t.weekly_cap_reached,
            is_disqualified: t.is_disqualified,
            members,
        })
    }

    Ok(Json(ExportDocument {
        export_date: Utc::now(),
        total_teams: teams.len(),
        teams,
    }))
}
