//! API data models with OpenAPI schema definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// User email address
    pub email: String,
    /// User password
    pub password: String,
}

/// Authenticated user as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// User ID
    pub id: i32,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role (master, coordinator, team)
    pub role: String,
}

/// User login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Logged in user
    pub user: User,
    /// Session token
    pub token: String,
    /// Token expiration timestamp
    pub expires_at: DateTime<Utc>,
}

/// Aggregate counts for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    /// Total registered teams
    pub total_teams: u64,
    /// Teams still in the running
    pub active_teams: u64,
    /// Disqualified teams
    pub disqualified_teams: u64,
    /// Total roster members across all teams
    pub total_members: u64,
    /// Registered coordinator accounts
    pub total_coordinators: u64,
    /// Sum of total points across active teams
    pub total_points: i64,
}

/// Team summary for list views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamSummary {
    /// Team ID
    pub id: i32,
    /// Team name
    pub team_name: String,
    /// Leader display name
    pub leader_name: String,
    /// Cumulative points
    pub total_points: i32,
    /// Points earned in the current week
    pub weekly_points: i32,
    /// Current week number
    pub week_number: i32,
    /// Whether the team has hit this week's cap
    pub weekly_cap_reached: bool,
    /// Whether the team is disqualified
    pub is_disqualified: bool,
}

/// Team list response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamList {
    pub teams: Vec<TeamSummary>,
    pub total: usize,
}

/// Roster member in a team detail view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Member {
    /// Member name
    pub name: String,
    /// Member email
    pub email: String,
    /// Academic year, empty when unknown
    pub academic_year: String,
    /// Department, empty when unknown
    pub department: String,
}

/// One entry in a team's adjustment history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustmentEntry {
    /// Applied delta (after cap clamping)
    pub points_changed: i32,
    /// Reason recorded with the adjustment
    pub reason: String,
    /// Week the adjustment was applied in
    pub week_number: i32,
    /// Optional proof link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    /// When the adjustment happened
    pub created_at: DateTime<Utc>,
}

/// Full team detail with roster and history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub summary: TeamSummary,
    /// Leader email
    pub leader_email: String,
    /// Assigned coordinator name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinator_name: Option<String>,
    /// Roster members
    pub members: Vec<Member>,
    /// Adjustment history, newest first
    pub adjustments: Vec<AdjustmentEntry>,
}

/// Member submitted on team creation
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MemberRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub department: String,
}

/// Team creation request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    /// Team name
    pub team_name: String,
    /// Leader display name
    pub leader_name: String,
    /// Leader email (becomes the login identity)
    pub leader_email: String,
    /// Leader password
    pub leader_password: String,
    /// Leader phone number
    #[serde(default)]
    pub leader_phone: Option<String>,
    /// Leader academic year
    #[serde(default)]
    pub leader_academic_year: Option<String>,
    /// Leader department
    #[serde(default)]
    pub leader_department: Option<String>,
    /// Roster members (incomplete entries are skipped)
    #[serde(default)]
    pub members: Vec<MemberRequest>,
}

/// Team creation response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamResponse {
    /// Allocated team ID
    pub team_id: i32,
}

/// Point adjustment request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustPointsRequest {
    /// Signed delta to apply; positive values are clamped to the weekly cap
    pub points: i32,
    /// Reason for the adjustment (required)
    pub reason: String,
    /// Optional proof link
    #[serde(default)]
    pub proof_url: Option<String>,
}

/// Point adjustment response, reporting what was actually credited
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustPointsResponse {
    /// Delta applied after cap clamping
    pub applied_delta: i32,
    /// Team total after the adjustment
    pub new_total: i32,
    /// Team weekly points after the adjustment
    pub new_weekly: i32,
}

/// Weekly cap configuration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeekConfigRequest {
    /// Maximum points a team can gain in this week
    pub weekly_cap: i32,
}

/// Weekly cap configuration as stored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeekConfig {
    pub week_number: i32,
    pub weekly_cap: i32,
}

/// Leader identity in an export document, optional fields as empty strings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportLeader {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub department: String,
}

/// One team with its nested leader and roster in an export document
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportTeam {
    pub id: i32,
    pub team_name: String,
    pub leader: ExportLeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinator_id: Option<i32>,
    pub total_points: i32,
    pub weekly_points: i32,
    pub week_number: i32,
    pub weekly_cap_reached: bool,
    pub is_disqualified: bool,
    pub members: Vec<Member>,
}

/// Full-platform export of teams, leaders, and rosters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportDocument {
    /// When the export was generated
    pub export_date: DateTime<Utc>,
    /// Number of teams in the document
    pub total_teams: usize,
    pub teams: Vec<ExportTeam>,
}

/// One failed row of a bulk import
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportRowError {
    /// 1-based data row number (header excluded)
    pub row: usize,
    /// What went wrong
    pub message: String,
}

/// Bulk import report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    /// Teams created
    pub created: usize,
    /// Per-row failures, in row order
    pub errors: Vec<ImportRowError>,
}
