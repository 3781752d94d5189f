//! Points ledger: cap-clamped adjustments with an immutable audit trail

use chrono::Utc;
use rallypoint_db::entities::{point_adjustment, team, week_config};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, Set, TransactionTrait};

use crate::error::EngineError;

/// Weekly cap applied when no week_config row exists for the team's week
pub const DEFAULT_WEEKLY_CAP: i32 = 30;

/// Result of a point adjustment, reporting what was actually credited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustOutcome {
    /// Delta applied after cap clamping (what the ledger records)
    pub applied_delta: i32,
    /// Team total after the adjustment
    pub new_total: i32,
    /// Team weekly points after the adjustment
    pub new_weekly: i32,
}

/// Apply a signed point delta to a team under the weekly cap.
///
/// Positive deltas are clamped to the remaining weekly headroom; once the cap
/// is hit the `weekly_cap_reached` flag is set and stays set. It is never
/// cleared here, not even by negative deltas; reset is owned by external game
/// control. Negative and zero deltas pass through unmodified and never touch
/// the flag.
///
/// The team mutation and the ledger row commit atomically. The ledger row
/// records the applied delta, never the requested one, so callers cannot be
/// misled about how much was credited.
#[tracing::instrument(skip(db, reason, proof_url))]
pub async fn adjust_points(
    db: &DatabaseConnection,
    team_id: i32,
    requested_delta: i32,
    reason: &str,
    proof_url: Option<String>,
    actor_id: i32,
) -> Result<AdjustOutcome, EngineError> {
    if reason.trim().is_empty() {
        return Err(EngineError::InvalidInput(
            "reason is required for a point adjustment".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let team = team::Entity::find_by_id(team_id)
        .one(&txn)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("team {} not found", team_id)))?;

    let cap = week_config::Entity::find_by_id(team.week_number)
        .one(&txn)
        .await?
        .map(|c| c.weekly_cap)
        .unwrap_or(DEFAULT_WEEKLY_CAP);

    let mut cap_reached = team.weekly_cap_reached;
    let applied = if requested_delta > 0 {
        let remaining = cap.saturating_sub(team.weekly_points);
        if remaining <= 0 {
            cap_reached = true;
            0
        } else if requested_delta > remaining {
            cap_reached = true;
            remaining
        } else {
            requested_delta
        }
    } else {
        requested_delta
    };

    let overflow = || {
        EngineError::InvalidInput("point adjustment would overflow the team counters".to_string())
    };
    let new_weekly = team.weekly_points.checked_add(applied).ok_or_else(overflow)?;
    let new_total = team.total_points.checked_add(applied).ok_or_else(overflow)?;
    let week_number = team.week_number;

    let mut active: team::ActiveModel = team.into();
    active.weekly_points = Set(new_weekly);
    active.total_points = Set(new_total);
    active.weekly_cap_reached = Set(cap_reached);
    active.update(&txn).await?;

    point_adjustment::ActiveModel {
        id: NotSet,
        team_id: Set(team_id),
        points_changed: Set(applied),
        reason: Set(reason.to_string()),
        adjusted_by: Set(actor_id),
        week_number: Set(week_number),
        proof_url: Set(proof_url),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        team_id,
        requested_delta,
        applied_delta = applied,
        new_total,
        new_weekly,
        "points adjusted"
    );

    Ok(AdjustOutcome {
        applied_delta: applied,
        new_total,
        new_weekly,
    })
}
