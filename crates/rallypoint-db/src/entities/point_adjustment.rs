//! PointAdjustment entity: immutable ledger of applied point deltas
//!
//! Rows are append-only. `points_changed` always records the delta actually
//! applied after weekly-cap clamping, never the requested amount.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_adjustments")]
pub struct Model {
    /// Ledger entry ID (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Team the adjustment applies to
    pub team_id: i32,

    /// Signed delta actually applied (post-clamping)
    pub points_changed: i32,

    /// Free-text reason, required and non-empty
    pub reason: String,

    /// User ID of the adjusting actor
    pub adjusted_by: i32,

    /// Team's week number at the time of adjustment
    pub week_number: i32,

    /// Optional proof URL supporting the adjustment
    pub proof_url: Option<String>,

    /// When the adjustment was recorded
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Adjustment belongs to a team
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,

    /// Adjustment was issued by a user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AdjustedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Actor,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
