//! Team entity: the competing unit with its running point totals
//!
//! Team IDs are allocated explicitly by the engine (floor 101, max+1), so the
//! primary key is not auto-incremented.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    /// Team ID (primary key, allocated by the engine, always >= 101)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    /// Display name
    pub team_name: String,

    /// Leader user ID (exclusive 1:1 ownership)
    pub leader_id: i32,

    /// Coordinator user ID, assigned after creation
    pub coordinator_id: Option<i32>,

    /// Running total across all weeks
    pub total_points: i32,

    /// Points accrued in the current week (reset externally at week rollover)
    pub weekly_points: i32,

    /// Current week number
    pub week_number: i32,

    /// Sticky flag set once the weekly cap clamps an adjustment
    pub weekly_cap_reached: bool,

    /// Whether the team has been disqualified
    pub is_disqualified: bool,

    /// When the team was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Team is led by a user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LeaderId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Leader,

    /// Team has roster members
    #[sea_orm(has_many = "super::team_member::Entity")]
    Members,

    /// Team has ledger entries
    #[sea_orm(has_many = "super::point_adjustment::Entity")]
    Adjustments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leader.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::point_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
