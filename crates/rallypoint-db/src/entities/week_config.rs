//! WeekConfig entity: per-week weekly point cap override
//!
//! Absence of a row for a week means the ledger falls back to its default cap.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "week_configs")]
pub struct Model {
    /// Week number (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub week_number: i32,

    /// Maximum positive points a team may accrue in this week
    pub weekly_cap: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
