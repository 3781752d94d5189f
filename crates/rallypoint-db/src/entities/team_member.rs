//! TeamMember entity: roster entries owned by a team
//!
//! Members are plain roster rows, not login identities. Optional academic
//! metadata defaults to the empty string rather than NULL so exports never
//! have to special-case missing profile fields.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team_members")]
pub struct Model {
    /// Member row ID (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning team ID
    pub team_id: i32,

    /// Member name
    pub name: String,

    /// Member email
    pub email: String,

    /// Academic year (empty string when not provided)
    pub academic_year: String,

    /// Department (empty string when not provided)
    pub department: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Member belongs to exactly one team, removed with it
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
