//! User entity: master admins, coordinators, and team leaders

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role a user holds on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum UserRole {
    /// Game master with full administrative access
    #[sea_orm(string_value = "master")]
    Master,

    /// Coordinator assigned to a subset of teams
    #[sea_orm(string_value = "coordinator")]
    Coordinator,

    /// Team leader account (one per team)
    #[sea_orm(string_value = "team")]
    Team,
}

impl UserRole {
    /// Stable string form, matching the stored column value
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Master => "master",
            UserRole::Coordinator => "coordinator",
            UserRole::Team => "team",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User ID (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Full name
    pub name: String,

    /// Email (unique, case-sensitive as stored)
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// User role (master, coordinator, team)
    pub role: UserRole,

    /// Contact phone (optional profile metadata)
    pub phone: Option<String>,

    /// Academic year (optional profile metadata)
    pub academic_year: Option<String>,

    /// Department (optional profile metadata)
    pub department: Option<String>,

    /// Whether the account is active
    pub is_active: bool,

    /// When the account was created
    pub created_at: ChronoDateTimeUtc,

    /// When the profile was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Teams led by this user
    #[sea_orm(has_many = "super::team::Entity")]
    LedTeams,

    /// Point adjustments issued by this user
    #[sea_orm(has_many = "super::point_adjustment::Entity")]
    Adjustments,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedTeams.def()
    }
}

impl Related<super::point_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
