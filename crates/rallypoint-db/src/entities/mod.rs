//! Database entities

pub mod point_adjustment;
pub mod team;
pub mod team_member;
pub mod user;
pub mod week_config;

pub use point_adjustment::Entity as PointAdjustment;
pub use team::Entity as Team;
pub use team_member::Entity as TeamMember;
pub use user::Entity as User;
pub use week_config::Entity as WeekConfig;

pub mod prelude {
    pub use super::point_adjustment::Entity as PointAdjustment;
    pub use super::team::Entity as Team;
    pub use super::team_member::Entity as TeamMember;
    pub use super::user::Entity as User;
    pub use super::week_config::Entity as WeekConfig;
}
