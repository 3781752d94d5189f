//! Sequential team ID allocation

use rallypoint_db::entities::team;
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};

use crate::error::EngineError;

/// Lowest assignable team ID. IDs below this are reserved for pre-seeded
/// system teams and are never reassigned.
pub const TEAM_ID_FLOOR: i32 = 101;

/// Compute the next team ID: max existing ID + 1, never below the floor.
///
/// The sequence is dense and monotonically increasing; gaps left by deleted
/// teams are not refilled. Must be called on the same transaction as the
/// insert that consumes the ID, otherwise two concurrent provisioning calls
/// can read the same maximum and collide on the primary key.
pub async fn next_team_id<C: ConnectionTrait>(conn: &C) -> Result<i32, EngineError> {
    let last = team::Entity::find()
        .order_by_desc(team::Column::Id)
        .one(conn)
        .await?;

    Ok(match last {
        Some(t) if t.id >= TEAM_ID_FLOOR => t.id + 1,
        _ => TEAM_ID_FLOOR,
    })
}
