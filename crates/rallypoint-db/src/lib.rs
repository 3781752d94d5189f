//! Persistence layer for the rallypoint platform
//!
//! SeaORM entities and migrations for users, teams, team rosters, the
//! append-only point adjustment ledger, and per-week cap configuration.

pub mod entities;
pub mod migrator;

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

/// Connect to the database at the given URL (sqlite or postgres)
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(url).await
}

/// Run all pending migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
