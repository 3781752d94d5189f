//! Consolidated initial schema migration

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create users table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(integer(User::Id).primary_key().auto_increment())
                    .col(string_len(User::Name, 255).not_null())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(string_len(User::Role, 32).not_null().default("team"))
                    .col(string_len_null(User::Phone, 64))
                    .col(string_len_null(User::AcademicYear, 64))
                    .col(string_len_null(User::Department, 255))
                    .col(boolean(User::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role")
                    .table(User::Table)
                    .col(User::Role)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create teams table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Team::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(Team::TeamName).string_len(255).not_null())
                    .col(ColumnDef::new(Team::LeaderId).integer().not_null())
                    .col(ColumnDef::new(Team::CoordinatorId).integer().null())
                    .col(integer(Team::TotalPoints).not_null().default(0))
                    .col(integer(Team::WeeklyPoints).not_null().default(0))
                    .col(integer(Team::WeekNumber).not_null().default(1))
                    .col(boolean(Team::WeeklyCapReached).not_null().default(false))
                    .col(boolean(Team::IsDisqualified).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Team::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_leader_id")
                            .from(Team::Table, Team::LeaderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_coordinator_id")
                            .from(Team::Table, Team::CoordinatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_leader_id")
                    .table(Team::Table)
                    .col(Team::LeaderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_coordinator_id")
                    .table(Team::Table)
                    .col(Team::CoordinatorId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create team_members table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(TeamMember::Table)
                    .if_not_exists()
                    .col(integer(TeamMember::Id).primary_key().auto_increment())
                    .col(integer(TeamMember::TeamId).not_null())
                    .col(string_len(TeamMember::Name, 255).not_null())
                    .col(string_len(TeamMember::Email, 255).not_null())
                    .col(
                        string_len(TeamMember::AcademicYear, 64)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        string_len(TeamMember::Department, 255)
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team_id")
                            .from(TeamMember::Table, TeamMember::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_team_id")
                    .table(TeamMember::Table)
                    .col(TeamMember::TeamId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Create point_adjustments table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(PointAdjustment::Table)
                    .if_not_exists()
                    .col(integer(PointAdjustment::Id).primary_key().auto_increment())
                    .col(integer(PointAdjustment::TeamId).not_null())
                    .col(integer(PointAdjustment::PointsChanged).not_null())
                    .col(text(PointAdjustment::Reason).not_null())
                    .col(integer(PointAdjustment::AdjustedBy).not_null())
                    .col(integer(PointAdjustment::WeekNumber).not_null())
                    .col(string_len_null(PointAdjustment::ProofUrl, 1024))
                    .col(
                        timestamp_with_time_zone(PointAdjustment::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_adjustments_team_id")
                            .from(PointAdjustment::Table, PointAdjustment::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_adjustments_adjusted_by")
                            .from(PointAdjustment::Table, PointAdjustment::AdjustedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_point_adjustments_team_id")
                    .table(PointAdjustment::Table)
                    .col(PointAdjustment::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_point_adjustments_created_at")
                    .table(PointAdjustment::Table)
                    .col(PointAdjustment::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Create week_configs table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(WeekConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WeekConfig::WeekNumber)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(integer(WeekConfig::WeeklyCap).not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(WeekConfig::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PointAdjustment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TeamMember::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    Phone,
    AcademicYear,
    Department,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    TeamName,
    LeaderId,
    CoordinatorId,
    TotalPoints,
    WeeklyPoints,
    WeekNumber,
    WeeklyCapReached,
    IsDisqualified,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TeamMember {
    #[sea_orm(iden = "team_members")]
    Table,
    Id,
    TeamId,
    Name,
    Email,
    AcademicYear,
    Department,
}

#[derive(DeriveIden)]
enum PointAdjustment {
    #[sea_orm(iden = "point_adjustments")]
    Table,
    Id,
    TeamId,
    PointsChanged,
    Reason,
    AdjustedBy,
    WeekNumber,
    ProofUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum WeekConfig {
    #[sea_orm(iden = "week_configs")]
    Table,
    WeekNumber,
    WeeklyCap,
}
