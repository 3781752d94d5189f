//! Team provisioner: leader identity + team + roster as one unit

use chrono::Utc;
use rallypoint_auth::hash_password;
use rallypoint_db::entities::{team, team_member, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    TransactionTrait,
};

use crate::allocator::next_team_id;
use crate::coordinator::CoordinatorAssigner;
use crate::error::EngineError;

/// Roster member as submitted for provisioning
#[derive(Debug, Clone, Default)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub academic_year: String,
    pub department: String,
}

/// Everything needed to provision one team
#[derive(Debug, Clone)]
pub struct TeamDraft {
    pub team_name: String,
    pub leader_name: String,
    pub leader_email: String,
    pub leader_password: String,
    pub leader_phone: Option<String>,
    pub leader_academic_year: Option<String>,
    pub leader_department: Option<String>,
    pub members: Vec<MemberDraft>,
}

/// Create a leader identity, team row, and member roster atomically.
///
/// Fails with Conflict (and no partial insert) when the leader email is
/// already registered. Members missing a name or email are skipped, not
/// rejected. After the transaction commits, the coordinator assignment
/// collaborator is invoked best-effort: its failure is logged and swallowed,
/// never propagated, since the team is already durable.
///
/// Returns the allocated team ID.
#[tracing::instrument(skip(db, assigner, draft), fields(team_name = %draft.team_name))]
pub async fn provision_team(
    db: &DatabaseConnection,
    assigner: &dyn CoordinatorAssigner,
    draft: TeamDraft,
) -> Result<i32, EngineError> {
    if draft.team_name.trim().is_empty()
        || draft.leader_name.trim().is_empty()
        || draft.leader_email.trim().is_empty()
        || draft.leader_password.is_empty()
    {
        return Err(EngineError::InvalidInput(
            "team_name, leader_name, leader_email, and leader_password are required".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(draft.leader_email.as_str()))
        .one(&txn)
        .await?;

    if existing.is_some() {
        return Err(EngineError::Conflict(format!(
            "email {} is already registered",
            draft.leader_email
        )));
    }

    let password_hash = hash_password(&draft.leader_password)?;

    let leader = user::ActiveModel {
        id: NotSet,
        name: Set(draft.leader_name.trim().to_string()),
        email: Set(draft.leader_email.trim().to_string()),
        password_hash: Set(password_hash),
        role: Set(user::UserRole::Team),
        phone: Set(draft.leader_phone.clone()),
        academic_year: Set(draft.leader_academic_year.clone()),
        department: Set(draft.leader_department.clone()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await
    .map_err(|e| EngineError::from_db(e, "leader email"))?;

    // ID must come from the same transaction as the insert below; see allocator
    let team_id = next_team_id(&txn).await?;

    team::ActiveModel {
        id: Set(team_id),
        team_name: Set(draft.team_name.trim().to_string()),
        leader_id: Set(leader.id),
        coordinator_id: Set(None),
        total_points: Set(0),
        weekly_points: Set(0),
        week_number: Set(1),
        weekly_cap_reached: Set(false),
        is_disqualified: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await
    .map_err(|e| EngineError::from_db(e, "team ID"))?;

    for member in &draft.members {
        let name = member.name.trim();
        let email = member.email.trim();
        if name.is_empty() || email.is_empty() {
            continue;
        }

        team_member::ActiveModel {
            id: NotSet,
            team_id: Set(team_id),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            academic_year: Set(member.academic_year.trim().to_string()),
            department: Set(member.department.trim().to_string()),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    tracing::info!(team_id, leader_id = leader.id, "team provisioned");

    // Best-effort: the team is already committed, so an assignment failure
    // must not be surfaced to the caller.
    if let Err(e) = assigner.assign(team_id).await {
        tracing::warn!(team_id, error = %e, "coordinator assignment failed; team left unassigned");
    }

    Ok(team_id)
}
