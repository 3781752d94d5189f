//! Coordinator assignment collaborator
//!
//! Assignment is an external service with its own failure domain. The
//! provisioner invokes it after its transaction commits and tolerates any
//! failure: a team without a coordinator is valid and gets one eventually.

use async_trait::async_trait;

/// Assigns a coordinator to a freshly provisioned team, best-effort.
#[async_trait]
pub trait CoordinatorAssigner: Send + Sync {
    async fn assign(&self, team_id: i32) -> anyhow::Result<()>;
}

/// Assigner that leaves teams unassigned.
///
/// Used when no assignment service is wired up; the coordinator reference
/// stays NULL until set administratively.
pub struct NullAssigner;

#[async_trait]
impl CoordinatorAssigner for NullAssigner {
    async fn assign(&self, team_id: i32) -> anyhow::Result<()> {
        tracing::debug!(team_id, "no assignment service configured; leaving team unassigned");
        Ok(())
    }
}
