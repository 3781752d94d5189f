//! Team provisioning and points ledger engine
//!
//! The transactional core of the rallypoint platform:
//!
//! - [`allocator`]: sequential team ID allocation with a reserved floor
//! - [`ledger`]: point adjustments under a per-week cap, with an append-only
//!   audit trail
//! - [`provisioner`]: atomic creation of a leader identity, team, and roster,
//!   followed by best-effort coordinator assignment
//! - [`import`]: bulk CSV provisioning with per-row transaction isolation
//!
//! Every operation runs inside a single database transaction; the bulk import
//! runs one transaction per row so a bad row never disturbs its neighbours.

pub mod allocator;
pub mod coordinator;
pub mod error;
pub mod import;
pub mod ledger;
pub mod provisioner;

pub use allocator::{next_team_id, TEAM_ID_FLOOR};
pub use coordinator::{CoordinatorAssigner, NullAssigner};
pub use error::EngineError;
pub use import::{decode_table, import_table, ImportOutcome, RowError, DEFAULT_IMPORT_PASSWORD};
pub use ledger::{adjust_points, AdjustOutcome, DEFAULT_WEEKLY_CAP};
pub use provisioner::{provision_team, MemberDraft, TeamDraft};
