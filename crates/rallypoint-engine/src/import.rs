//! Bulk team import from spreadsheet CSV exports
//!
//! Fixed column layout (mirrors the registration sheet):
//!
//! | col | field |
//! |-----|-------|
//! | 0   | team name (blank = spacer row, skipped) |
//! | 1   | reserved |
//! | 2-6 | leader name, email, phone, year, department |
//! | 7+  | up to four member blocks of (name, email, year, department) |
//!
//! Each data row is provisioned in its own transaction, so one malformed row
//! never aborts the batch. Row numbers in the error list are 1-based over
//! data rows, with the header excluded.

use csv::ReaderBuilder;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::coordinator::CoordinatorAssigner;
use crate::error::EngineError;
use crate::provisioner::{provision_team, MemberDraft, TeamDraft};

/// Bootstrap password for leaders created through bulk import.
///
/// Deliberately weak: operators are expected to rotate it before teams log
/// in. Every import logs a warning so this is never silently accepted.
pub const DEFAULT_IMPORT_PASSWORD: &str = "123456";

/// Start columns of the four fixed-width member blocks
const MEMBER_BLOCK_STARTS: [usize; 4] = [7, 11, 15, 19];

/// Minimum columns for a data row (team name through leader department)
const MIN_ROW_WIDTH: usize = 7;

/// One failed data row, identified by its 1-based position
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Result of a bulk import: created count plus ordered per-row errors
#[derive(Debug, Clone, Serialize, Default)]
pub struct ImportOutcome {
    pub created: usize,
    pub errors: Vec<RowError>,
}

/// Decode raw import bytes into text.
///
/// Accepts UTF-8 (with or without a byte-order marker) and falls back to
/// Latin-1, matching what spreadsheet tools actually produce. An embedded NUL
/// anywhere means the file is a renamed binary (typically an .xlsx) and the
/// whole import is rejected before any row is processed.
pub fn decode_table(bytes: &[u8]) -> Result<String, EngineError> {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        // Latin-1 maps each byte to the same code point, so this cannot fail
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };

    if text.contains('\0') {
        return Err(EngineError::Encoding(
            "file contains NUL bytes; it looks like a spreadsheet renamed to .csv".to_string(),
        ));
    }

    Ok(text)
}

/// Parse one data row into a provisioning draft.
///
/// Returns `Ok(None)` for spacer rows (blank first column). Short rows are a
/// parse error for that row rather than an index panic that would take down
/// the batch.
fn parse_row(record: &csv::StringRecord) -> Result<Option<TeamDraft>, String> {
    let team_name = record.get(0).unwrap_or("").trim();
    if team_name.is_empty() {
        return Ok(None);
    }

    if record.len() < MIN_ROW_WIDTH {
        return Err(format!(
            "row has {} columns, expected at least {}",
            record.len(),
            MIN_ROW_WIDTH
        ));
    }

    let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();

    let optional = |i: usize| {
        let v = field(i);
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    };

    let mut members = Vec::new();
    for start in MEMBER_BLOCK_STARTS {
        let name = field(start);
        let email = field(start + 1);
        // Partially filled blocks are dropped without error
        if name.is_empty() || email.is_empty() {
            continue;
        }
        members.push(MemberDraft {
            name,
            email,
            academic_year: field(start + 2),
            department: field(start + 3),
        });
    }

    Ok(Some(TeamDraft {
        team_name: team_name.to_string(),
        leader_name: field(2),
        leader_email: field(3),
        leader_password: DEFAULT_IMPORT_PASSWORD.to_string(),
        leader_phone: optional(4),
        leader_academic_year: optional(5),
        leader_department: optional(6),
        members,
    }))
}

/// Provision teams in bulk from a CSV export.
///
/// The header row is discarded. Every data row runs through the provisioner
/// in its own transaction; duplicate leader emails and any other per-row
/// failure are collected into the outcome while the batch continues. Only a
/// file-level problem (unreadable encoding, embedded NULs) fails the whole
/// call.
#[tracing::instrument(skip_all)]
pub async fn import_table(
    db: &DatabaseConnection,
    assigner: &dyn CoordinatorAssigner,
    bytes: &[u8],
) -> Result<ImportOutcome, EngineError> {
    let text = decode_table(bytes)?;

    tracing::warn!(
        "bulk-imported leaders receive the fixed bootstrap password; rotate it before go-live"
    );

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut outcome = ImportOutcome::default();

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1; // 1-based over data rows, header excluded

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                outcome.errors.push(RowError {
                    row,
                    message: format!("CSV parse error: {}", e),
                });
                continue;
            }
        };

        let draft = match parse_row(&record) {
            Ok(Some(d)) => d,
            Ok(None) => continue, // spacer row
            Err(message) => {
                outcome.errors.push(RowError { row, message });
                continue;
            }
        };

        match provision_team(db, assigner, draft).await {
            Ok(team_id) => {
                tracing::debug!(row, team_id, "imported team");
                outcome.created += 1;
            }
            Err(e) => {
                tracing::debug!(row, error = %e, "import row failed");
                outcome.errors.push(RowError {
                    row,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        created = outcome.created,
        failed = outcome.errors.len(),
        "bulk import finished"
    );

    Ok(outcome)
}
