//! Violation model and DTOs.

use devicegate_core::types::{DbId, Timestamp};
use devicegate_core::violation::Severity;
use serde::Serialize;
use sqlx::FromRow;

/// A suspected sharing incident from the `violations` table.
///
/// `account_ids` / `content_ids` are kept distinct and sorted by the
/// upsert SQL. Resolution fields are populated exactly once, when an
/// operator closes the record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Violation {
    pub id: DbId,
    pub device_id: String,
    pub account_ids: Vec<DbId>,
    pub content_ids: Vec<DbId>,
    pub violation_type: String,
    pub severity: String,
    pub status: String,
    pub ip_address: Option<String>,
    pub resolution_action: Option<String>,
    pub resolution_note: Option<String>,
    pub resolved_by: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for the detector's merge-or-create upsert on a device's open
/// violation. The id sets are what the detector computed from the
/// registry; the SQL additionally unions them against any concurrently
/// updated open row.
pub struct UpsertOpenViolation {
    pub device_id: String,
    pub account_ids: Vec<DbId>,
    pub content_ids: Vec<DbId>,
    pub severity: Severity,
    pub ip_address: Option<String>,
}

/// Admin list filter. `None` fields match everything.
#[derive(Debug, Default)]
pub struct ViolationFilter {
    pub status: Option<String>,
    pub severity: Option<String>,
}

/// Count-by-status rollup for the admin dashboard.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ViolationStats {
    pub total: i64,
    pub pending: i64,
    pub reviewed: i64,
    pub resolved: i64,
    pub dismissed: i64,
}
