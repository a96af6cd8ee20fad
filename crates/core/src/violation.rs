//! Violation taxonomy, severity policy, and workflow state machine.
//!
//! Pure domain logic for the sharing detector and the admin workflow.
//! No database access -- the repository layer persists what these
//! functions decide.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Violation type constants
// ---------------------------------------------------------------------------

pub const VIOLATION_TYPE_MULTIPLE_ACCOUNTS: &str = "multiple_accounts";
pub const VIOLATION_TYPE_SUSPICIOUS_ACTIVITY: &str = "suspicious_activity";
pub const VIOLATION_TYPE_ACCOUNT_SHARING: &str = "account_sharing";
pub const VALID_VIOLATION_TYPES: &[&str] = &[
    VIOLATION_TYPE_MULTIPLE_ACCOUNTS,
    VIOLATION_TYPE_SUSPICIOUS_ACTIVITY,
    VIOLATION_TYPE_ACCOUNT_SHARING,
];

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_REVIEWED: &str = "reviewed";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_DISMISSED: &str = "dismissed";
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_REVIEWED,
    STATUS_RESOLVED,
    STATUS_DISMISSED,
];

/// Statuses in which a violation is still open for detector merges and
/// operator actions. Must match the partial unique index predicate on
/// the `violations` table.
pub const OPEN_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_REVIEWED];

/// Whether a violation in `status` can still be merged into or acted on.
pub fn is_open(status: &str) -> bool {
    OPEN_STATUSES.contains(&status)
}

/// Validate that `status` names a known workflow state.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Coarse ranking of how suspicious a violation is. Ordering follows
/// variant order, so `Severity::High > Severity::Low` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// The database / API string for this severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Parse a severity string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(CoreError::Validation(format!(
                "Invalid severity '{other}'. Must be one of: low, medium, high, critical"
            ))),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity policy
// ---------------------------------------------------------------------------

/// Tunable thresholds for severity scoring. The defaults encode the
/// shipped policy; deployments can override them from configuration.
#[derive(Debug, Clone)]
pub struct SeverityPolicy {
    /// Distinct accounts on one device at which a violation is critical.
    pub critical_account_threshold: usize,
    /// Distinct accounts at which multi-content sharing is high severity.
    pub high_account_threshold: usize,
    /// Window (minutes) within which distinct source addresses on the
    /// same device signal shared credentials rather than a shared
    /// household device.
    pub ip_window_mins: i64,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            critical_account_threshold: 5,
            high_account_threshold: 3,
            ip_window_mins: 30,
        }
    }
}

impl SeverityPolicy {
    /// Score a sharing observation.
    ///
    /// Total and deterministic for every input, and monotonic: growing
    /// `account_count` or `content_count`, or turning on
    /// `divergent_ips`, never lowers the result.
    pub fn score(&self, account_count: usize, content_count: usize, divergent_ips: bool) -> Severity {
        if account_count >= self.critical_account_threshold {
            return Severity::Critical;
        }
        if divergent_ips {
            return Severity::High;
        }
        if account_count >= self.high_account_threshold && content_count > 1 {
            return Severity::High;
        }
        if account_count >= self.high_account_threshold || content_count > 1 {
            return Severity::Medium;
        }
        Severity::Low
    }
}

// ---------------------------------------------------------------------------
// Operator actions
// ---------------------------------------------------------------------------

pub const ACTION_BLOCK_USERS: &str = "block_users";
pub const ACTION_DISMISS: &str = "dismiss";

/// An operator's terminal action on an open violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationAction {
    BlockUsers,
    Dismiss,
}

impl ViolationAction {
    /// The wire string for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationAction::BlockUsers => ACTION_BLOCK_USERS,
            ViolationAction::Dismiss => ACTION_DISMISS,
        }
    }

    /// Parse an action string from the admin API.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            ACTION_BLOCK_USERS => Ok(ViolationAction::BlockUsers),
            ACTION_DISMISS => Ok(ViolationAction::Dismiss),
            other => Err(CoreError::Validation(format!(
                "Invalid action '{other}'. Must be one of: {ACTION_BLOCK_USERS}, {ACTION_DISMISS}"
            ))),
        }
    }

    /// The terminal status this action moves the violation to.
    pub fn terminal_status(self) -> &'static str {
        match self {
            ViolationAction::BlockUsers => STATUS_RESOLVED,
            ViolationAction::Dismiss => STATUS_DISMISSED,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
