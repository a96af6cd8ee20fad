//! Device binding model and DTOs.

use devicegate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One (device, content, account) grant from the `device_bindings` table.
///
/// At most one row exists per triple; `is_active = false` means the
/// grant was disabled by remediation and no longer satisfies the access
/// gate. Rows are kept forever for audit.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceBinding {
    pub id: DbId,
    pub device_id: String,
    pub account_id: DbId,
    pub content_id: DbId,
    pub is_active: bool,
    pub last_ip: Option<String>,
    pub registered_at: Timestamp,
    pub last_activity_at: Timestamp,
}

/// DTO for the atomic register (insert-or-reactivate) operation.
pub struct RegisterBinding {
    pub device_id: String,
    pub account_id: DbId,
    pub content_id: DbId,
    /// Network address observed on the registering request, if known.
    pub ip_address: Option<String>,
}
