//! The sharing detector, run synchronously on every registration.
//!
//! Detection is visibility, not prevention: the binding that triggered
//! it is already recorded, and the caller swallows detector errors so
//! registration itself never fails on account of scoring. The
//! merge-or-create write goes through the open-violation upsert, so
//! concurrent detections on one device converge on a single open row.

use std::collections::BTreeSet;

use devicegate_core::types::DbId;
use devicegate_core::violation::{Severity, SeverityPolicy};
use devicegate_db::models::violation::{UpsertOpenViolation, Violation};
use devicegate_db::repositories::{DeviceBindingRepo, ViolationRepo};
use devicegate_db::DbPool;

/// Result of running detection after a registration.
#[derive(Debug)]
pub enum DetectionOutcome {
    /// Only the requesting account is active on the device.
    NoViolation,
    /// A sharing condition exists; the device's open violation was
    /// created or updated.
    ViolationRecorded(Violation),
}

/// Inspect the registry state for `device_id` and materialize or update
/// its open violation if more than one account is active on it.
pub async fn on_registration(
    pool: &DbPool,
    policy: &SeverityPolicy,
    device_id: &str,
    ip_address: Option<&str>,
) -> Result<DetectionOutcome, sqlx::Error> {
    // Distinct accounts across ALL content on this device, including
    // the one that just registered.
    let accounts = DeviceBindingRepo::distinct_active_accounts(pool, device_id).await?;
    if accounts.len() < 2 {
        return Ok(DetectionOutcome::NoViolation);
    }

    let contents = DeviceBindingRepo::distinct_active_contents(pool, device_id).await?;
    let recent_ips =
        DeviceBindingRepo::distinct_recent_ips(pool, device_id, policy.ip_window_mins).await?;

    // Merge with the existing open violation so accounts that were
    // deactivated since detection stay on the record, and severity
    // never regresses. The upsert SQL repeats the union against the
    // live row, covering concurrent detections.
    let mut account_set: BTreeSet<DbId> = accounts.into_iter().collect();
    let mut content_set: BTreeSet<DbId> = contents.into_iter().collect();
    let mut severity_floor = Severity::Low;

    if let Some(open) = ViolationRepo::find_open_by_device(pool, device_id).await? {
        account_set.extend(open.account_ids.iter().copied());
        content_set.extend(open.content_ids.iter().copied());
        severity_floor = Severity::parse(&open.severity).unwrap_or(Severity::Low);
    }

    let scored = policy.score(account_set.len(), content_set.len(), recent_ips.len() > 1);
    let severity = scored.max(severity_floor);

    let violation = ViolationRepo::upsert_open(
        pool,
        &UpsertOpenViolation {
            device_id: device_id.to_string(),
            account_ids: account_set.into_iter().collect(),
            content_ids: content_set.into_iter().collect(),
            severity,
            ip_address: ip_address.map(str::to_string),
        },
    )
    .await?;

    tracing::info!(
        violation_id = violation.id,
        device_id,
        accounts = violation.account_ids.len(),
        contents = violation.content_ids.len(),
        severity = %violation.severity,
        "Sharing condition recorded",
    );

    Ok(DetectionOutcome::ViolationRecorded(violation))
}
