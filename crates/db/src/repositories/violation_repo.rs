//! Repository for the `violations` table (the violation store).
//!
//! The open-violation invariant (at most one row per device with
//! `status IN ('pending','reviewed')`) is enforced by the partial
//! unique index `uq_violations_open_device`; `upsert_open` targets it
//! so concurrent detections merge into one row. Status transitions are
//! conditional updates guarded on the open statuses, so a lost race
//! surfaces as "zero rows updated" rather than a double transition.

use devicegate_core::types::DbId;
use devicegate_core::violation::{
    ViolationAction, STATUS_PENDING, STATUS_REVIEWED, VIOLATION_TYPE_MULTIPLE_ACCOUNTS,
};
use sqlx::PgPool;

use crate::models::violation::{UpsertOpenViolation, Violation, ViolationFilter, ViolationStats};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, device_id, account_ids, content_ids, violation_type, severity, \
                        status, ip_address, resolution_action, resolution_note, resolved_by, \
                        resolved_at, created_at, updated_at";

/// Provides workflow operations for violations.
pub struct ViolationRepo;

impl ViolationRepo {
    /// Find a violation by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Violation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM violations WHERE id = $1");
        sqlx::query_as::<_, Violation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The device's open violation, if one exists.
    pub async fn find_open_by_device(
        pool: &PgPool,
        device_id: &str,
    ) -> Result<Option<Violation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM violations
             WHERE device_id = $1 AND status IN ('{STATUS_PENDING}', '{STATUS_REVIEWED}')"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(device_id)
            .fetch_optional(pool)
            .await
    }

    /// Merge-or-create the open violation for a device.
    ///
    /// Creates a `pending` row, or -- if an open row already exists --
    /// unions the id sets against the live row and keeps the higher of
    /// the two severities. Never downgrades severity and never touches
    /// terminal rows, which fall outside the partial index.
    pub async fn upsert_open(
        pool: &PgPool,
        input: &UpsertOpenViolation,
    ) -> Result<Violation, sqlx::Error> {
        let query = format!(
            "INSERT INTO violations (device_id, account_ids, content_ids, violation_type, severity, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (device_id) WHERE status IN ('{STATUS_PENDING}', '{STATUS_REVIEWED}')
             DO UPDATE SET
                account_ids = ARRAY(
                    SELECT DISTINCT a
                    FROM unnest(violations.account_ids || EXCLUDED.account_ids) AS a
                    ORDER BY a),
                content_ids = ARRAY(
                    SELECT DISTINCT c
                    FROM unnest(violations.content_ids || EXCLUDED.content_ids) AS c
                    ORDER BY c),
                severity = CASE
                    WHEN array_position(ARRAY['low','medium','high','critical'], EXCLUDED.severity)
                       > array_position(ARRAY['low','medium','high','critical'], violations.severity)
                    THEN EXCLUDED.severity
                    ELSE violations.severity
                END,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(&input.device_id)
            .bind(&input.account_ids)
            .bind(&input.content_ids)
            .bind(VIOLATION_TYPE_MULTIPLE_ACCOUNTS)
            .bind(input.severity.as_str())
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Move a `pending` violation to `reviewed`.
    ///
    /// Returns `None` if the violation is not currently `pending`.
    pub async fn mark_reviewed(pool: &PgPool, id: DbId) -> Result<Option<Violation>, sqlx::Error> {
        let query = format!(
            "UPDATE violations SET status = '{STATUS_REVIEWED}', updated_at = NOW()
             WHERE id = $1 AND status = '{STATUS_PENDING}'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Close an open violation with an operator action.
    ///
    /// Conditional on the row still being open; returns `None` when it
    /// was already terminal (or does not exist), so callers can report
    /// the double-action instead of silently succeeding.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        action: ViolationAction,
        note: Option<&str>,
        operator_id: DbId,
    ) -> Result<Option<Violation>, sqlx::Error> {
        let query = format!(
            "UPDATE violations SET
                status = $2,
                resolution_action = $3,
                resolution_note = $4,
                resolved_by = $5,
                resolved_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND status IN ('{STATUS_PENDING}', '{STATUS_REVIEWED}')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(id)
            .bind(action.terminal_status())
            .bind(action.as_str())
            .bind(note)
            .bind(operator_id)
            .fetch_optional(pool)
            .await
    }

    /// List violations, optionally filtered by status and/or severity,
    /// newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ViolationFilter,
    ) -> Result<Vec<Violation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM violations
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::text IS NULL OR severity = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(&filter.status)
            .bind(&filter.severity)
            .fetch_all(pool)
            .await
    }

    /// Count violations grouped by status.
    pub async fn count_by_status(pool: &PgPool) -> Result<ViolationStats, sqlx::Error> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM violations GROUP BY status")
                .fetch_all(pool)
                .await?;

        let mut stats = ViolationStats::default();
        for (status, count) in rows {
            stats.total += count;
            match status.as_str() {
                "pending" => stats.pending = count,
                "reviewed" => stats.reviewed = count,
                "resolved" => stats.resolved = count,
                "dismissed" => stats.dismissed = count,
                other => tracing::warn!(status = %other, "Unknown violation status in stats"),
            }
        }
        Ok(stats)
    }
}
