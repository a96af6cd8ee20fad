//! Repository for the `device_bindings` table (the device registry).
//!
//! `register` is the single concurrency-critical write of the engine:
//! it serializes on the `uq_device_bindings_triple` constraint so that
//! N concurrent registrations of the same triple materialize exactly
//! one row. Contention on different triples does not interact.

use devicegate_core::types::DbId;
use sqlx::PgPool;

use crate::models::device_binding::{DeviceBinding, RegisterBinding};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, device_id, account_id, content_id, is_active, last_ip, \
                        registered_at, last_activity_at";

/// Provides registry operations for device bindings.
pub struct DeviceBindingRepo;

impl DeviceBindingRepo {
    /// Atomically create or reactivate the binding for a triple.
    ///
    /// Idempotent: re-registering an existing triple reactivates the row
    /// (if remediation had disabled it), refreshes `last_activity_at`,
    /// records the latest observed address, and returns the same row id.
    pub async fn register(
        pool: &PgPool,
        input: &RegisterBinding,
    ) -> Result<DeviceBinding, sqlx::Error> {
        let query = format!(
            "INSERT INTO device_bindings (device_id, content_id, account_id, last_ip)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_device_bindings_triple
             DO UPDATE SET
                is_active = TRUE,
                last_activity_at = NOW(),
                last_ip = COALESCE(EXCLUDED.last_ip, device_bindings.last_ip)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeviceBinding>(&query)
            .bind(&input.device_id)
            .bind(input.content_id)
            .bind(input.account_id)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Find the active binding for a triple, if one exists.
    pub async fn find_active(
        pool: &PgPool,
        device_id: &str,
        content_id: DbId,
        account_id: DbId,
    ) -> Result<Option<DeviceBinding>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM device_bindings
             WHERE device_id = $1 AND content_id = $2 AND account_id = $3
               AND is_active = TRUE"
        );
        sqlx::query_as::<_, DeviceBinding>(&query)
            .bind(device_id)
            .bind(content_id)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a binding by id regardless of active state.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DeviceBinding>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM device_bindings WHERE id = $1");
        sqlx::query_as::<_, DeviceBinding>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All bindings held by an account, most recently used first.
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<DeviceBinding>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM device_bindings
             WHERE account_id = $1
             ORDER BY last_activity_at DESC"
        );
        sqlx::query_as::<_, DeviceBinding>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Refresh `last_activity_at` on an active binding.
    ///
    /// Returns `true` if the row was updated. Callers treat this as
    /// best-effort; the access gate runs it off the request path.
    pub async fn touch_activity(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE device_bindings SET last_activity_at = NOW()
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deactivate every active binding of an account. Returns the count
    /// of deactivated rows. Used by the block-users remediation action;
    /// idempotent, since already-inactive rows are not touched.
    pub async fn deactivate_all_for_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE device_bindings SET is_active = FALSE
             WHERE account_id = $1 AND is_active = TRUE",
        )
        .bind(account_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Distinct accounts with an active binding on this device, across
    /// all content. Sorted ascending so callers get a canonical set.
    pub async fn distinct_active_accounts(
        pool: &PgPool,
        device_id: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT account_id FROM device_bindings
             WHERE device_id = $1 AND is_active = TRUE
             ORDER BY account_id",
        )
        .bind(device_id)
        .fetch_all(pool)
        .await
    }

    /// Distinct content with an active binding on this device.
    pub async fn distinct_active_contents(
        pool: &PgPool,
        device_id: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT content_id FROM device_bindings
             WHERE device_id = $1 AND is_active = TRUE
             ORDER BY content_id",
        )
        .bind(device_id)
        .fetch_all(pool)
        .await
    }

    /// Distinct source addresses seen on this device's active bindings
    /// within the last `window_mins` minutes.
    pub async fn distinct_recent_ips(
        pool: &PgPool,
        device_id: &str,
        window_mins: i64,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT last_ip FROM device_bindings
             WHERE device_id = $1 AND is_active = TRUE
               AND last_ip IS NOT NULL
               AND last_activity_at > NOW() - ($2::int * INTERVAL '1 minute')",
        )
        .bind(device_id)
        .bind(window_mins)
        .fetch_all(pool)
        .await
    }
}
