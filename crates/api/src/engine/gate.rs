//! The access gate: per-request check consulted before the hosting
//! application serves protected content.
//!
//! Read-only apart from the activity timestamp, which is refreshed on a
//! spawned task so it can never block or fail the request. The gate
//! never creates bindings or violations -- registration is a separate,
//! explicit act.
//!
//! Failure policy: if the store is unreachable the gate fails OPEN
//! (allows and logs) rather than locking out legitimate users on an
//! infrastructure blip.

use devicegate_core::access::{AccessDecision, DenialReason};
use devicegate_core::types::DbId;
use devicegate_db::repositories::DeviceBindingRepo;

use crate::state::AppState;

/// Decide whether `account_id` may access `content_id` from the device
/// identified by `device_id`.
pub async fn check_access(
    state: &AppState,
    device_id: &str,
    content_id: DbId,
    account_id: DbId,
) -> AccessDecision {
    // Blocked accounts are denied regardless of binding state.
    match state.account_store.is_blocked(account_id).await {
        Ok(true) => return AccessDecision::Denied(DenialReason::AccountBlocked),
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(error = %e, account_id, "Blocked-account check failed, failing open");
        }
    }

    match DeviceBindingRepo::find_active(&state.pool, device_id, content_id, account_id).await {
        Ok(Some(binding)) => {
            // Best-effort activity touch, off the request path.
            let pool = state.pool.clone();
            let binding_id = binding.id;
            tokio::spawn(async move {
                if let Err(e) = DeviceBindingRepo::touch_activity(&pool, binding_id).await {
                    tracing::debug!(error = %e, binding_id, "Activity touch failed");
                }
            });
            AccessDecision::Allowed
        }
        Ok(None) => AccessDecision::Denied(DenialReason::DeviceNotRegistered),
        Err(e) => {
            tracing::warn!(
                error = %e,
                device_id,
                content_id,
                account_id,
                "Binding lookup failed, failing open",
            );
            AccessDecision::Allowed
        }
    }
}
