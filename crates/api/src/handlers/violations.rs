//! Handlers for the admin violation workflow.
//!
//! All endpoints require the `admin` role. The state machine is
//! `pending -> reviewed -> {resolved, dismissed}`, with `pending ->
//! dismissed`/`resolved` also accepted so operators are not forced
//! through the triage step. Terminal rows never transition again.

use axum::extract::{Path, Query, State};
use axum::Json;
use devicegate_core::error::CoreError;
use devicegate_core::types::DbId;
use devicegate_core::violation::{self, Severity, ViolationAction};
use devicegate_db::models::violation::{Violation, ViolationFilter, ViolationStats};
use devicegate_db::repositories::{DeviceBindingRepo, ViolationRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query parameter types
// ---------------------------------------------------------------------------

/// Query parameters for the violation list.
#[derive(Debug, Deserialize)]
pub struct ViolationListParams {
    pub status: Option<String>,
    pub severity: Option<String>,
}

/// Request body for `POST /admin/violations/{id}/act`.
#[derive(Debug, Deserialize)]
pub struct ActRequest {
    /// `block_users` or `dismiss`.
    pub action: String,
    /// Operator note recorded on the resolution.
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/violations?status=...&severity=...
///
/// List violations, newest first. Unknown filter values are rejected
/// up front so typos do not read as "no results".
pub async fn list_violations(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ViolationListParams>,
) -> AppResult<Json<DataResponse<Vec<Violation>>>> {
    if let Some(status) = &params.status {
        violation::validate_status(status)?;
    }
    if let Some(severity) = &params.severity {
        Severity::parse(severity)?;
    }

    let filter = ViolationFilter {
        status: params.status,
        severity: params.severity,
    };
    let violations = ViolationRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: violations }))
}

/// GET /api/v1/admin/violations/stats
///
/// Count-by-status rollup for the admin dashboard.
pub async fn violation_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<ViolationStats>>> {
    let stats = ViolationRepo::count_by_status(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// POST /api/v1/admin/violations/{id}/review
///
/// Move a pending violation to `reviewed`. Re-reviewing a reviewed
/// violation is a no-op success; terminal violations conflict.
pub async fn review_violation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Violation>>> {
    if let Some(updated) = ViolationRepo::mark_reviewed(&state.pool, id).await? {
        tracing::info!(violation_id = id, operator_id = admin.user_id, "Violation reviewed");
        return Ok(Json(DataResponse { data: updated }));
    }

    // Not pending: distinguish already-reviewed, terminal, and missing.
    let current = ViolationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Violation",
            id,
        }))?;

    if violation::is_open(&current.status) {
        Ok(Json(DataResponse { data: current }))
    } else {
        Err(AppError::Core(CoreError::AlreadyResolved { id }))
    }
}

/// POST /api/v1/admin/violations/{id}/act
///
/// Close an open violation. `block_users` deactivates every binding of
/// every involved account and locks the accounts; `dismiss` touches
/// nothing but the violation itself. Acting on a terminal violation
/// fails with `ALREADY_RESOLVED` and performs no side effects.
pub async fn act_on_violation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ActRequest>,
) -> AppResult<Json<DataResponse<Violation>>> {
    let action = ViolationAction::parse(&input.action)?;

    let current = ViolationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Violation",
            id,
        }))?;
    if !violation::is_open(&current.status) {
        return Err(AppError::Core(CoreError::AlreadyResolved { id }));
    }

    // Side effects run BEFORE the status flip: if any of them fail the
    // violation stays open and the operator retries. Both effects are
    // idempotent, so a retry (or a lost race against a concurrent
    // operator) cannot double-block anyone.
    if action == ViolationAction::BlockUsers {
        for &account_id in &current.account_ids {
            let deactivated =
                DeviceBindingRepo::deactivate_all_for_account(&state.pool, account_id).await?;
            state
                .account_store
                .lock_account(account_id)
                .await
                .map_err(|e| {
                    AppError::InternalError(format!("Account lock failed for {account_id}: {e}"))
                })?;
            tracing::info!(
                violation_id = id,
                account_id,
                deactivated,
                "Account blocked by remediation",
            );
        }
    }

    let updated = ViolationRepo::resolve(&state.pool, id, action, input.note.as_deref(), admin.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::AlreadyResolved { id }))?;

    tracing::info!(
        violation_id = id,
        action = action.as_str(),
        operator_id = admin.user_id,
        "Violation closed",
    );

    Ok(Json(DataResponse { data: updated }))
}
