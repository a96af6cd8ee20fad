//! Handlers for the `/devices` resource: registration, gate checks,
//! and the caller's own binding list.
//!
//! The fingerprint is derived server-side from request headers, never
//! taken from the client as an opaque value, so a caller cannot choose
//! its own device identity.

use axum::extract::{Query, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::Json;
use devicegate_core::fingerprint::{derive_device_id, DeviceAttributes};
use devicegate_core::types::DbId;
use devicegate_db::models::device_binding::{DeviceBinding, RegisterBinding};
use devicegate_db::repositories::DeviceBindingRepo;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::engine::detector::{self, DetectionOutcome};
use crate::engine::gate;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /devices/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub content_id: DbId,
}

/// Query parameters for `GET /devices/status`.
#[derive(Debug, Deserialize)]
pub struct DeviceStatusParams {
    pub content_id: DbId,
}

/// Gate decision payload. Denials are expected outcomes the client
/// branches on, so both cases are returned with 200.
#[derive(Debug, Serialize)]
pub struct DeviceStatusResponse {
    pub allowed: bool,
    /// `DEVICE_NOT_REGISTERED` or `ACCOUNT_BLOCKED` when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<&'static str>,
    /// Remediation text for the end user when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

// ---------------------------------------------------------------------------
// Fingerprint input assembly
// ---------------------------------------------------------------------------

/// Best-effort client address: first `X-Forwarded-For` hop, then
/// `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

/// Assemble the fingerprint inputs from request headers plus the
/// configured extra headers.
fn device_attributes(headers: &HeaderMap, config: &ServerConfig) -> DeviceAttributes {
    let ip = client_ip(headers).unwrap_or_default();
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let mut attrs = DeviceAttributes::new(ip, user_agent);
    for name in &config.fingerprint_headers {
        if let Some(value) = headers.get(name.as_str()).and_then(|v| v.to_str().ok()) {
            attrs = attrs.with_header(name, value);
        }
    }
    attrs
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/devices/register
///
/// Explicitly bind the requesting device to (account, content). Runs
/// the sharing detector after the binding is recorded; detection can
/// never fail the registration itself.
pub async fn register_device(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Json(input): Json<RegisterDeviceRequest>,
) -> AppResult<Json<DataResponse<DeviceBinding>>> {
    if input.content_id <= 0 {
        return Err(AppError::BadRequest("content_id must be positive".into()));
    }

    // A blocked account must not re-materialize active bindings.
    // Registration is state-mutating, so this check fails closed.
    let blocked = state
        .account_store
        .is_blocked(user.user_id)
        .await
        .map_err(|e| AppError::InternalError(format!("Account store unavailable: {e}")))?;
    if blocked {
        return Err(AppError::AccountBlocked(user.user_id));
    }

    let attrs = device_attributes(&headers, &state.config);
    let device_id = derive_device_id(&attrs);
    let ip_address = client_ip(&headers);

    let binding = DeviceBindingRepo::register(
        &state.pool,
        &RegisterBinding {
            device_id: device_id.clone(),
            account_id: user.user_id,
            content_id: input.content_id,
            ip_address,
        },
    )
    .await?;

    match detector::on_registration(
        &state.pool,
        &state.config.severity,
        &device_id,
        binding.last_ip.as_deref(),
    )
    .await
    {
        Ok(DetectionOutcome::NoViolation) => {}
        Ok(DetectionOutcome::ViolationRecorded(v)) => {
            tracing::debug!(violation_id = v.id, "Registration flagged for operator review");
        }
        Err(e) => {
            // The binding is already recorded; surface the failure to
            // operators through logs only.
            tracing::error!(error = %e, device_id = %device_id, "Sharing detection failed");
        }
    }

    Ok(Json(DataResponse { data: binding }))
}

/// GET /api/v1/devices/status?content_id=...
///
/// Ask the access gate whether this device/account pair may access the
/// content. Does not register anything.
pub async fn check_device_status(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Query(params): Query<DeviceStatusParams>,
) -> AppResult<Json<DataResponse<DeviceStatusResponse>>> {
    if params.content_id <= 0 {
        return Err(AppError::BadRequest("content_id must be positive".into()));
    }

    let attrs = device_attributes(&headers, &state.config);
    let device_id = derive_device_id(&attrs);

    let decision = gate::check_access(&state, &device_id, params.content_id, user.user_id).await;

    Ok(Json(DataResponse {
        data: DeviceStatusResponse {
            allowed: decision.is_allowed(),
            reason_code: decision.reason().map(|r| r.as_code()),
            message: decision.reason().map(|r| r.user_message()),
        },
    }))
}

/// GET /api/v1/devices/mine
///
/// List the caller's bindings (active and deactivated), most recently
/// used first.
pub async fn list_my_devices(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<DeviceBinding>>>> {
    let bindings = DeviceBindingRepo::list_for_account(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: bindings }))
}
