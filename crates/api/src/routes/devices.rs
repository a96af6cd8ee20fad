//! Route definitions for device registration and gate checks.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::devices;
use crate::state::AppState;

/// Device routes mounted at `/devices`. All require authentication
/// (enforced by handler extractors).
///
/// ```text
/// POST /register   -> register_device
/// GET  /status     -> check_device_status
/// GET  /mine       -> list_my_devices
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(devices::register_device))
        .route("/status", get(devices::check_device_status))
        .route("/mine", get(devices::list_my_devices))
}
