pub mod auth;
pub mod devices;
pub mod health;
pub mod violations;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                       login (public)
/// /auth/refresh                     refresh (public)
/// /auth/logout                      logout (requires auth)
///
/// /devices/register                 bind this device to content (POST)
/// /devices/status                   access gate check (GET)
/// /devices/mine                     caller's bindings (GET)
///
/// /admin/violations                 list with filters (admin only)
/// /admin/violations/stats           count-by-status (admin only)
/// /admin/violations/{id}/review     pending -> reviewed (POST)
/// /admin/violations/{id}/act        block_users | dismiss (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/devices", devices::router())
        .nest("/admin/violations", violations::router())
}
