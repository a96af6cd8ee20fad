//! Route definitions for the admin violation workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::violations;
use crate::state::AppState;

/// Violation routes mounted at `/admin/violations`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /               -> list_violations
/// GET  /stats          -> violation_stats
/// POST /{id}/review    -> review_violation
/// POST /{id}/act       -> act_on_violation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(violations::list_violations))
        .route("/stats", get(violations::violation_stats))
        .route("/{id}/review", post(violations::review_violation))
        .route("/{id}/act", post(violations::act_on_violation))
}
