use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::account_store::AccountStore;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: devicegate_db::DbPool,
    /// Server configuration (fingerprint headers, severity policy, JWT).
    pub config: Arc<ServerConfig>,
    /// Outbound seam to the platform account store (blocking / lockout).
    pub account_store: Arc<dyn AccountStore>,
}
