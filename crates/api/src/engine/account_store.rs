//! Outbound seam to the platform account store.
//!
//! The engine never mutates accounts directly; remediation goes through
//! this trait so a deployment where accounts live in a remote service
//! can swap the implementation without touching the gate or workflow.

use async_trait::async_trait;
use devicegate_core::types::DbId;
use devicegate_db::repositories::{SessionRepo, UserRepo};
use devicegate_db::DbPool;

/// Failure talking to the account store.
#[derive(Debug, thiserror::Error)]
pub enum AccountStoreError {
    #[error("account store query failed: {0}")]
    Store(#[from] sqlx::Error),
}

/// Read/write access to account blocking state.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Whether remediation has blocked this account. Unknown accounts
    /// are reported as not blocked; the gate's binding check still
    /// stands between them and the content.
    async fn is_blocked(&self, account_id: DbId) -> Result<bool, AccountStoreError>;

    /// Lock the account so it can no longer authenticate. Idempotent.
    async fn lock_account(&self, account_id: DbId) -> Result<(), AccountStoreError>;
}

/// Account store backed by the platform's own `users` table.
pub struct DbAccountStore {
    pool: DbPool,
}

impl DbAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for DbAccountStore {
    async fn is_blocked(&self, account_id: DbId) -> Result<bool, AccountStoreError> {
        let user = UserRepo::find_by_id(&self.pool, account_id).await?;
        Ok(user.is_some_and(|u| !u.is_active))
    }

    async fn lock_account(&self, account_id: DbId) -> Result<(), AccountStoreError> {
        let changed = UserRepo::deactivate(&self.pool, account_id).await?;
        // Locking also ends live logins; an access token may stay valid
        // until expiry, but the gate denies blocked accounts regardless.
        let revoked = SessionRepo::revoke_all_for_user(&self.pool, account_id).await?;
        tracing::info!(account_id, changed, revoked, "Account locked");
        Ok(())
    }
}
