//! Profile operations used by the HTTP layer: load, save, sync, watch.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::profile::{now_ms, UserProfile};
use crate::profile::feed::{ProfileSubscription, WatchedCache};
use crate::profile::locks::KeyedLocks;
use crate::profile::reconciler::{reconcile, save_profile, StoreSide, SyncAction};
use crate::profile::store::ProfileStore;

/// Owns both profile stores. Reconciliations and saves for one uid never overlap.
#[derive(Clone)]
pub struct ProfileService {
    local: Arc<WatchedCache>,
    remote: Arc<dyn ProfileStore>,
    locks: KeyedLocks,
}

impl ProfileService {
    pub fn new(local: Arc<dyn ProfileStore>, remote: Arc<dyn ProfileStore>) -> Self {
        Self {
            local: Arc::new(WatchedCache::new(local)),
            remote,
            locks: KeyedLocks::new(),
        }
    }

    /// Reconciles, then returns the cached profile, creating a blank one on
    /// first sight. A failed reconciliation is logged and the cache is served.
    pub async fn load(&self, uid: &str) -> Result<UserProfile, AppError> {
        validate_uid(uid)?;
        let _guard = self.locks.lock(uid).await;

        if let Err(e) = reconcile(self.local.as_ref(), self.remote.as_ref(), uid).await {
            warn!("Profile sync for {uid} failed, serving cached copy: {e}");
        }

        if let Some(profile) = self.local.get(uid).await? {
            return Ok(profile);
        }

        let blank = UserProfile::blank(uid, now_ms());
        match save_profile(self.local.as_ref(), self.remote.as_ref(), &blank).await {
            Ok(()) => info!("Created blank profile for {uid}"),
            Err(e) if e.side() == StoreSide::Remote => {
                warn!("Blank profile for {uid} cached but not stored remotely: {e}");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(blank)
    }

    /// Saves through the local cache first, then the remote store.
    pub async fn save(&self, profile: &UserProfile) -> Result<(), AppError> {
        validate_uid(&profile.uid)?;
        let _guard = self.locks.lock(&profile.uid).await;
        save_profile(self.local.as_ref(), self.remote.as_ref(), profile).await?;
        Ok(())
    }

    /// Runs one reconciliation for `uid`.
    pub async fn sync(&self, uid: &str) -> Result<SyncAction, AppError> {
        validate_uid(uid)?;
        let _guard = self.locks.lock(uid).await;
        Ok(reconcile(self.local.as_ref(), self.remote.as_ref(), uid).await?)
    }

    /// Live view of the local cache for `uid`.
    pub async fn watch(&self, uid: &str) -> Result<ProfileSubscription, AppError> {
        validate_uid(uid)?;
        Ok(self.local.subscribe(uid).await?)
    }
}

fn validate_uid(uid: &str) -> Result<(), AppError> {
    if uid.trim().is_empty() {
        return Err(AppError::Validation("uid must not be empty".to_string()));
    }
    Ok(())
}
