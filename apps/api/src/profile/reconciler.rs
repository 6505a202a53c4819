//! Last-write-wins reconciliation between the local cache and the remote store.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::profile::UserProfile;
use crate::profile::store::{ProfileStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreSide {
    Local,
    Remote,
}

impl fmt::Display for StoreSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreSide::Local => f.write_str("local cache"),
            StoreSide::Remote => f.write_str("remote store"),
        }
    }
}

/// A reconciliation or save that did not complete.
///
/// Writes that succeeded before the failure are not rolled back.
#[derive(Debug, Error)]
pub enum SyncFailure {
    #[error("reading the {side} failed: {source}")]
    Read {
        side: StoreSide,
        #[source]
        source: StoreError,
    },

    #[error("writing the {side} failed: {source}")]
    Write {
        side: StoreSide,
        #[source]
        source: StoreError,
    },
}

impl SyncFailure {
    pub fn side(&self) -> StoreSide {
        match self {
            SyncFailure::Read { side, .. } | SyncFailure::Write { side, .. } => *side,
        }
    }
}

/// What a reconciliation did (or will do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Neither side has the profile.
    Noop,
    /// Remote copy written into the local cache.
    PullRemote,
    /// Local copy written to the remote store.
    PushLocal,
}

/// Decision table. Equal timestamps favor the local copy.
pub fn plan_sync(local: Option<&UserProfile>, remote: Option<&UserProfile>) -> SyncAction {
    match (local, remote) {
        (None, None) => SyncAction::Noop,
        (None, Some(_)) => SyncAction::PullRemote,
        (Some(_), None) => SyncAction::PushLocal,
        (Some(l), Some(r)) if r.last_updated > l.last_updated => SyncAction::PullRemote,
        (Some(_), Some(_)) => SyncAction::PushLocal,
    }
}

/// Brings `local` and `remote` to the same copy of `uid`'s profile.
///
/// Reads local then remote, then performs at most one write. Callers must
/// serialize calls per `uid`.
pub async fn reconcile(
    local: &dyn ProfileStore,
    remote: &dyn ProfileStore,
    uid: &str,
) -> Result<SyncAction, SyncFailure> {
    let local_copy = local.get(uid).await.map_err(|source| SyncFailure::Read {
        side: StoreSide::Local,
        source,
    })?;
    let remote_copy = remote.get(uid).await.map_err(|source| SyncFailure::Read {
        side: StoreSide::Remote,
        source,
    })?;

    let action = plan_sync(local_copy.as_ref(), remote_copy.as_ref());
    match (action, local_copy, remote_copy) {
        (SyncAction::PullRemote, _, Some(winner)) => {
            local.put(&winner).await.map_err(|source| SyncFailure::Write {
                side: StoreSide::Local,
                source,
            })?;
        }
        (SyncAction::PushLocal, Some(winner), _) => {
            remote.put(&winner).await.map_err(|source| SyncFailure::Write {
                side: StoreSide::Remote,
                source,
            })?;
        }
        _ => {}
    }

    if action == SyncAction::Noop {
        debug!("Profile {uid} absent on both sides; nothing to sync");
    } else {
        info!("Reconciled profile {uid}: {action:?}");
    }
    Ok(action)
}

/// Writes `profile` to the local cache, then to the remote store.
///
/// A remote failure is reported even though the cache already holds the new
/// value; the next reconciliation pushes it.
pub async fn save_profile(
    local: &dyn ProfileStore,
    remote: &dyn ProfileStore,
    profile: &UserProfile,
) -> Result<(), SyncFailure> {
    local.put(profile).await.map_err(|source| SyncFailure::Write {
        side: StoreSide::Local,
        source,
    })?;
    remote.put(profile).await.map_err(|source| SyncFailure::Write {
        side: StoreSide::Remote,
        source,
    })?;
    debug!("Saved profile {}", profile.uid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::memory::MemoryProfileStore;

    fn at(ts: i64, name: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            ..UserProfile::blank("u1", ts)
        }
    }

    fn stores(
        local: Option<UserProfile>,
        remote: Option<UserProfile>,
    ) -> (MemoryProfileStore, MemoryProfileStore) {
        (MemoryProfileStore::with(local), MemoryProfileStore::with(remote))
    }

    #[test]
    fn test_plan_covers_decision_table() {
        let older = at(10, "old");
        let newer = at(20, "new");
        assert_eq!(plan_sync(None, None), SyncAction::Noop);
        assert_eq!(plan_sync(None, Some(&newer)), SyncAction::PullRemote);
        assert_eq!(plan_sync(Some(&older), None), SyncAction::PushLocal);
        assert_eq!(plan_sync(Some(&older), Some(&newer)), SyncAction::PullRemote);
        assert_eq!(plan_sync(Some(&newer), Some(&older)), SyncAction::PushLocal);
        assert_eq!(
            plan_sync(Some(&older), Some(&at(10, "other"))),
            SyncAction::PushLocal,
            "tie must favor local"
        );
    }

    #[tokio::test]
    async fn test_both_absent_is_noop() {
        let (local, remote) = stores(None, None);
        let action = reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(action, SyncAction::Noop);
        assert_eq!(local.put_count() + remote.put_count(), 0, "no writes expected");
    }

    #[tokio::test]
    async fn test_remote_only_is_pulled() {
        let (local, remote) = stores(None, Some(at(5, "remote")));
        let action = reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(action, SyncAction::PullRemote);
        assert_eq!(local.snapshot("u1"), Some(at(5, "remote")));
        assert_eq!(remote.put_count(), 0);
    }

    #[tokio::test]
    async fn test_local_only_is_pushed() {
        let (local, remote) = stores(Some(at(5, "local")), None);
        let action = reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(action, SyncAction::PushLocal);
        assert_eq!(remote.snapshot("u1"), Some(at(5, "local")));
        assert_eq!(local.put_count(), 0);
    }

    #[tokio::test]
    async fn test_newer_remote_overwrites_local() {
        let (local, remote) = stores(Some(at(10, "local")), Some(at(20, "remote")));
        reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(local.snapshot("u1"), Some(at(20, "remote")));
        assert_eq!(remote.put_count(), 0);
        assert_eq!(local.put_count(), 1);
    }

    #[tokio::test]
    async fn test_newer_local_overwrites_remote() {
        let (local, remote) = stores(Some(at(20, "local")), Some(at(10, "remote")));
        reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(remote.snapshot("u1"), Some(at(20, "local")));
        assert_eq!(local.put_count(), 0);
    }

    #[tokio::test]
    async fn test_equal_timestamps_favor_local() {
        let (local, remote) = stores(Some(at(10, "local")), Some(at(10, "remote")));
        let action = reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(action, SyncAction::PushLocal);
        assert_eq!(remote.snapshot("u1").map(|p| p.name), Some("local".to_string()));
    }

    #[tokio::test]
    async fn test_stores_converge_after_reconcile() {
        let (local, remote) = stores(Some(at(3, "a")), Some(at(9, "b")));
        reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(local.snapshot("u1"), remote.snapshot("u1"));

        let again = reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(again, SyncAction::PushLocal, "converged copies tie, so local is pushed");
        assert_eq!(local.snapshot("u1"), remote.snapshot("u1"));
    }

    #[tokio::test]
    async fn test_remote_read_failure_reports_side() {
        let (local, remote) = stores(Some(at(5, "local")), None);
        remote.fail_gets(true);
        let err = reconcile(&local, &remote, "u1").await.unwrap_err();
        assert!(matches!(err, SyncFailure::Read { side: StoreSide::Remote, .. }));
        assert_eq!(local.put_count() + remote.put_count(), 0);
    }

    #[tokio::test]
    async fn test_local_write_failure_is_reported() {
        let (local, remote) = stores(None, Some(at(5, "remote")));
        local.fail_puts(true);
        let err = reconcile(&local, &remote, "u1").await.unwrap_err();
        assert_eq!(err.side(), StoreSide::Local);
        assert!(local.snapshot("u1").is_none(), "failed store must be unchanged");
    }

    #[tokio::test]
    async fn test_save_writes_local_then_remote() {
        let (local, remote) = stores(None, None);
        save_profile(&local, &remote, &at(7, "saved")).await.unwrap();
        assert_eq!(local.snapshot("u1"), Some(at(7, "saved")));
        assert_eq!(remote.snapshot("u1"), Some(at(7, "saved")));
    }

    #[tokio::test]
    async fn test_save_keeps_local_when_remote_fails() {
        let (local, remote) = stores(None, Some(at(1, "stale")));
        remote.fail_puts(true);
        let err = save_profile(&local, &remote, &at(7, "fresh")).await.unwrap_err();
        assert_eq!(err.side(), StoreSide::Remote);
        assert_eq!(local.snapshot("u1"), Some(at(7, "fresh")), "cache runs ahead of remote");
        assert_eq!(remote.snapshot("u1"), Some(at(1, "stale")));

        remote.fail_puts(false);
        let action = reconcile(&local, &remote, "u1").await.unwrap();
        assert_eq!(action, SyncAction::PushLocal);
        assert_eq!(remote.snapshot("u1"), Some(at(7, "fresh")));
    }

    #[tokio::test]
    async fn test_save_skips_remote_when_local_fails() {
        let (local, remote) = stores(None, None);
        local.fail_puts(true);
        let err = save_profile(&local, &remote, &at(7, "x")).await.unwrap_err();
        assert_eq!(err.side(), StoreSide::Local);
        assert_eq!(remote.put_count(), 0);
    }
}
