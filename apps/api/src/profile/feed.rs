//! Live view of the local cache.
//!
//! `WatchedCache` wraps the local store and publishes every successful `put`
//! into a per-uid `watch` channel. Subscribers always hold the latest cached
//! value; the remote store never feeds this path directly. A channel lives
//! exactly as long as its subscriptions.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::Stream;
use tracing::debug;

use crate::models::profile::UserProfile;
use crate::profile::store::{ProfileStore, StoreError};

type Channels = Arc<Mutex<HashMap<String, watch::Sender<Option<UserProfile>>>>>;

pub struct WatchedCache {
    inner: Arc<dyn ProfileStore>,
    channels: Channels,
}

/// Removes the channel for `uid` once its last receiver is gone.
struct ChannelLease {
    uid: String,
    channels: Channels,
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        // Receivers are only created under the map lock, so a zero count here
        // cannot race with a subscribe.
        let mut channels = self.channels.lock();
        let idle = channels
            .get(&self.uid)
            .map(|sender| sender.receiver_count() == 0)
            .unwrap_or(false);
        if idle {
            channels.remove(&self.uid);
            debug!("Dropped idle profile channel for {}", self.uid);
        }
    }
}

/// One subscriber's view of a cached profile.
pub struct ProfileSubscription {
    // Field order matters: the receiver must be gone before the lease checks.
    receiver: watch::Receiver<Option<UserProfile>>,
    lease: ChannelLease,
}

impl ProfileSubscription {
    pub fn borrow(&self) -> watch::Ref<'_, Option<UserProfile>> {
        self.receiver.borrow()
    }

    pub fn has_changed(&self) -> Result<bool, watch::error::RecvError> {
        self.receiver.has_changed()
    }

    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.receiver.changed().await
    }

    /// Yields the current value, then every later one.
    pub fn into_stream(self) -> ProfileStream {
        let ProfileSubscription { receiver, lease } = self;
        ProfileStream {
            inner: WatchStream::new(receiver),
            _lease: lease,
        }
    }
}

pub struct ProfileStream {
    inner: WatchStream<Option<UserProfile>>,
    _lease: ChannelLease,
}

impl Stream for ProfileStream {
    type Item = Option<UserProfile>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl WatchedCache {
    pub fn new(inner: Arc<dyn ProfileStore>) -> Self {
        Self {
            inner,
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lease(&self, uid: &str) -> ChannelLease {
        ChannelLease {
            uid: uid.to_string(),
            channels: self.channels.clone(),
        }
    }

    /// Subscribes to the cached profile for `uid`. The subscription starts with
    /// the current cache contents (or `None`) and sees every later write.
    pub async fn subscribe(&self, uid: &str) -> Result<ProfileSubscription, StoreError> {
        // The receiver exists before the lock is released, so a concurrent
        // write never finds this channel idle.
        let (sender, mut subscription) = {
            let mut channels = self.channels.lock();
            if let Some(sender) = channels.get(uid) {
                return Ok(ProfileSubscription {
                    receiver: sender.subscribe(),
                    lease: self.lease(uid),
                });
            }
            let (sender, receiver) = watch::channel(None);
            channels.insert(uid.to_string(), sender.clone());
            let subscription = ProfileSubscription {
                receiver,
                lease: self.lease(uid),
            };
            (sender, subscription)
        };

        let current = self.inner.get(uid).await?;
        sender.send_if_modified(|slot| match (slot.as_ref(), current.as_ref()) {
            (_, None) => false,
            (None, Some(_)) => {
                *slot = current.clone();
                true
            }
            (Some(published), Some(fetched)) if fetched.last_updated > published.last_updated => {
                *slot = current.clone();
                true
            }
            _ => false,
        });
        subscription.receiver.borrow_and_update();

        Ok(subscription)
    }

    /// Number of uids with an open channel.
    #[cfg(test)]
    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    fn publish(&self, profile: &UserProfile) {
        let channels = self.channels.lock();
        if let Some(sender) = channels.get(&profile.uid) {
            sender.send_replace(Some(profile.clone()));
        }
    }
}

#[async_trait]
impl ProfileStore for WatchedCache {
    async fn get(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        self.inner.get(uid).await
    }

    async fn put(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.inner.put(profile).await?;
        self.publish(profile);
        Ok(())
    }
}
