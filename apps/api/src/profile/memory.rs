//! In-memory `ProfileStore` with fault injection, for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::models::profile::UserProfile;
use crate::profile::store::{ProfileStore, StoreError};

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, UserProfile>>,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
    puts: AtomicUsize,
}

impl MemoryProfileStore {
    pub fn with(profile: Option<UserProfile>) -> Self {
        let store = Self::default();
        if let Some(profile) = profile {
            store.profiles.lock().insert(profile.uid.clone(), profile);
        }
        store
    }

    pub fn snapshot(&self, uid: &str) -> Option<UserProfile> {
        self.profiles.lock().get(uid).cloned()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::ObjectStore("injected read failure".to_string()));
        }
        Ok(self.snapshot(uid))
    }

    async fn put(&self, profile: &UserProfile) -> Result<(), StoreError> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StoreError::ObjectStore("injected write failure".to_string()));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }
}
