// Profile reconciliation between the local PostgreSQL cache and the remote S3 store,
// plus the live read path over the local cache.

pub mod feed;
pub mod handlers;
pub mod locks;
pub mod reconciler;
pub mod service;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use reconciler::{SyncAction, SyncFailure};
pub use service::ProfileService;
