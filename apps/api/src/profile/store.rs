//! Profile stores: the local PostgreSQL cache and the remote S3 document store.
//!
//! Both sides are opaque key-value stores keyed by `uid`, with last-write-wins `put`.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::models::profile::UserProfile;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("object store error: {0}")]
    ObjectStore(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value access to one copy of the user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns the stored profile, or `None` when this store has never seen `uid`.
    async fn get(&self, uid: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Replaces whatever is stored under `profile.uid`.
    async fn put(&self, profile: &UserProfile) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL local cache
// ────────────────────────────────────────────────────────────────────────────

/// The local cache: one row per user in `user_profiles`.
#[derive(Clone)]
pub struct PgProfileCache {
    pool: PgPool,
}

impl PgProfileCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileCache {
    async fn get(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT uid, name, email, bio, skills, experience, last_updated
            FROM user_profiles
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn put(&self, profile: &UserProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (uid, name, email, bio, skills, experience, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (uid) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                bio = EXCLUDED.bio,
                skills = EXCLUDED.skills,
                experience = EXCLUDED.experience,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(&profile.uid)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.bio)
        .bind(&profile.skills)
        .bind(&profile.experience)
        .bind(profile.last_updated)
        .execute(&self.pool)
        .await?;

        debug!("Cached profile {} locally", profile.uid);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 remote document store
// ────────────────────────────────────────────────────────────────────────────

const PROFILE_PREFIX: &str = "user_profiles";

/// The remote store: one JSON document per user at `user_profiles/{uid}.json`.
#[derive(Clone)]
pub struct S3ProfileStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ProfileStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

/// Object key holding the profile document for `uid`.
pub fn profile_object_key(uid: &str) -> String {
    format!("{PROFILE_PREFIX}/{uid}.json")
}

#[async_trait]
impl ProfileStore for S3ProfileStore {
    async fn get(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let key = profile_object_key(uid);
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;

        let output = match response {
            Ok(output) => output,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    return Ok(None);
                }
                return Err(StoreError::ObjectStore(format!(
                    "GET s3://{}/{key} failed: {err}",
                    self.bucket
                )));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::ObjectStore(format!("reading {key} failed: {e}")))?
            .into_bytes();

        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn put(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let key = profile_object_key(&profile.uid);
        let body = serde_json::to_vec(profile)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| {
                StoreError::ObjectStore(format!("PUT s3://{}/{key} failed: {e}", self.bucket))
            })?;

        debug!("Stored profile {} remotely", profile.uid);
        Ok(())
    }
}
