use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::profile::ProfileService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every client is constructed in `main` and passed in here.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Local cache + remote store reconciliation and the live profile feed.
    pub profiles: ProfileService,
    /// Gemini in production; swapped for canned generators in tests.
    pub llm: Arc<dyn TextGenerator>,
}
