use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::render::template::MAX_MARGIN_PT;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Absent means every text-generation call fails with `MissingApiKey`.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Overrides the per-template page margin.
    pub pdf_margin_pt: Option<f32>,
    /// When set, exports are written here instead of uploaded to S3.
    pub export_dir: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            pdf_margin_pt: optional_env("PDF_MARGIN_PT")
                .map(|raw| parse_margin(&raw))
                .transpose()?,
            export_dir: optional_env("EXPORT_DIR").map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_margin(raw: &str) -> Result<f32> {
    let margin: f32 = raw
        .trim()
        .parse()
        .with_context(|| format!("PDF_MARGIN_PT must be a number, got '{raw}'"))?;
    if !(0.0..=MAX_MARGIN_PT).contains(&margin) {
        bail!("PDF_MARGIN_PT must be between 0 and {MAX_MARGIN_PT}, got {margin}");
    }
    Ok(margin)
}

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/resume_builder_test".to_string(),
        s3_bucket: "resume-builder-test".to_string(),
        s3_endpoint: "http://127.0.0.1:9000".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        gemini_api_key: None,
        gemini_model: DEFAULT_MODEL.to_string(),
        gemini_base_url: DEFAULT_BASE_URL.to_string(),
        pdf_margin_pt: None,
        export_dir: None,
        port: 8080,
        rust_log: "debug".to_string(),
    }
}
