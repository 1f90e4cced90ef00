use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables, once, at
/// startup. Everything that used to be "read the settings file on every
/// call" lives here instead; the renderer receives its directories at
/// construction time.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Directory holding the per-store contract templates.
    pub templates_dir: PathBuf,
    /// Directory where generated PDFs are written and served from.
    pub generated_dir: PathBuf,
    pub anthropic_api_key: String,
    /// Optional mirror of generated PDFs to S3-compatible storage.
    pub s3: Option<S3Settings>,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: env_or("DATABASE_URL", "sqlite:data.db"),
            templates_dir: PathBuf::from(env_or("TEMPLATES_DIR", "templates")),
            generated_dir: PathBuf::from(env_or("GENERATED_DIR", "generated")),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            s3: S3Settings::from_env(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl S3Settings {
    /// All four variables or nothing: a half-configured mirror is treated
    /// as no mirror.
    fn from_env() -> Option<Self> {
        Some(S3Settings {
            bucket: std::env::var("S3_BUCKET").ok()?,
            endpoint: std::env::var("S3_ENDPOINT").ok()?,
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok()?,
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok()?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
