use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default request body ceiling: 10 MiB across all uploaded parts.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_id: String,
    pub location: String,
    pub model_name: String,
    pub vertex_access_token: String,
    pub vertex_endpoint: String,
    pub upload_dir: PathBuf,
    /// Write each request's documents into `<upload_dir>/<analysis_id>/`.
    pub scope_uploads_per_request: bool,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let location = require_env("LOCATION")?;
        let vertex_endpoint = std::env::var("VERTEX_ENDPOINT")
            .unwrap_or_else(|_| default_vertex_endpoint(&location));

        Ok(Config {
            project_id: require_env("PROJECT_ID")?,
            model_name: require_env("MODEL_NAME")?,
            vertex_access_token: require_env("VERTEX_ACCESS_TOKEN")?,
            vertex_endpoint,
            location,
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            scope_uploads_per_request: std::env::var("UPLOAD_SCOPE_PER_REQUEST")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
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

fn default_vertex_endpoint(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com")
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
