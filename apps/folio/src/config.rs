use std::path::PathBuf;

use anyhow::Result;

const DEFAULT_REMOTE_URL: &str = "http://127.0.0.1:4810";

/// Application configuration loaded from environment variables.
/// Every knob has a default; a `.env` file is honored if present.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the local collection slot file.
    pub data_path: PathBuf,
    /// Base URL of the remote file store.
    pub remote_url: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let data_path = match std::env::var_os("FOLIO_DATA_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_data_path(),
        };

        Ok(Config {
            data_path,
            remote_url: std::env::var("FOLIO_REMOTE_URL")
                .unwrap_or_else(|_| DEFAULT_REMOTE_URL.to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Default slot location under the platform data directory, falling back to
/// the working directory when none exists (some containers).
fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
        .join("collection.json")
}
