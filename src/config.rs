//! Minimal runtime configuration helpers.
//! Defaults target the public CWA file API and a SQLite file in the working
//! directory.

use std::time::Duration;
use std::{fs, path::Path};

pub const DEFAULT_ENDPOINT: &str = "https://opendata.cwa.gov.tw/fileapi/v1/opendataapi/F-A0010-001";
pub const DEFAULT_DATABASE_PATH: &str = "agri_weather.db";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Forecast document endpoint (`F-A0010-001`).
    pub endpoint: String,
    /// CWA open-data authorization key.
    pub api_key: String,
    /// SQLite snapshot store path.
    pub database_path: String,
    /// Upper bound on the blocking HTTP call; a hung remote must not hang us.
    pub request_timeout: Duration,
    /// Seed the store from the synthetic generator instead of fetching.
    pub sample_data_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let endpoint = std::env::var("CWA_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

        let sample_data_enabled = std::env::var("SAMPLE_DATA_ENABLED")
            .ok()
            .map(|s| matches!(s.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);

        // Prefer env var; fallback to api_key.txt in working directory. The
        // sample generator needs no key at all.
        let api_key = match std::env::var("CWA_API_KEY") {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => {
                let path = Path::new("api_key.txt");
                match fs::read_to_string(path) {
                    Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
                    _ if sample_data_enabled => String::new(),
                    _ => {
                        return Err(
                            "Missing API key: set CWA_API_KEY or provide api_key.txt in working directory".to_string()
                        );
                    }
                }
            }
        };

        let timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Ok(Config {
            endpoint,
            api_key,
            database_path,
            request_timeout: Duration::from_secs(timeout_secs),
            sample_data_enabled,
        })
    }
}
