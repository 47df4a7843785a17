use std::{env, path::PathBuf};

pub const DASHBOARD_ENDPOINT: &str = "/api/dashboard/";
pub const REPORTS_ENDPOINT: &str = "/api/reports/";
pub const CHECK_TRAFFIC_ENDPOINT: &str = "/api/check-traffic/";
pub const SUBSCRIBE_ENDPOINT: &str = "/api/subscribe/";

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_PATH: &str = "data/session.json";

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub port: u16,
    pub session_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup("API_BASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let session_path = lookup("SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH));

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            port,
            session_path,
        }
    }
}
