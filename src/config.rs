use std::env;
use std::time::Duration;

use crate::suggest::DEFAULT_SUGGESTION_LIMIT;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub suggestion_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("PREDICT_BASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("PREDICT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let suggestion_limit = env::var("SUGGESTION_LIMIT")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
            .clamp(1, 50);

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            suggestion_limit,
        }
    }
}
