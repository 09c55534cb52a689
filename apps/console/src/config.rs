use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TOP_N: usize = 10;
const DEFAULT_SEARCH_TOP_K: usize = 5;
const DEFAULT_NOTICE_TTL_MS: u64 = 5_000;
const DEFAULT_VIEW_COUNTER_KEY: &str = "opinion_dashboard_views";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub top_n: usize,
    pub search_top_k: usize,
    pub notice_ttl: Duration,
    pub view_counter_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            top_n: DEFAULT_TOP_N,
            search_top_k: DEFAULT_SEARCH_TOP_K,
            notice_ttl: Duration::from_millis(DEFAULT_NOTICE_TTL_MS),
            view_counter_key: DEFAULT_VIEW_COUNTER_KEY.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        load_dotenv();

        Self::from_lookup(read_env)
    }

    /// Builds a config from an arbitrary key lookup; unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("OPINION_API_BASE_URL") {
            config.api_base_url = url;
        }

        if let Some(secs) =
            lookup("OPINION_REQUEST_TIMEOUT_SECS").and_then(|value| value.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(top_n) = lookup("OPINION_TOP_N").and_then(|value| value.parse::<usize>().ok()) {
            config.top_n = top_n.max(1);
        }

        if let Some(top_k) =
            lookup("OPINION_SEARCH_TOP_K").and_then(|value| value.parse::<usize>().ok())
        {
            config.search_top_k = top_k.max(1);
        }

        if let Some(ms) =
            lookup("OPINION_NOTICE_TTL_MS").and_then(|value| value.parse::<u64>().ok())
        {
            config.notice_ttl = Duration::from_millis(ms.max(1_000));
        }

        if let Some(key) = lookup("OPINION_VIEW_COUNTER_KEY") {
            if !key.trim().is_empty() {
                config.view_counter_key = key.trim().to_string();
            }
        }

        config
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| option_env_from_build(key).map(|s| s.to_string()))
}

fn option_env_from_build(key: &str) -> Option<&'static str> {
    match key {
        "OPINION_API_BASE_URL" => option_env!("OPINION_API_BASE_URL"),
        "OPINION_REQUEST_TIMEOUT_SECS" => option_env!("OPINION_REQUEST_TIMEOUT_SECS"),
        "OPINION_TOP_N" => option_env!("OPINION_TOP_N"),
        "OPINION_SEARCH_TOP_K" => option_env!("OPINION_SEARCH_TOP_K"),
        "OPINION_NOTICE_TTL_MS" => option_env!("OPINION_NOTICE_TTL_MS"),
        "OPINION_VIEW_COUNTER_KEY" => option_env!("OPINION_VIEW_COUNTER_KEY"),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!("failed to load .env: {err}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn load_dotenv() {}
