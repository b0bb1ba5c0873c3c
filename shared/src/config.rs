use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// PositionStack forward-geocoding settings
#[derive(Clone, Debug)]
pub struct GeocodingConfig {
    pub url: String,
    pub access_key: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    /// Directory for the sled customer store; `None` keeps customers in memory.
    pub data_dir: Option<String>,
    pub allowed_origins: Vec<String>,
    pub cache_max_entries: u64,
    pub log_level: String,
    pub geocoding: GeocodingConfig,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;
    const DEFAULT_LOG_LEVEL: &str = "info";
    const DEFAULT_POSITIONSTACK_URL: &str = "http://api.positionstack.com/v1/forward";
    const DEFAULT_POSITIONSTACK_TIMEOUT_MS: u64 = 5_000;

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_key = lookup("POSITIONSTACK_ACCESS_KEY").unwrap_or_else(|| {
            warn!("POSITIONSTACK_ACCESS_KEY not set, geocoding calls will be rejected upstream");
            String::new()
        });

        Self {
            host: lookup("ROCKETSTORE_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: parse_or(&lookup, "ROCKETSTORE_HTTP_PORT", Self::DEFAULT_HTTP_PORT),
            data_dir: lookup("ROCKETSTORE_DATA_DIR").filter(|dir| !dir.trim().is_empty()),
            allowed_origins: lookup("ROCKETSTORE_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            cache_max_entries: parse_or(
                &lookup,
                "ROCKETSTORE_CACHE_MAX_ENTRIES",
                Self::DEFAULT_CACHE_MAX_ENTRIES,
            ),
            log_level: lookup("ROCKETSTORE_LOG_LEVEL")
                .unwrap_or_else(|| Self::DEFAULT_LOG_LEVEL.to_string()),
            geocoding: GeocodingConfig {
                url: lookup("POSITIONSTACK_URL")
                    .unwrap_or_else(|| Self::DEFAULT_POSITIONSTACK_URL.to_string()),
                access_key,
                timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "POSITIONSTACK_TIMEOUT_MS",
                    Self::DEFAULT_POSITIONSTACK_TIMEOUT_MS,
                )),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        None => default,
    }
}
