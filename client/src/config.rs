use thiserror::Error;
use tracing::Level;

pub const DEFAULT_API_BASE: &str = "/vrp";
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 500;
/// Ticks granted after an explicit start; a fresh solve is expected to run long.
pub const DEFAULT_START_TICK_BUDGET: u32 = 300;
/// Ticks granted when a snapshot reveals a solve already in progress.
pub const DEFAULT_CATCH_UP_TICK_BUDGET: u32 = 40;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a positive integer, using {fallback}")]
    NotPositive {
        key: &'static str,
        value: String,
        fallback: u32,
    },
    #[error("{key}={value:?} is not a log level, using info")]
    InvalidLevel { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub poll_interval_ms: u32,
    pub start_tick_budget: u32,
    pub catch_up_tick_budget: u32,
    pub request_timeout_ms: u32,
    pub log_level: Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            start_tick_budget: DEFAULT_START_TICK_BUDGET,
            catch_up_tick_budget: DEFAULT_CATCH_UP_TICK_BUDGET,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            log_level: Level::INFO,
        }
    }
}

impl ClientConfig {
    /// Build a config from `data-*` style keys. Bad values fall back to the
    /// default and are returned so they can be logged once logging is up.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();
        let defaults = Self::default();

        let api_base = lookup("data-api-base")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_base);

        let mut positive = |key: &'static str, fallback: u32| -> u32 {
            let Some(value) = lookup(key) else {
                return fallback;
            };
            match value.trim().parse::<u32>() {
                Ok(parsed) if parsed > 0 => parsed,
                _ => {
                    errors.push(ConfigError::NotPositive {
                        key,
                        value,
                        fallback,
                    });
                    fallback
                }
            }
        };

        let poll_interval_ms = positive("data-poll-interval-ms", defaults.poll_interval_ms);
        let start_tick_budget = positive("data-start-ticks", defaults.start_tick_budget);
        let catch_up_tick_budget = positive("data-catch-up-ticks", defaults.catch_up_tick_budget);
        let request_timeout_ms = positive("data-request-timeout-ms", defaults.request_timeout_ms);

        let log_level = match lookup("data-log-level") {
            Some(value) => match value.trim().parse::<Level>() {
                Ok(level) => level,
                Err(_) => {
                    errors.push(ConfigError::InvalidLevel {
                        key: "data-log-level",
                        value,
                    });
                    defaults.log_level
                }
            },
            None => defaults.log_level,
        };

        (
            Self {
                api_base,
                poll_interval_ms,
                start_tick_budget,
                catch_up_tick_budget,
                request_timeout_ms,
                log_level,
            },
            errors,
        )
    }

    /// Read overrides from the attributes of the element the app mounts into.
    pub fn from_element(element: &web_sys::Element) -> (Self, Vec<ConfigError>) {
        Self::from_lookup(|key| element.get_attribute(key))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}
