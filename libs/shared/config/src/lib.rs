use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5007";
pub const DEFAULT_MIN_LOADING_DELAY_MS: u64 = 5000;
pub const DEFAULT_PORT: u16 = 3000;

/// What happens to an open edit session when the save request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavePolicy {
    /// Keep the editor open until the backend acknowledges the update.
    #[default]
    AwaitConfirmation,
    /// Close the editor as soon as the save request settles, whatever the outcome.
    CloseRegardless,
}

impl FromStr for SavePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "await-confirmation" | "await_confirmation" => Ok(SavePolicy::AwaitConfirmation),
            "close-regardless" | "close_regardless" => Ok(SavePolicy::CloseRegardless),
            other => Err(format!("unknown save policy '{}'", other)),
        }
    }
}

impl fmt::Display for SavePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SavePolicy::AwaitConfirmation => write!(f, "await-confirmation"),
            SavePolicy::CloseRegardless => write!(f, "close-regardless"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub min_loading_delay_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub save_policy: SavePolicy,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            min_loading_delay_ms: DEFAULT_MIN_LOADING_DELAY_MS,
            request_timeout_secs: None,
            save_policy: SavePolicy::default(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("DOCERE_API_URL")
                .unwrap_or_else(|_| {
                    warn!("DOCERE_API_URL not set, using default");
                    DEFAULT_BACKEND_URL.to_string()
                }),
            min_loading_delay_ms: parse_var("DOCTOR_PAGE_MIN_LOADING_MS")
                .unwrap_or(DEFAULT_MIN_LOADING_DELAY_MS),
            request_timeout_secs: parse_var("DOCERE_API_TIMEOUT_SECS"),
            save_policy: parse_var("DOCTOR_PAGE_SAVE_POLICY").unwrap_or_default(),
            port: parse_var("PORT").unwrap_or(DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - backend url is empty");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.trim().is_empty()
    }

    pub fn min_loading_delay(&self) -> Duration {
        Duration::from_millis(self.min_loading_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Reads and parses an optional variable. Unparseable values are logged and ignored.
fn parse_var<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} has invalid value '{}' ({}), using default", key, raw, e);
            None
        }
    }
}
