use std::time::Duration;

use crate::DashboardError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, DashboardError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("DASHBOARD_API_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "DASHBOARD_API_BASE_URL must be an http(s) URL, got {base_url}"
            )));
        }
        let request_timeout = match get("DASHBOARD_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    DashboardError::Config(format!(
                        "DASHBOARD_REQUEST_TIMEOUT_SECS is not a whole number: {raw}"
                    ))
                })?;
                Duration::from_secs(secs.max(1))
            }
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };
        Ok(Self {
            base_url,
            request_timeout,
        })
    }
}
