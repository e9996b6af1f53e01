use std::str::FromStr;
use std::time::Duration;

use crate::domains::insights::INSIGHT_LIMIT;
use crate::domains::mailbox::RECENT_EMAIL_LIMIT;
use crate::domains::relationships::RelationshipPolicy;
use crate::domains::trends::SyntheticBounds;
use crate::error::{EngineError, EngineResult};

pub const DEFAULT_REFRESH_SECS: u64 = 300;
pub const DEFAULT_ACTIVE_PROJECT_TARGET: u32 = 10;

/// Tunables for a dashboard load and the refresh loop around it.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub refresh_interval: Duration,
    pub active_project_target: u32,
    pub relationships: RelationshipPolicy,
    pub trend_bounds: SyntheticBounds,
    pub recent_email_limit: usize,
    pub insight_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            active_project_target: DEFAULT_ACTIVE_PROJECT_TARGET,
            relationships: RelationshipPolicy::default(),
            trend_bounds: SyntheticBounds::default(),
            recent_email_limit: RECENT_EMAIL_LIMIT,
            insight_limit: INSIGHT_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> EngineResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment. Unset keys keep their
    /// defaults; set but unparseable keys are an error.
    pub fn from_env_with<F>(mut get: F) -> EngineResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let refresh_secs: u64 = parse_var(&mut get, "DASHBOARD_REFRESH_SECS")?
            .unwrap_or(DEFAULT_REFRESH_SECS);
        if refresh_secs == 0 {
            return Err(EngineError::Config(
                "DASHBOARD_REFRESH_SECS must be greater than zero".into(),
            ));
        }
        let engagement_threshold: f64 =
            parse_var(&mut get, "DASHBOARD_HIGH_RISK_ENGAGEMENT_THRESHOLD")?
                .unwrap_or(defaults.relationships.engagement_threshold);
        if !engagement_threshold.is_finite() {
            return Err(EngineError::Config(
                "DASHBOARD_HIGH_RISK_ENGAGEMENT_THRESHOLD must be finite".into(),
            ));
        }

        Ok(Self {
            refresh_interval: Duration::from_secs(refresh_secs),
            active_project_target: parse_var(&mut get, "DASHBOARD_ACTIVE_PROJECT_TARGET")?
                .unwrap_or(defaults.active_project_target),
            relationships: RelationshipPolicy {
                engagement_threshold,
                high_risk_limit: parse_var(&mut get, "DASHBOARD_HIGH_RISK_LIMIT")?
                    .unwrap_or(defaults.relationships.high_risk_limit),
                momentum_limit: parse_var(&mut get, "DASHBOARD_PARTNER_MOMENTUM_LIMIT")?
                    .unwrap_or(defaults.relationships.momentum_limit),
            },
            ..defaults
        })
    }
}

fn parse_var<T, F>(get: &mut F, key: &str) -> EngineResult<Option<T>>
where
    T: FromStr,
    F: FnMut(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| EngineError::Config(format!("{key} has an invalid value: {raw}"))),
        _ => Ok(None),
    }
}
