use std::env;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use shared_models::time::parse_time_of_day;

pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 30;
pub const DEFAULT_AVAILABILITY_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

/// What happens when a booking lands on a slot that is already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Check and reserve in one step; a taken slot is an error.
    Reject,
    /// Record the booking anyway and surface a warning.
    Warn,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "reject" => Ok(ConflictPolicy::Reject),
            "warn" => Ok(ConflictPolicy::Warn),
            other => Err(format!("Invalid conflict policy: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub slot_grid_start: NaiveTime,
    pub slot_grid_end: NaiveTime,
    pub slot_interval_minutes: u32,
    pub availability_window_days: u32,
    pub suggestion_limit: usize,
    pub submit_delay_ms: u64,
    pub conflict_policy: ConflictPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slot_grid_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_grid_end: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            availability_window_days: DEFAULT_AVAILABILITY_WINDOW_DAYS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            submit_delay_ms: 0,
            conflict_policy: ConflictPolicy::Reject,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset keys keep their default;
    /// unparsable values are logged and also fall back to the default.
    pub fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let slot_grid_start = read_time(&lookup, "CLINIC_SLOT_START", defaults.slot_grid_start);
        let slot_grid_end = read_time(&lookup, "CLINIC_SLOT_END", defaults.slot_grid_end);

        let config = Self {
            slot_grid_start,
            slot_grid_end,
            slot_interval_minutes: read_var(
                &lookup,
                "CLINIC_SLOT_INTERVAL_MINUTES",
                defaults.slot_interval_minutes,
            ),
            availability_window_days: read_var(
                &lookup,
                "CLINIC_AVAILABILITY_WINDOW_DAYS",
                defaults.availability_window_days,
            ),
            suggestion_limit: read_var(&lookup, "CLINIC_SUGGESTION_LIMIT", defaults.suggestion_limit),
            submit_delay_ms: read_var(&lookup, "CLINIC_SUBMIT_DELAY_MS", defaults.submit_delay_ms),
            conflict_policy: read_var(&lookup, "CLINIC_CONFLICT_POLICY", defaults.conflict_policy),
        };

        if !config.is_valid() {
            warn!("Slot grid configuration is inconsistent, reverting grid to defaults");
            return Self {
                slot_grid_start: defaults.slot_grid_start,
                slot_grid_end: defaults.slot_grid_end,
                slot_interval_minutes: defaults.slot_interval_minutes,
                ..config
            };
        }

        config
    }

    pub fn is_valid(&self) -> bool {
        self.slot_grid_start <= self.slot_grid_end
            && self.slot_interval_minutes > 0
            && self.slot_interval_minutes <= 24 * 60
    }

    pub fn submit_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.submit_delay_ms)
    }
}

fn read_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {:?}", key, raw, default);
            default
        }),
        None => {
            debug!("{} not set, using default {:?}", key, default);
            default
        }
    }
}

fn read_time<F>(lookup: &F, key: &str, default: NaiveTime) -> NaiveTime
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_time_of_day(&raw).unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.slot_grid_start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(config.slot_grid_end, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(config.slot_interval_minutes, 30);
        assert_eq!(config.availability_window_days, 30);
        assert_eq!(config.suggestion_limit, 3);
        assert_eq!(config.conflict_policy, ConflictPolicy::Reject);
        assert!(config.is_valid());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("CLINIC_SLOT_START", "9:00"),
            ("CLINIC_SLOT_END", "14:30"),
            ("CLINIC_SLOT_INTERVAL_MINUTES", "15"),
            ("CLINIC_AVAILABILITY_WINDOW_DAYS", "14"),
            ("CLINIC_SUGGESTION_LIMIT", "5"),
            ("CLINIC_SUBMIT_DELAY_MS", "250"),
            ("CLINIC_CONFLICT_POLICY", "Warn"),
        ]);

        assert_eq!(config.slot_grid_start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(config.slot_grid_end, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(config.slot_interval_minutes, 15);
        assert_eq!(config.availability_window_days, 14);
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.submit_delay(), std::time::Duration::from_millis(250));
        assert_eq!(config.conflict_policy, ConflictPolicy::Warn);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("CLINIC_SLOT_INTERVAL_MINUTES", "half-hour"),
            ("CLINIC_CONFLICT_POLICY", "ignore"),
        ]);
        assert_eq!(config.slot_interval_minutes, 30);
        assert_eq!(config.conflict_policy, ConflictPolicy::Reject);
    }

    #[test]
    fn test_inverted_grid_reverts_to_default_grid() {
        let config = config_from(&[
            ("CLINIC_SLOT_START", "18:00"),
            ("CLINIC_SLOT_END", "09:00"),
            ("CLINIC_SUGGESTION_LIMIT", "4"),
        ]);
        assert!(config.is_valid());
        assert_eq!(config.slot_grid_start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(config.suggestion_limit, 4);
    }

    #[test]
    fn test_single_slot_grid_is_kept() {
        let config = config_from(&[
            ("CLINIC_SLOT_START", "10:00"),
            ("CLINIC_SLOT_END", "10:00"),
        ]);
        assert!(config.is_valid());
        assert_eq!(config.slot_grid_start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(config.slot_grid_end, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }
}
