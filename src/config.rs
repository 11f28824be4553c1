use crate::api::scores_api::DEFAULT_BASE_URL;
use crate::error::{GradingError, Result};
use crate::utils::grader::ProfitConvention;
use std::str::FromStr;

const DEFAULT_PICKS_FILE: &str = "cache/picks.json";
const DEFAULT_LOOKBACK_DAYS: u32 = 3;
const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub scores_api_base_url: String,
    pub scores_api_key: Option<String>,
    pub picks_file: String,
    pub lookback_days: u32,
    pub interval_secs: u64,
    pub profit_convention: ProfitConvention,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scores_api_base_url: DEFAULT_BASE_URL.to_string(),
            scores_api_key: None,
            picks_file: DEFAULT_PICKS_FILE.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            profit_convention: ProfitConvention::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        Ok(Self {
            scores_api_base_url: get("SCORES_API_BASE_URL").unwrap_or(defaults.scores_api_base_url),
            scores_api_key: get("SCORES_API_KEY"),
            picks_file: get("PICKS_FILE").unwrap_or(defaults.picks_file),
            lookback_days: parse_var("LOOKBACK_DAYS", get("LOOKBACK_DAYS"))?
                .unwrap_or(defaults.lookback_days),
            interval_secs: parse_var("GRADING_INTERVAL_SECS", get("GRADING_INTERVAL_SECS"))?
                .unwrap_or(defaults.interval_secs),
            profit_convention: parse_var("PROFIT_CONVENTION", get("PROFIT_CONVENTION"))?
                .unwrap_or(defaults.profit_convention),
        })
    }
}

fn parse_var<T>(key: &str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| GradingError::Config(format!("{}={}: {}", key, v, e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.profit_convention, ProfitConvention::ToWin);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PICKS_FILE", "/tmp/picks.json"),
            ("LOOKBACK_DAYS", "7"),
            ("GRADING_INTERVAL_SECS", "60"),
            ("PROFIT_CONVENTION", "risk"),
            ("SCORES_API_KEY", "secret"),
            ("SCORES_API_BASE_URL", ""),
        ]))
        .unwrap();
        assert_eq!(config.picks_file, "/tmp/picks.json");
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.profit_convention, ProfitConvention::Risk);
        assert_eq!(config.scores_api_key.as_deref(), Some("secret"));
        assert_eq!(config.scores_api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[("LOOKBACK_DAYS", "three")])).unwrap_err();
        assert!(matches!(err, GradingError::Config(_)));

        let err = Config::from_lookup(lookup(&[("PROFIT_CONVENTION", "stake")])).unwrap_err();
        assert!(err.to_string().contains("PROFIT_CONVENTION"));
    }
}
