use crate::errors::{EngineError, EngineResult};
use crate::state::ParameterSet;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub alpha_vantage_api_key: Option<String>,
    pub alpha_vantage_base_url: String,
    pub lattice_steps: usize,
    pub default_params: ParameterSet,
    pub fetch_rate_on_startup: bool,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            alpha_vantage_base_url: "https://www.alphavantage.co".to_string(),
            lattice_steps: 1000,
            default_params: ParameterSet::new(42.0, 40.0, 0.5, 0.1, 0.2),
            fetch_rate_on_startup: true,
            server_port: 3001,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys fall back to `Default`.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let d = defaults.default_params;

        let lattice_steps: usize = parse_or(&lookup, "LATTICE_STEPS", defaults.lattice_steps)?;
        if lattice_steps == 0 {
            return Err(EngineError::Config("LATTICE_STEPS: must be >= 1".into()));
        }

        let default_params = ParameterSet::new(
            parse_or(&lookup, "DEFAULT_SPOT", d.spot)?,
            parse_or(&lookup, "DEFAULT_STRIKE", d.strike)?,
            parse_or(&lookup, "DEFAULT_TIME_TO_EXPIRY", d.time_to_expiry)?,
            parse_or(&lookup, "DEFAULT_RISK_FREE_RATE", d.risk_free_rate)?,
            parse_or(&lookup, "DEFAULT_VOLATILITY", d.volatility)?,
        );

        Ok(Self {
            alpha_vantage_api_key: lookup("ALPHA_VANTAGE_API_KEY")
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            alpha_vantage_base_url: lookup("ALPHA_VANTAGE_BASE_URL")
                .unwrap_or(defaults.alpha_vantage_base_url),
            lattice_steps,
            default_params,
            fetch_rate_on_startup: parse_or(
                &lookup,
                "FETCH_RATE_ON_STARTUP",
                defaults.fetch_rate_on_startup,
            )?,
            server_port: parse_or(&lookup, "SERVER_PORT", defaults.server_port)?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> EngineResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| EngineError::Config(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.lattice_steps, 1000);
        assert_eq!(cfg.server_port, 3001);
        assert_eq!(cfg.default_params, ParameterSet::new(42.0, 40.0, 0.5, 0.1, 0.2));
        assert!(cfg.alpha_vantage_api_key.is_none());
        assert!(cfg.fetch_rate_on_startup);
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("LATTICE_STEPS", "250"),
            ("DEFAULT_SPOT", "101.5"),
            ("DEFAULT_RISK_FREE_RATE", "-0.01"),
            ("ALPHA_VANTAGE_API_KEY", " demo "),
            ("FETCH_RATE_ON_STARTUP", "false"),
            ("SERVER_PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(cfg.lattice_steps, 250);
        assert_eq!(cfg.default_params.spot, 101.5);
        assert_eq!(cfg.default_params.risk_free_rate, -0.01);
        assert_eq!(cfg.alpha_vantage_api_key.as_deref(), Some("demo"));
        assert!(!cfg.fetch_rate_on_startup);
        assert_eq!(cfg.server_port, 8080);
    }

    #[test]
    fn test_blank_api_key_treated_as_unset() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("ALPHA_VANTAGE_API_KEY", "  ")])).unwrap();
        assert!(cfg.alpha_vantage_api_key.is_none());
    }

    #[test]
    fn test_parse_error_names_variable() {
        let err = AppConfig::from_lookup(lookup_from(&[("DEFAULT_VOLATILITY", "twenty")])).unwrap_err();
        match err {
            EngineError::Config(msg) => assert!(msg.starts_with("DEFAULT_VOLATILITY"), "msg={msg}"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_steps_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("LATTICE_STEPS", "0")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
