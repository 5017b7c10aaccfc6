//! Engine configuration, read once at start-up.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use agrocat_catalog::CurrencyProjection;

use crate::rate_limit::{InvalidRate, RateLimitPolicy, RateScope};

pub const ENV_VAR: &str = "AGROCAT_ENV";
pub const UZS_RATE_VAR: &str = "AGROCAT_UZS_RATE";

/// Deployment environment; production unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("AGROCAT_ENV must be 'development' or 'production' (got '{0}')")]
    InvalidEnvironment(String),

    #[error("AGROCAT_UZS_RATE must be a positive decimal (got '{0}')")]
    InvalidCurrencyRate(String),

    #[error("{var}: {source}")]
    InvalidRate {
        var: &'static str,
        #[source]
        source: InvalidRate,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_uzs_rate")]
    pub uzs_rate: Decimal,
    #[serde(default)]
    pub rate_limits: RateLimitPolicy,
}

fn default_uzs_rate() -> Decimal {
    CurrencyProjection::DEFAULT_RATE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            uzs_rate: default_uzs_rate(),
            rate_limits: RateLimitPolicy::default(),
        }
    }
}

fn rate_var(scope: RateScope) -> &'static str {
    match scope {
        RateScope::Login => "AGROCAT_RATE_LOGIN",
        RateScope::Register => "AGROCAT_RATE_REGISTER",
        RateScope::VerifyTaxId => "AGROCAT_RATE_VERIFY",
        RateScope::Search => "AGROCAT_RATE_SEARCH",
    }
}

impl EngineConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(ENV_VAR) {
            config.environment = raw.parse()?;
        }

        if let Some(raw) = get(UZS_RATE_VAR) {
            config.uzs_rate = Decimal::from_str(raw.trim())
                .ok()
                .filter(|r| *r > Decimal::ZERO)
                .ok_or(ConfigError::InvalidCurrencyRate(raw))?;
        }

        for scope in RateScope::ALL {
            let var = rate_var(scope);
            if let Some(raw) = get(var) {
                let rate = raw
                    .parse()
                    .map_err(|source| ConfigError::InvalidRate { var, source })?;
                config.rate_limits.set_rate(scope, rate);
            }
        }

        Ok(config)
    }

    pub fn currency_projection(&self) -> Result<CurrencyProjection, ConfigError> {
        CurrencyProjection::new(self.uzs_rate)
            .map_err(|_| ConfigError::InvalidCurrencyRate(self.uzs_rate.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::rate_limit::{Period, Rate};

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_production() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.uzs_rate, Decimal::from(12800));
        assert_eq!(config.rate_limits, RateLimitPolicy::default());
    }

    #[test]
    fn unknown_environment_is_an_error_not_a_default() {
        let err = EngineConfig::from_lookup(lookup(&[("AGROCAT_ENV", "staging")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidEnvironment("staging".to_string()));
    }

    #[test]
    fn reads_all_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("AGROCAT_ENV", "Development"),
            ("AGROCAT_UZS_RATE", "12650.5"),
            ("AGROCAT_RATE_VERIFY", "3/hour"),
            ("AGROCAT_RATE_SEARCH", " "),
        ]))
        .unwrap();
        assert!(config.environment.is_development());
        assert_eq!(config.uzs_rate, Decimal::new(126505, 1));
        assert_eq!(config.rate_limits.verify_tax_id, Rate::new(3, Period::Hour));
        assert_eq!(config.rate_limits.search, RateLimitPolicy::default().search);
    }

    #[test]
    fn rejects_bad_currency_and_rates() {
        assert!(matches!(
            EngineConfig::from_lookup(lookup(&[("AGROCAT_UZS_RATE", "0")])),
            Err(ConfigError::InvalidCurrencyRate(_))
        ));
        assert!(matches!(
            EngineConfig::from_lookup(lookup(&[("AGROCAT_RATE_LOGIN", "lots")])),
            Err(ConfigError::InvalidRate { var: "AGROCAT_RATE_LOGIN", .. })
        ));
    }

    #[test]
    fn deserializes_from_json_with_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"environment":"development","rate_limits":{"login":"2/minute","register":"1/day","verify_tax_id":"10/hour","search":"20/minute"}}"#)
                .unwrap();
        assert!(config.environment.is_development());
        assert_eq!(config.uzs_rate, CurrencyProjection::DEFAULT_RATE);
        assert_eq!(config.rate_limits.login, Rate::new(2, Period::Minute));
    }
}
