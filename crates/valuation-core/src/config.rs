//! Orchestrator configuration (spec §6), mirroring `apps/api/src/config.rs`:
//! `dotenvy::dotenv().ok()` then `std::env::var` with defaults. Unlike the
//! teacher's config, this one is fallible: `LLM_API_KEY` has no safe
//! default and a missing credential must fail fast at startup.

use std::env;
use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_model_name: String,
    pub data_dir: String,
    pub cache_dir: String,
    pub extraction_cache_ttl_secs: i64,
    pub valuation_cache_ttl_secs: i64,
    pub analysis_cache_ttl_secs: i64,
    pub equity_risk_premium_default: Decimal,
    pub tax_rate: Decimal,
}

/// Redacts `llm_api_key` the way the teacher's `auth.rs` treats JWT
/// secrets: present in memory, never in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("llm_api_key", &"<redacted>")
            .field("llm_model_name", &self.llm_model_name)
            .field("data_dir", &self.data_dir)
            .field("cache_dir", &self.cache_dir)
            .field("extraction_cache_ttl_secs", &self.extraction_cache_ttl_secs)
            .field("valuation_cache_ttl_secs", &self.valuation_cache_ttl_secs)
            .field("analysis_cache_ttl_secs", &self.analysis_cache_ttl_secs)
            .field("equity_risk_premium_default", &self.equity_risk_premium_default)
            .field("tax_rate", &self.tax_rate)
            .finish()
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingRequired(name.to_string()))
}

fn optional_i64(name: &str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

fn optional_decimal(name: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            llm_api_key: required("LLM_API_KEY")?,
            llm_model_name: env::var("LLM_MODEL_NAME").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            data_dir: required("DATA_DIR")?,
            cache_dir: required("CACHE_DIR")?,
            extraction_cache_ttl_secs: optional_i64("EXTRACTION_CACHE_TTL", 604_800)?,
            valuation_cache_ttl_secs: optional_i64("VALUATION_CACHE_TTL", 86_400)?,
            analysis_cache_ttl_secs: optional_i64("ANALYSIS_CACHE_TTL", 604_800)?,
            equity_risk_premium_default: optional_decimal(
                "EQUITY_RISK_PREMIUM_DEFAULT",
                rust_decimal_macros::dec!(0.05),
            )?,
            tax_rate: optional_decimal("TAX_RATE", rust_decimal_macros::dec!(0.21))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_impl_redacts_the_api_key() {
        let config = Config {
            llm_api_key: "sk-super-secret".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            data_dir: "/data".to_string(),
            cache_dir: "/cache".to_string(),
            extraction_cache_ttl_secs: 604_800,
            valuation_cache_ttl_secs: 86_400,
            analysis_cache_ttl_secs: 604_800,
            equity_risk_premium_default: rust_decimal_macros::dec!(0.05),
            tax_rate: rust_decimal_macros::dec!(0.21),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
