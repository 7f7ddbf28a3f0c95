use std::{fmt, path::PathBuf, time::Duration};

use crate::{error::PipelineError, exchange_rate::CurrencyCode};

pub const DEFAULT_API_URL: &str = "https://v6.exchangerate-api.com/v6";
pub const DEFAULT_BASE_CURRENCY: &str = "GBP";
pub const DEFAULT_OUTPUT_PATH: &str = "data/clean_exchange_rates.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Provider key. Kept out of `Debug` output so it never reaches a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        ApiKey(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Where and how to reach the rate provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub api_key: ApiKey,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// `<api_url>/<key>/latest/<BASE>`. Built per call, never stored.
    pub fn latest_url(&self, base: &CurrencyCode) -> String {
        format!(
            "{}/{}/latest/{}",
            self.api_url.trim_end_matches('/'),
            self.api_key.expose(),
            base
        )
    }

    /// Host part of the endpoint, safe to log.
    pub fn host(&self) -> &str {
        let rest = self
            .api_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.api_url);
        rest.split('/').next().unwrap_or(rest)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub base_currency: CurrencyCode,
    pub output_path: PathBuf,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = var("EXCHANGE_RATE_API_KEY").ok_or_else(|| {
            PipelineError::Configuration("EXCHANGE_RATE_API_KEY is not set".to_string())
        })?;

        let base_currency = var("BASE_CURRENCY")
            .as_deref()
            .unwrap_or(DEFAULT_BASE_CURRENCY)
            .parse::<CurrencyCode>()?;

        let api_url = var("EXCHANGE_RATE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(PipelineError::Configuration(format!(
                "EXCHANGE_RATE_API_URL must be an http(s) URL, got {api_url:?}"
            )));
        }

        let timeout_secs = match var("FETCH_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(PipelineError::Configuration(format!(
                        "FETCH_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                    )));
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let output_path = var("OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        Ok(Config {
            provider: ProviderConfig {
                api_url,
                api_key: ApiKey::new(api_key),
                timeout: Duration::from_secs(timeout_secs),
            },
            base_currency,
            output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("EXCHANGE_RATE_API_KEY", "secret")])).unwrap();
        assert_eq!(config.base_currency.as_str(), "GBP");
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(config.provider.api_url, DEFAULT_API_URL);
        assert_eq!(config.provider.timeout, Duration::from_secs(10));
        assert_eq!(config.provider.host(), "v6.exchangerate-api.com");
    }

    #[test]
    fn missing_or_blank_key_fails_fast() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));

        let err = Config::from_lookup(lookup(&[("EXCHANGE_RATE_API_KEY", "   ")])).unwrap_err();
        assert!(err.to_string().contains("EXCHANGE_RATE_API_KEY"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("EXCHANGE_RATE_API_KEY", "secret"),
            ("BASE_CURRENCY", "usd"),
            ("EXCHANGE_RATE_API_URL", "http://127.0.0.1:9000/v6/"),
            ("OUTPUT_PATH", "/tmp/rates.csv"),
            ("FETCH_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.base_currency.as_str(), "USD");
        assert_eq!(config.output_path, PathBuf::from("/tmp/rates.csv"));
        assert_eq!(config.provider.timeout, Duration::from_secs(3));
        assert_eq!(
            config.provider.latest_url(&config.base_currency),
            "http://127.0.0.1:9000/v6/secret/latest/USD"
        );
        assert_eq!(config.provider.host(), "127.0.0.1:9000");
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (name, value) in [
            ("FETCH_TIMEOUT_SECS", "0"),
            ("FETCH_TIMEOUT_SECS", "ten"),
            ("BASE_CURRENCY", "POUND"),
            ("EXCHANGE_RATE_API_URL", "ftp://example.com"),
        ] {
            let result = Config::from_lookup(lookup(&[("EXCHANGE_RATE_API_KEY", "k"), (name, value)]));
            assert!(
                matches!(result, Err(PipelineError::Configuration(_))),
                "{name}={value} should be rejected"
            );
        }
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let config = Config::from_lookup(lookup(&[("EXCHANGE_RATE_API_KEY", "topsecret")])).unwrap();
        let dump = format!("{config:?}");
        assert!(!dump.contains("topsecret"));
        assert!(dump.contains("ApiKey(***)"));
    }
}
