//! Client configuration read from `TRIPPIN_*` environment variables.

use std::str::FromStr;
use std::time::Duration;

use trippin_api::{Client, DEFAULT_SERVICE_ROOT};

use crate::client::TripPinClient;
use crate::error::TripPinError;
use crate::retry::RetryPolicy;

pub const ENV_SERVICE_ROOT: &str = "TRIPPIN_SERVICE_ROOT";
pub const ENV_TIMEOUT_SECS: &str = "TRIPPIN_TIMEOUT_SECS";
pub const ENV_RETRY_MAX: &str = "TRIPPIN_RETRY_MAX";
pub const ENV_RETRY_BASE_MS: &str = "TRIPPIN_RETRY_BASE_MS";
pub const ENV_RETRY_MAX_MS: &str = "TRIPPIN_RETRY_MAX_MS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub service_root: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_root: DEFAULT_SERVICE_ROOT.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, TripPinError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset or blank keys
    /// keep their defaults; values that do not parse are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TripPinError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let service_root = lookup(ENV_SERVICE_ROOT)
            .map(|v| v.trim().to_string())
            .unwrap_or(defaults.service_root);
        let timeout_secs: u64 = parse_var(ENV_TIMEOUT_SECS, lookup(ENV_TIMEOUT_SECS), 30)?;
        if timeout_secs == 0 {
            return Err(TripPinError::Config(format!(
                "{} must be greater than zero",
                ENV_TIMEOUT_SECS
            )));
        }
        let max_retries = parse_var(ENV_RETRY_MAX, lookup(ENV_RETRY_MAX), defaults.retry.max_retries)?;
        let base_ms = parse_var(ENV_RETRY_BASE_MS, lookup(ENV_RETRY_BASE_MS), 500u64)?;
        let max_ms = parse_var(ENV_RETRY_MAX_MS, lookup(ENV_RETRY_MAX_MS), 8000u64)?;

        Ok(Self {
            service_root,
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy {
                max_retries,
                base_delay: Duration::from_millis(base_ms),
                max_delay: Duration::from_millis(max_ms.max(base_ms)),
            },
        })
    }

    pub fn with_service_root(mut self, service_root: impl Into<String>) -> Self {
        self.service_root = service_root.into();
        self
    }

    pub fn build_client(&self) -> Result<TripPinClient, TripPinError> {
        let inner = Client::with_options(&self.service_root, self.timeout)?;
        tracing::debug!("Using service root {}", inner.service_root());
        Ok(TripPinClient::new(inner).with_retry(self.retry))
    }
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, TripPinError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            TripPinError::Config(format!("{} has invalid value '{}'", key, raw.trim()))
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_SERVICE_ROOT, "http://localhost:8080/odata"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_RETRY_MAX, "2"),
            (ENV_RETRY_BASE_MS, "100"),
            (ENV_RETRY_MAX_MS, "400"),
        ]))
        .unwrap();
        assert_eq!(config.service_root, "http://localhost:8080/odata");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.base_delay, Duration::from_millis(100));
        assert_eq!(config.retry.max_delay, Duration::from_millis(400));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[(ENV_RETRY_MAX, "  ")])).unwrap();
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, TripPinError::Config(ref msg) if msg.contains(ENV_TIMEOUT_SECS)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "0")])).unwrap_err();
        assert!(matches!(err, TripPinError::Config(_)));
    }

    #[test]
    fn test_invalid_root_fails_on_build() {
        let config = ClientConfig::default().with_service_root("not a url");
        let err = config.build_client().unwrap_err();
        assert!(matches!(err, TripPinError::Api(trippin_api::Error::InvalidUrl(_))));
    }
}
