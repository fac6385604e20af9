//! Configuration loading.
//!
//! `ScoringConfig` gathers everything needed to build a
//! [`ScoringDispatcher`](crate::dispatcher::ScoringDispatcher) from
//! `SCORING_*` environment variables:
//!
//! | Variable                          | Default    |
//! |-----------------------------------|------------|
//! | `SCORING_ACTIVE_PROVIDER`         | (required) |
//! | `SCORING_PROVIDERS`               | active only |
//! | `SCORING_<NAME>_API_KEY`          | (required for the active provider) |
//! | `SCORING_<NAME>_ENDPOINT`         | (required for the active provider) |
//! | `SCORING_<NAME>_FORMAT`           | `contents` |
//! | `SCORING_<NAME>_MODEL`            | unset      |
//! | `SCORING_<NAME>_ENABLED`          | `true`     |
//! | `SCORING_FAILURE_THRESHOLD`       | 5          |
//! | `SCORING_RECOVERY_TIMEOUT_SECS`   | 60         |
//! | `SCORING_HALF_OPEN_MAX_PROBES`    | 1          |
//! | `SCORING_MAX_RETRIES`             | 3          |
//! | `SCORING_BASE_DELAY_MS`           | 1000       |
//! | `SCORING_MAX_DELAY_MS`            | 10000      |
//! | `SCORING_REQUEST_TIMEOUT_SECS`    | 30         |
//! | `SCORING_MAX_INPUT_CHARS`         | 50000      |
//! | `SCORING_INSTRUCTIONS`            | built-in   |

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::core::{ProviderConfig, ScoreError, WireFormat};
use crate::dispatcher::{DispatcherConfig, RetryPolicy};

use std::env;
use std::str::FromStr;
use std::time::Duration;

const PREFIX: &str = "SCORING_";

/// Full configuration for the scoring layer.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Name of the provider used for every request.
    pub active_provider: String,

    /// Known providers; the active one must be among them.
    pub providers: Vec<ProviderConfig>,

    /// Circuit breaker settings for the active provider.
    pub breaker: CircuitBreakerConfig,

    /// Dispatcher settings.
    pub dispatcher: DispatcherConfig,
}

impl ScoringConfig {
    /// Creates a configuration with a single, active provider.
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            active_provider: provider.name.clone(),
            providers: vec![provider],
            breaker: CircuitBreakerConfig::default(),
            dispatcher: DispatcherConfig::default(),
        }
    }

    /// Adds another known provider.
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.push(provider);
        self
    }

    /// Selects the active provider by name.
    pub fn with_active_provider(mut self, name: impl Into<String>) -> Self {
        self.active_provider = name.into();
        self
    }

    /// Sets the circuit breaker settings.
    pub fn with_breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }

    /// Sets the dispatcher settings.
    pub fn with_dispatcher(mut self, dispatcher: DispatcherConfig) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Loads the configuration from `SCORING_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::Configuration` if a required variable is missing,
    /// a value does not parse, or the result fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ScoreError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{PREFIX}{suffix}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let active_provider = var("ACTIVE_PROVIDER").ok_or_else(|| {
            ScoreError::configuration(format!("{PREFIX}ACTIVE_PROVIDER is not set"))
        })?;

        let mut names = vec![active_provider.clone()];
        if let Some(list) = var("PROVIDERS") {
            for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                if !names.iter().any(|known| known.eq_ignore_ascii_case(name)) {
                    names.push(name.to_string());
                }
            }
        }

        let providers = names
            .iter()
            .map(|name| load_provider(name, &var))
            .collect::<Result<Vec<_>, _>>()?;

        let breaker = CircuitBreakerConfig::new()
            .with_failure_threshold(parse_or(&var, "FAILURE_THRESHOLD", 5)?)
            .with_recovery_timeout(Duration::from_secs(parse_or(&var, "RECOVERY_TIMEOUT_SECS", 60)?))
            .with_half_open_max_probes(parse_or(&var, "HALF_OPEN_MAX_PROBES", 1)?);

        let retry = RetryPolicy::new()
            .with_max_retries(parse_or(&var, "MAX_RETRIES", 3)?)
            .with_base_delay(Duration::from_millis(parse_or(&var, "BASE_DELAY_MS", 1000)?))
            .with_max_delay(Duration::from_millis(parse_or(&var, "MAX_DELAY_MS", 10_000)?));

        let mut dispatcher = DispatcherConfig::new()
            .with_retry(retry)
            .with_request_timeout(Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?))
            .with_max_input_chars(parse_or(&var, "MAX_INPUT_CHARS", 50_000)?);
        if let Some(instructions) = var("INSTRUCTIONS") {
            dispatcher = dispatcher.with_instructions(instructions);
        }

        let config = Self {
            active_provider,
            providers,
            breaker,
            dispatcher,
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the active provider's configuration.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::Configuration` if no provider has that name.
    pub fn active_provider(&self) -> Result<&ProviderConfig, ScoreError> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(&self.active_provider))
            .ok_or_else(|| {
                ScoreError::configuration(format!(
                    "active provider '{}' is not configured",
                    self.active_provider
                ))
            })
    }

    /// Checks that a dispatcher can be built from this configuration.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.active_provider.trim().is_empty() {
            return Err(ScoreError::configuration("active provider name must not be empty"));
        }
        self.active_provider()?.validate()?;

        if self.breaker.failure_threshold == 0 {
            return Err(ScoreError::configuration("failure_threshold must be at least 1"));
        }
        if self.breaker.half_open_max_probes == 0 {
            return Err(ScoreError::configuration("half_open_max_probes must be at least 1"));
        }

        self.dispatcher.validate()
    }
}

fn load_provider<V>(name: &str, var: &V) -> Result<ProviderConfig, ScoreError>
where
    V: Fn(&str) -> Option<String>,
{
    let key = env_key(name);

    let format = match var(&format!("{key}_FORMAT")) {
        Some(raw) => WireFormat::from_str(&raw)?,
        None => WireFormat::Contents,
    };
    let enabled = match var(&format!("{key}_ENABLED")) {
        Some(raw) => parse_bool(&format!("{PREFIX}{key}_ENABLED"), &raw)?,
        None => true,
    };

    let mut provider = ProviderConfig::new(
        name,
        var(&format!("{key}_API_KEY")).unwrap_or_default(),
        var(&format!("{key}_ENDPOINT")).unwrap_or_default(),
        format,
    )
    .with_enabled(enabled);

    if let Some(model) = var(&format!("{key}_MODEL")) {
        provider = provider.with_model(model);
    }

    Ok(provider)
}

/// Upper-cased variable segment for a provider name: `my-llm` becomes `MY_LLM`.
fn env_key(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

fn parse_or<V, T>(var: &V, suffix: &str, default: T) -> Result<T, ScoreError>
where
    V: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(suffix) {
        Some(raw) => raw.parse::<T>().map_err(|_| {
            ScoreError::configuration(format!("{PREFIX}{suffix} has invalid value '{raw}'"))
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ScoreError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ScoreError::configuration(format!("{key} has invalid value '{raw}'"))),
    }
}
