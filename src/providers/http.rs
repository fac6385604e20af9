//! HTTP scoring provider.
//!
//! One `HttpProvider` instance talks to one configured endpoint, in one of
//! the supported [`WireFormat`]s. Each `fetch` is exactly one POST; retries
//! and circuit breaking live in the dispatcher.
//!
//! # Status mapping
//!
//! | Status        | Error                  | Transient |
//! |---------------|------------------------|-----------|
//! | 5xx           | `ProviderUnavailable`  | yes       |
//! | 429           | `RateLimited`          | yes       |
//! | 408           | `Timeout`              | yes       |
//! | 401, 403      | `AuthenticationFailed` | no        |
//! | other 4xx     | `Rejected`             | no        |

use crate::core::{ProviderConfig, ScoreError, ScoreOutcome, ScoringProvider, WireFormat};
use crate::providers::wire;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::time::Duration;

/// Header carrying the API key for the `contents` wire format.
pub const CONTENTS_API_KEY_HEADER: &str = "x-goog-api-key";

/// A provider reached over HTTPS with a JSON body.
///
/// # Example
///
/// ```rust,ignore
/// use scoreguard::core::{ProviderConfig, WireFormat};
/// use scoreguard::providers::HttpProvider;
/// use std::time::Duration;
///
/// let config = ProviderConfig::new("alpha", "key", "https://alpha.example/v1/score", WireFormat::Contents);
/// let provider = HttpProvider::new(config, Duration::from_secs(30))?;
/// ```
#[derive(Debug)]
pub struct HttpProvider {
    config: ProviderConfig,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpProvider {
    /// Creates a provider from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::Configuration` if the configuration is invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: ProviderConfig, timeout: Duration) -> Result<Self, ScoreError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoreError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            timeout,
            client,
        })
    }

    /// Returns the provider configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn request(&self, prompt: &str) -> reqwest::RequestBuilder {
        let payload = wire::build_payload(self.config.format, prompt, self.config.model.as_deref());
        let request = self.client.post(&self.config.endpoint).json(&payload);

        match self.config.format {
            WireFormat::Contents => {
                request.header(CONTENTS_API_KEY_HEADER, self.config.api_key.expose_secret())
            }
            WireFormat::ChatMessages => request.bearer_auth(self.config.api_key.expose_secret()),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ScoreError {
        if e.is_timeout() {
            ScoreError::timeout(&self.config.name, self.timeout)
        } else {
            ScoreError::connection_failed(&self.config.name, e.to_string())
        }
    }
}

#[async_trait]
impl ScoringProvider for HttpProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self, prompt: &str) -> ScoreOutcome<String> {
        let response = self
            .request(prompt)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str(&body)
                .ok()
                .and_then(|json| wire::error_message(&json))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

            tracing::debug!(
                provider = %self.config.name,
                status = status.as_u16(),
                message = %message,
                "Provider returned an error status"
            );

            return Err(classify_status(
                &self.config.name,
                status.as_u16(),
                retry_after,
                message,
                self.timeout,
            ));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ScoreError::timeout(&self.config.name, self.timeout)
            } else {
                ScoreError::parse(&self.config.name, e.to_string())
            }
        })?;

        wire::extract_text(self.config.format, &self.config.name, &body)
    }
}

/// Maps a non-success HTTP status to a typed error.
pub fn classify_status(
    provider: &str,
    status: u16,
    retry_after: Option<Duration>,
    message: String,
    timeout: Duration,
) -> ScoreError {
    match status {
        408 => ScoreError::timeout(provider, timeout),
        429 => ScoreError::RateLimited {
            provider: provider.to_string(),
            retry_after,
        },
        401 | 403 => ScoreError::AuthenticationFailed {
            provider: provider.to_string(),
            reason: message,
        },
        500..=599 => ScoreError::unavailable(provider, status, message),
        _ => ScoreError::Rejected {
            provider: provider.to_string(),
            status,
            reason: message,
        },
    }
}

/// Parses a `Retry-After` header given in whole seconds.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
