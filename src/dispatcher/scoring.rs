//! The scoring dispatcher.

use crate::audit;
use crate::circuit_breaker::{Admission, BreakerMetrics, BreakerState, CircuitBreaker, CircuitBreakerConfig};
use crate::core::{ArcProvider, ScoreError, ScoreOutcome, ScoreResult, ScoringInput, ScoringProvider, DEFAULT_MAX_INPUT_CHARS};
use crate::dispatcher::retry::RetryPolicy;
use crate::scoring::{FallbackScorer, ScoreExtractor};

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Instructions prepended to the document when the caller supplies none.
pub const DEFAULT_INSTRUCTIONS: &str = "Assess the following submission for ESG compliance. \
Reply with a line of the form 'Score: X' where X is a number between 0 and 1, \
followed by brief feedback.";

/// Configuration for the scoring dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Retry policy for provider calls made while the circuit is closed.
    pub retry: RetryPolicy,

    /// Timeout for a single provider attempt.
    pub request_timeout: Duration,

    /// Characters of input sent to the provider before truncation.
    pub max_input_chars: usize,

    /// Prompt preamble used by `ScoringDispatcher::score`.
    pub instructions: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

impl DispatcherConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the input length limit.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    /// Sets the default prompt preamble.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Checks that the numeric settings are usable.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.max_input_chars == 0 {
            return Err(ScoreError::configuration("max_input_chars must be at least 1"));
        }
        if self.request_timeout.is_zero() {
            return Err(ScoreError::configuration("request_timeout must be greater than zero"));
        }
        if self.retry.base_delay > self.retry.max_delay {
            return Err(ScoreError::configuration(format!(
                "base_delay ({:?}) must not exceed max_delay ({:?})",
                self.retry.base_delay, self.retry.max_delay
            )));
        }
        Ok(())
    }
}

/// Builder for creating a `ScoringDispatcher`.
pub struct ScoringDispatcherBuilder {
    provider: Option<ArcProvider>,
    breaker: CircuitBreakerConfig,
    config: DispatcherConfig,
}

impl ScoringDispatcherBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            provider: None,
            breaker: CircuitBreakerConfig::default(),
            config: DispatcherConfig::default(),
        }
    }

    /// Sets the active provider.
    pub fn with_provider<P: ScoringProvider + 'static>(mut self, provider: P) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Sets the active provider, already wrapped in an Arc.
    pub fn with_arc_provider(mut self, provider: ArcProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the circuit breaker configuration.
    pub fn with_breaker_config(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = config;
        self
    }

    /// Sets the whole dispatcher configuration.
    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Sets the input length limit.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.config.max_input_chars = max;
        self
    }

    /// Sets the default prompt preamble.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.config.instructions = instructions.into();
        self
    }

    /// Builds the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::Configuration` if no provider was set or the
    /// configuration is invalid.
    pub fn build(self) -> Result<ScoringDispatcher, ScoreError> {
        let provider = self
            .provider
            .ok_or_else(|| ScoreError::configuration("An active scoring provider is required"))?;
        self.config.validate()?;

        let breaker = CircuitBreaker::new(provider.name(), self.breaker);

        tracing::info!(
            provider = %provider.name(),
            failure_threshold = breaker.config().failure_threshold,
            recovery_timeout_ms = breaker.config().recovery_timeout.as_millis() as u64,
            max_retries = self.config.retry.max_retries,
            "Scoring dispatcher ready"
        );

        Ok(ScoringDispatcher {
            provider,
            breaker,
            config: self.config,
            extractor: ScoreExtractor::new(),
            fallback: FallbackScorer::new(),
        })
    }
}

impl Default for ScoringDispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scores text through the active provider, degrading to the offline
/// fallback scorer when the provider cannot answer.
///
/// `score` never fails. The call path is circuit breaker, then retry
/// policy, then one provider request per attempt, then score extraction.
/// Any failure along that path, including an open circuit, hands the
/// original text to the fallback scorer.
///
/// # Example
///
/// ```rust,ignore
/// use scoreguard::prelude::*;
///
/// let dispatcher = ScoringDispatcher::builder()
///     .with_provider(MockProvider::replying("Score: 0.85"))
///     .build()?;
///
/// let result = dispatcher.score("Our emissions fell 12% year on year.").await;
/// assert_eq!(result.score, 0.85);
/// ```
pub struct ScoringDispatcher {
    /// The active provider.
    provider: ArcProvider,
    /// Breaker guarding the active provider.
    breaker: CircuitBreaker,
    /// Configuration.
    config: DispatcherConfig,
    extractor: ScoreExtractor,
    fallback: FallbackScorer,
}

impl ScoringDispatcher {
    /// Creates a new builder.
    pub fn builder() -> ScoringDispatcherBuilder {
        ScoringDispatcherBuilder::new()
    }

    /// Builds a dispatcher with an HTTP client for the configured active provider.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::Configuration` if the configuration is invalid or
    /// the active provider is missing or unusable.
    #[cfg(feature = "http-providers")]
    pub fn from_config(config: &crate::config::ScoringConfig) -> Result<Self, ScoreError> {
        config.validate()?;
        let provider_config = config.active_provider()?.clone();
        let provider =
            crate::providers::HttpProvider::new(provider_config, config.dispatcher.request_timeout)?;

        Self::builder()
            .with_provider(provider)
            .with_breaker_config(config.breaker.clone())
            .with_config(config.dispatcher.clone())
            .build()
    }

    /// Scores `text` using the configured instructions.
    pub async fn score(&self, text: &str) -> ScoreResult {
        self.score_with_instructions(text, &self.config.instructions)
            .await
    }

    /// Scores `text` with a caller-supplied prompt preamble.
    pub async fn score_with_instructions(&self, text: &str, instructions: &str) -> ScoreResult {
        let start = Instant::now();

        let input = match ScoringInput::prepare(text, self.config.max_input_chars) {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping provider for empty input");
                return ScoreResult::no_content();
            }
        };

        audit::emit_score_started(
            self.provider.name(),
            input.original_chars(),
            input.is_truncated(),
        );
        if input.is_truncated() {
            tracing::debug!(
                provider = %self.provider.name(),
                original_chars = input.original_chars(),
                max_input_chars = self.config.max_input_chars,
                "Input truncated before sending"
            );
        }

        let prompt = build_prompt(instructions, input.as_str());

        let result = match self.fetch_guarded(&prompt).await {
            Ok(raw) => {
                let extraction = self.extractor.extract_detailed(&raw);
                tracing::debug!(
                    provider = %self.provider.name(),
                    score = extraction.score,
                    method = ?extraction.method,
                    "Score extracted from provider reply"
                );
                ScoreResult::new(extraction.score, raw, self.provider.name(), start.elapsed())
            }
            Err(e) => {
                if e.is_circuit_open() {
                    tracing::debug!(
                        provider = %self.provider.name(),
                        error = %e,
                        "Circuit open, using fallback scorer"
                    );
                } else {
                    tracing::warn!(
                        provider = %self.provider.name(),
                        error = %e,
                        "Provider could not score, using fallback scorer"
                    );
                }
                audit::emit_fallback_engaged(self.provider.name(), &e);
                self.fallback.score(text, start.elapsed())
            }
        };

        audit::emit_score_completed(&result, input.is_truncated());
        result
    }

    /// Returns the active provider's name.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Returns a snapshot of the active provider's circuit state.
    pub fn circuit_state(&self) -> BreakerState {
        self.breaker.state()
    }

    /// Returns the active provider's circuit metrics.
    pub fn circuit_metrics(&self) -> BreakerMetrics {
        self.breaker.metrics()
    }

    /// Closes the circuit and clears its counters.
    pub fn reset_circuit(&self) {
        self.breaker.reset();
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// One breaker-guarded call: a full retry burst while closed, a single
    /// attempt while probing.
    async fn fetch_guarded(&self, prompt: &str) -> ScoreOutcome<String> {
        self.breaker
            .call(|admission| async move {
                match admission {
                    Admission::Probe => self.fetch_once(prompt).await,
                    Admission::Normal => {
                        self.config
                            .retry
                            .run(|_attempt| self.fetch_once(prompt))
                            .await
                    }
                }
            })
            .await
    }

    async fn fetch_once(&self, prompt: &str) -> ScoreOutcome<String> {
        let provider = self.provider.name();
        match tokio::time::timeout(self.config.request_timeout, self.provider.fetch(prompt)).await {
            Ok(Ok(raw)) if raw.trim().is_empty() => {
                Err(ScoreError::parse(provider, "provider returned an empty reply"))
            }
            Ok(result) => result,
            Err(_) => Err(ScoreError::timeout(provider, self.config.request_timeout)),
        }
    }
}

impl std::fmt::Debug for ScoringDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringDispatcher")
            .field("provider", &self.provider.name())
            .field("circuit", &self.breaker.state().name())
            .field("config", &self.config)
            .finish()
    }
}

fn build_prompt(instructions: &str, text: &str) -> String {
    if instructions.trim().is_empty() {
        text.to_string()
    } else {
        format!("{instructions}\n\n{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FALLBACK_PROVIDER, NO_CONTENT_FEEDBACK, TRUNCATION_MARKER};
    use crate::providers::MockProvider;

    fn fast_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_retries(max_retries)
            .with_base_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(40))
    }

    fn dispatcher_with(provider: &Arc<MockProvider>, max_retries: u32) -> ScoringDispatcher {
        ScoringDispatcher::builder()
            .with_arc_provider(provider.clone())
            .with_retry(fast_retry(max_retries))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_provider() {
        let err = ScoringDispatcher::builder().build().unwrap_err();
        assert!(matches!(err, ScoreError::Configuration { .. }));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let err = ScoringDispatcher::builder()
            .with_provider(MockProvider::replying("Score: 0.5"))
            .with_max_input_chars(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ScoreError::Configuration { .. }));

        let err = ScoringDispatcher::builder()
            .with_provider(MockProvider::replying("Score: 0.5"))
            .with_retry(
                RetryPolicy::new()
                    .with_base_delay(Duration::from_secs(5))
                    .with_max_delay(Duration::from_secs(1)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, ScoreError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_success_uses_provider_reply() {
        let provider = Arc::new(MockProvider::replying("Score: 0.85. Good compliance.").with_name("alpha"));
        let dispatcher = dispatcher_with(&provider, 3);

        let result = dispatcher.score("Our board reviews climate risk quarterly.").await;

        assert_eq!(result.score, 0.85);
        assert_eq!(result.provider_name, "alpha");
        assert_eq!(result.feedback, "Score: 0.85. Good compliance.");
        assert_eq!(provider.call_count(), 1);
        assert!(dispatcher.circuit_state().is_closed());
    }

    #[tokio::test]
    async fn test_blank_input_skips_provider() {
        let provider = Arc::new(MockProvider::replying("Score: 0.85"));
        let dispatcher = dispatcher_with(&provider, 3);

        for text in ["", "   ", "\n\t "] {
            let result = dispatcher.score(text).await;
            assert_eq!(result.score, 0.0);
            assert_eq!(result.feedback, NO_CONTENT_FEEDBACK);
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_includes_instructions() {
        let provider = Arc::new(MockProvider::replying("Score: 0.5"));
        let dispatcher = dispatcher_with(&provider, 0);

        dispatcher.score("document body").await;
        dispatcher
            .score_with_instructions("document body", "Rate governance only.")
            .await;

        let prompts = provider.prompts();
        assert_eq!(prompts[0], format!("{DEFAULT_INSTRUCTIONS}\n\ndocument body"));
        assert_eq!(prompts[1], "Rate governance only.\n\ndocument body");
    }

    #[tokio::test]
    async fn test_long_input_truncated_for_provider_only() {
        let provider = Arc::new(MockProvider::failing(ScoreError::parse("mock", "bad body")));
        let dispatcher = ScoringDispatcher::builder()
            .with_arc_provider(provider.clone())
            .with_retry(fast_retry(0))
            .with_max_input_chars(100)
            .with_instructions("")
            .build()
            .unwrap();

        let text = "carbon ".repeat(50);
        let result = dispatcher.score(&text).await;

        let prompt = &provider.prompts()[0];
        assert!(prompt.ends_with(TRUNCATION_MARKER));
        assert_eq!(prompt.chars().count(), 100 + TRUNCATION_MARKER.chars().count());

        // The fallback scorer sees the whole text.
        assert_eq!(result.provider_name, FALLBACK_PROVIDER);
        let expected = FallbackScorer::new().score(&text, Duration::ZERO).score;
        assert_eq!(result.score, expected);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let provider = Arc::new(MockProvider::failing(ScoreError::AuthenticationFailed {
            provider: "mock".to_string(),
            reason: "bad key".to_string(),
        }));
        let dispatcher = dispatcher_with(&provider, 3);

        let result = dispatcher.score("Employee safety training is in place.").await;

        assert!(result.is_fallback());
        assert_eq!(provider.call_count(), 1);
        assert_eq!(dispatcher.circuit_state().consecutive_failures, 1);
    }

    #[tokio::test]
    async fn test_blank_reply_is_unusable() {
        let provider = Arc::new(MockProvider::replying("   "));
        let dispatcher = dispatcher_with(&provider, 3);

        let result = dispatcher.score("Some submission").await;

        assert!(result.is_fallback());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let provider = Arc::new(
            MockProvider::replying("Score: 0.9").with_latency(Duration::from_secs(60)),
        );
        let dispatcher = ScoringDispatcher::builder()
            .with_arc_provider(provider.clone())
            .with_retry(fast_retry(1))
            .with_request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let result = dispatcher.score("Water usage is reported.").await;

        assert!(result.is_fallback());
        assert_eq!(provider.call_count(), 2);
        let metrics = dispatcher.circuit_metrics();
        assert_eq!(metrics.failed_requests, 1);
    }

    #[tokio::test]
    async fn test_reset_circuit() {
        let provider = Arc::new(MockProvider::failing(ScoreError::unavailable("mock", 503, "down")));
        let dispatcher = ScoringDispatcher::builder()
            .with_arc_provider(provider.clone())
            .with_retry(RetryPolicy::no_retry())
            .with_breaker_config(CircuitBreakerConfig::new().with_failure_threshold(1))
            .build()
            .unwrap();

        dispatcher.score("text").await;
        assert!(dispatcher.circuit_state().is_open());

        dispatcher.reset_circuit();
        assert!(dispatcher.circuit_state().is_closed());
        assert_eq!(dispatcher.provider_name(), "mock");
    }
}
