//! Mock provider for testing.
//!
//! `MockProvider` answers from a script of queued replies and errors, then
//! falls back to a default reply. It counts every call so tests can assert
//! that an open circuit made no network call at all.

use crate::core::{ScoreError, ScoreOutcome, ScoringProvider};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A scripted provider for tests and demos.
///
/// # Examples
///
/// ```rust
/// use scoreguard::providers::MockProvider;
/// use scoreguard::core::ScoreError;
/// use std::time::Duration;
///
/// // Always replies with the same text
/// let provider = MockProvider::replying("Score: 0.85. Good compliance.");
///
/// // Always fails
/// let provider = MockProvider::failing(ScoreError::unavailable("mock", 503, "down"));
///
/// // Fails once, then answers
/// let provider = MockProvider::replying("Score: 0.4")
///     .with_latency(Duration::from_millis(5));
/// provider.push_error(ScoreError::connection_failed("mock", "reset"));
/// ```
#[derive(Debug)]
pub struct MockProvider {
    /// Name of this provider instance.
    name: String,
    /// Outcomes served in order before the default applies.
    script: Mutex<VecDeque<Result<String, ScoreError>>>,
    /// Outcome once the script is exhausted.
    default: Result<String, ScoreError>,
    /// Simulated latency per call.
    latency: Option<Duration>,
    /// Counter for fetch operations.
    call_count: AtomicU64,
    /// Prompts received, most recent last.
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Creates a mock provider that always replies with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_default(Ok(reply.into()))
    }

    /// Creates a mock provider that always fails with `error`.
    pub fn failing(error: ScoreError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default: Result<String, ScoreError>) -> Self {
        Self {
            name: "mock".to_string(),
            script: Mutex::new(VecDeque::new()),
            default,
            latency: None,
            call_count: AtomicU64::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Sets the name of this provider.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the simulated latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queues a reply ahead of the default.
    pub fn push_response(&self, reply: impl Into<String>) {
        self.script_guard().push_back(Ok(reply.into()));
    }

    /// Queues an error ahead of the default.
    pub fn push_error(&self, error: ScoreError) {
        self.script_guard().push_back(Err(error));
    }

    /// Returns the number of fetches performed.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Returns the prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn script_guard(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, ScoreError>>> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ScoringProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, prompt: &str) -> ScoreOutcome<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());

        let outcome = self
            .script_guard()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        outcome
    }
}
