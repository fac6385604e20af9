//! End-to-end behavior of the scoring dispatcher against scripted providers.

use scoreguard::core::{FALLBACK_PROVIDER, NO_CONTENT_FEEDBACK};
use scoreguard::prelude::*;
use scoreguard::providers::MockProvider;
use scoreguard::scoring::{ExtractionMethod, ScoreExtractor};

use std::sync::Arc;
use std::time::Duration;

const RECOVERY: Duration = Duration::from_secs(60);

fn transient() -> ScoreError {
    ScoreError::unavailable("alpha", 503, "overloaded")
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_retries(max_retries)
        .with_base_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_millis(400))
}

fn dispatcher(provider: &Arc<MockProvider>, threshold: u32, max_retries: u32) -> ScoringDispatcher {
    ScoringDispatcher::builder()
        .with_arc_provider(provider.clone())
        .with_breaker_config(
            CircuitBreakerConfig::new()
                .with_failure_threshold(threshold)
                .with_recovery_timeout(RECOVERY),
        )
        .with_retry(fast_retry(max_retries))
        .build()
        .unwrap()
}

const SUBMISSION: &str = "Our board oversees climate risk. Carbon emissions and energy use \
    are disclosed annually, and employee safety training covers all sites.";

#[tokio::test]
async fn scenario_a_score_phrase() {
    let provider = Arc::new(
        MockProvider::replying("Analysis complete. Score: 0.85. Good compliance.").with_name("alpha"),
    );
    let dispatcher = dispatcher(&provider, 5, 3);

    let result = dispatcher.score(SUBMISSION).await;

    assert_eq!(result.score, 0.85);
    assert_eq!(result.provider_name, "alpha");
    assert_eq!(result.feedback, "Analysis complete. Score: 0.85. Good compliance.");
}

#[tokio::test]
async fn scenario_b_percentage() {
    let provider = Arc::new(MockProvider::replying("Compliance stands at 72%"));
    let dispatcher = dispatcher(&provider, 5, 3);

    let result = dispatcher.score(SUBMISSION).await;

    assert_eq!(result.score, 0.72);
    assert!(!result.is_fallback());
}

#[tokio::test]
async fn scenario_c_sentiment() {
    let reply = "The disclosures are excellent and the controls strong; the entity is compliant.";
    let provider = Arc::new(MockProvider::replying(reply));
    let dispatcher = dispatcher(&provider, 5, 3);

    let result = dispatcher.score(SUBMISSION).await;

    assert!(result.score > 0.75 && result.score <= 1.0);
    assert_eq!(result.score, 0.85);
    assert_eq!(
        ScoreExtractor::new().extract_detailed(reply).method,
        ExtractionMethod::Sentiment {
            positive: 3,
            negative: 0,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn scenario_d_open_circuit_skips_network() {
    let provider = Arc::new(MockProvider::failing(transient()).with_name("alpha"));
    let dispatcher = dispatcher(&provider, 5, 2);

    for call in 1..=5 {
        let result = dispatcher.score(SUBMISSION).await;
        assert_eq!(result.provider_name, FALLBACK_PROVIDER, "call {call}");
    }
    assert!(dispatcher.circuit_state().is_open());
    // Each failed call spent its full retry budget.
    assert_eq!(provider.call_count(), 5 * 3);

    let started = tokio::time::Instant::now();
    let result = dispatcher.score(SUBMISSION).await;

    assert_eq!(provider.call_count(), 15);
    assert_eq!(result.provider_name, FALLBACK_PROVIDER);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(dispatcher.circuit_metrics().rejected_requests, 1);
}

#[tokio::test(start_paused = true)]
async fn scenario_e_probe_is_single_attempt() {
    let provider = Arc::new(MockProvider::failing(transient()));
    let dispatcher = dispatcher(&provider, 2, 3);

    dispatcher.score(SUBMISSION).await;
    dispatcher.score(SUBMISSION).await;
    assert!(dispatcher.circuit_state().is_open());
    assert_eq!(provider.call_count(), 8);

    tokio::time::advance(RECOVERY + Duration::from_millis(1)).await;

    let result = dispatcher.score(SUBMISSION).await;

    // One probe, no retry burst, and the failed probe re-opens the circuit.
    assert_eq!(provider.call_count(), 9);
    assert!(result.is_fallback());
    assert!(dispatcher.circuit_state().is_open());
}

#[tokio::test(start_paused = true)]
async fn successful_probe_closes_circuit() {
    let provider = Arc::new(MockProvider::replying("Score: 0.64").with_name("alpha"));
    for _ in 0..4 {
        provider.push_error(transient());
    }
    let dispatcher = dispatcher(&provider, 2, 1);

    dispatcher.score(SUBMISSION).await;
    dispatcher.score(SUBMISSION).await;
    assert!(dispatcher.circuit_state().is_open());

    tokio::time::advance(RECOVERY + Duration::from_millis(1)).await;

    let result = dispatcher.score(SUBMISSION).await;
    assert_eq!(result.score, 0.64);
    assert_eq!(result.provider_name, "alpha");

    let state = dispatcher.circuit_state();
    assert!(state.is_closed());
    assert_eq!(state.consecutive_failures, 0);
    assert_eq!(dispatcher.circuit_metrics().times_closed, 1);
}

#[tokio::test(start_paused = true)]
async fn recovery_timeout_is_strict() {
    let provider = Arc::new(MockProvider::failing(transient()));
    let dispatcher = dispatcher(&provider, 1, 0);

    dispatcher.score(SUBMISSION).await;
    assert_eq!(provider.call_count(), 1);

    tokio::time::advance(RECOVERY).await;
    dispatcher.score(SUBMISSION).await;
    assert_eq!(provider.call_count(), 1);

    tokio::time::advance(Duration::from_millis(1)).await;
    dispatcher.score(SUBMISSION).await;
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_probe() {
    let provider = Arc::new(
        MockProvider::replying("Score: 0.9").with_latency(Duration::from_millis(500)),
    );
    provider.push_error(transient());
    let dispatcher = dispatcher(&provider, 1, 0);

    dispatcher.score(SUBMISSION).await;
    assert!(dispatcher.circuit_state().is_open());
    tokio::time::advance(RECOVERY + Duration::from_millis(1)).await;

    let (probe, bystander) =
        futures::join!(dispatcher.score(SUBMISSION), dispatcher.score(SUBMISSION));

    assert_eq!(probe.score, 0.9);
    assert!(bystander.is_fallback());
    assert_eq!(provider.call_count(), 2);
    assert!(dispatcher.circuit_state().is_closed());
}

#[tokio::test]
async fn permanent_errors_fall_back_without_retry() {
    let provider = Arc::new(MockProvider::failing(ScoreError::parse(
        "alpha",
        "missing candidates[0].content.parts[0].text",
    )));
    let dispatcher = dispatcher(&provider, 5, 3);

    let result = dispatcher.score(SUBMISSION).await;

    assert!(result.is_fallback());
    assert_eq!(provider.call_count(), 1);
    assert!(result.score >= 0.5 && result.score <= 0.95);
}

#[tokio::test]
async fn empty_input_never_reaches_provider() {
    let provider = Arc::new(MockProvider::replying("Score: 1.0"));
    let dispatcher = dispatcher(&provider, 5, 3);

    let result = dispatcher.score(" \n ").await;

    assert_eq!(result.score, 0.0);
    assert_eq!(result.feedback, NO_CONTENT_FEEDBACK);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn scores_always_in_unit_interval() {
    let replies = [
        "Score: 7",
        "Score: -3",
        "150%",
        "NaN",
        "2.5 out of 1",
        "poor weak lacking missing inadequate insufficient deficient incomplete",
        "excellent strong good compliant robust comprehensive effective thorough",
    ];

    for reply in replies {
        let provider = Arc::new(MockProvider::replying(reply));
        let dispatcher = dispatcher(&provider, 5, 0);
        let result = dispatcher.score(SUBMISSION).await;
        assert!((0.0..=1.0).contains(&result.score), "{reply}: {}", result.score);
    }

    let provider = Arc::new(MockProvider::failing(transient()));
    let dispatcher = dispatcher(&provider, 1, 0);
    let long = "renewable ".repeat(10_000);
    for text in ["a", SUBMISSION, long.as_str()] {
        let result = dispatcher.score(text).await;
        assert!((0.0..=0.95).contains(&result.score));
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn backoff_does_not_stall_other_scoring() {
    let failing = Arc::new(MockProvider::failing(transient()).with_name("alpha"));
    let backing_off = ScoringDispatcher::builder()
        .with_arc_provider(failing.clone())
        .with_retry(
            RetryPolicy::new()
                .with_max_retries(2)
                .with_base_delay(Duration::from_secs(30))
                .with_max_delay(Duration::from_secs(60)),
        )
        .build()
        .unwrap();
    let healthy = ScoringDispatcher::builder()
        .with_provider(
            MockProvider::replying("Score: 0.7")
                .with_name("beta")
                .with_latency(Duration::from_millis(10)),
        )
        .build()
        .unwrap();

    let started = tokio::time::Instant::now();
    let slow = backing_off.score(SUBMISSION);
    tokio::pin!(slow);

    tokio::select! {
        _ = &mut slow => panic!("retry burst finished before the healthy request"),
        result = healthy.score(SUBMISSION) => {
            assert_eq!(result.score, 0.7);
            assert_eq!(result.provider_name, "beta");
        }
    }
    assert!(started.elapsed() < Duration::from_secs(1));
    // Still sleeping before its first retry.
    assert_eq!(failing.call_count(), 1);

    let result = slow.await;
    assert!(result.is_fallback());
    assert_eq!(failing.call_count(), 3);
    assert!(started.elapsed() >= Duration::from_secs(90));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scoring_is_safe() {
    let provider = Arc::new(MockProvider::replying("Score: 0.5"));
    let dispatcher = Arc::new(dispatcher(&provider, 5, 0));

    let handles: Vec<_> = (0..64)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.score(&format!("document {i}")).await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert_eq!(result.unwrap().score, 0.5);
    }
    assert_eq!(provider.call_count(), 64);
    assert_eq!(dispatcher.circuit_metrics().successful_requests, 64);
}
