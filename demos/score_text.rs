//! Scoring example demonstrating the dispatcher's degradation path.
//!
//! This example shows how to:
//! - Build a dispatcher around a provider
//! - Read scores out of different reply styles
//! - Watch the circuit open and the fallback scorer take over
//! - Load a real HTTP provider from `SCORING_*` variables, if set
//!
//! Run with: cargo run --example score_text
//! Audit events only: RUST_LOG=scoreguard::audit=info cargo run --example score_text

use scoreguard::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DOCUMENT: &str = "The board approved a climate transition plan. Scope 1 carbon \
    emissions fell 12% and renewable energy now covers 40% of sites. Employee safety \
    training and an anti-corruption policy are audited annually.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Scoreguard Scoring Example ===\n");

    println!("--- Reply styles ---");
    for reply in [
        "Analysis complete. Score: 0.85. Good compliance.",
        "Compliance stands at 72%",
        "Rated 0.6 out of 1.",
        "Disclosures are excellent and strong; the entity is compliant.",
    ] {
        let dispatcher = ScoringDispatcher::builder()
            .with_provider(MockProvider::replying(reply).with_name("demo"))
            .build()?;
        let result = dispatcher.score(DOCUMENT).await;
        println!("  {:<66} -> {:.2}", reply, result.score);
    }

    println!("\n--- Failing provider ---");
    let provider = Arc::new(
        MockProvider::failing(ScoreError::unavailable("flaky", 503, "overloaded"))
            .with_name("flaky"),
    );
    let dispatcher = ScoringDispatcher::builder()
        .with_arc_provider(provider.clone())
        .with_breaker_config(
            CircuitBreakerConfig::new()
                .with_failure_threshold(3)
                .with_recovery_timeout(Duration::from_secs(2)),
        )
        .with_retry(
            RetryPolicy::new()
                .with_max_retries(1)
                .with_base_delay(Duration::from_millis(50)),
        )
        .build()?;

    for i in 1..=5 {
        let result = dispatcher.score(DOCUMENT).await;
        let metrics = dispatcher.circuit_metrics();
        println!(
            "  Request #{i}: circuit={} score={:.2} provider={} network_calls={} rejected={}",
            dispatcher.circuit_state().name(),
            result.score,
            result.provider_name,
            provider.call_count(),
            metrics.rejected_requests,
        );
    }

    println!("\nFallback feedback:\n{}", dispatcher.score(DOCUMENT).await.feedback);

    if std::env::var("SCORING_ACTIVE_PROVIDER").is_ok() {
        println!("\n--- Configured provider ---");
        let config = ScoringConfig::from_env()?;
        let dispatcher = ScoringDispatcher::from_config(&config)?;
        let result = dispatcher.score(DOCUMENT).await;
        println!(
            "  {} scored {:.2} in {} ms",
            result.provider_name, result.score, result.processing_time_ms
        );
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
