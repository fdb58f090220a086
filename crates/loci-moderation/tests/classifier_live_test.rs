//! Live integration tests for the chat-completion classifier.
//!
//! These tests hit a real Ollama-compatible `/api/chat` endpoint and are
//! disabled by default.
//!
//! # Quick Start (Ollama)
//!
//! ```bash
//! # Enable external integration tests and configure endpoint
//! RUN_EXTERNAL_TESTS=1 \
//! LOCI_CLASSIFIER_BASE_URL=http://localhost:11434 \
//! LOCI_CLASSIFIER_MODEL=llama3.2 \
//! cargo test --package loci-moderation --test classifier_live_test -- --nocapture
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | RUN_EXTERNAL_TESTS | (unset) | Set to "1" or "true" to enable tests |
//! | LOCI_CLASSIFIER_BASE_URL | http://localhost:11434 | Chat endpoint base |
//! | LOCI_CLASSIFIER_MODEL | llama3.2 | Model name |
//! | LOCI_CLASSIFIER_TIMEOUT_SECS | 30 | Request timeout (seconds) |

use std::sync::Arc;

use loci_core::{ClassifierBackend, ClassifierVerdict, NoteValidator};
use loci_moderation::{ChatClassifier, ClassifiedValidator};

/// Check if external integration tests should run.
/// Set RUN_EXTERNAL_TESTS=1 or RUN_EXTERNAL_TESTS=true to enable.
fn should_run_external_tests() -> bool {
    std::env::var("RUN_EXTERNAL_TESTS")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Skip test with message if external tests are not enabled.
/// Returns true if the test should be skipped.
fn skip_if_external_tests_disabled(test_name: &str) -> bool {
    if !should_run_external_tests() {
        println!(
            "⏭️  Skipping {} - set RUN_EXTERNAL_TESTS=1 to enable external API tests",
            test_name
        );
        return true;
    }
    false
}

fn print_config(classifier: &ChatClassifier) {
    println!("\n=== Classifier Configuration ===");
    println!("  Model: {}", classifier.model_name());
    println!(
        "  Base URL: {}",
        std::env::var("LOCI_CLASSIFIER_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string())
    );
    println!("================================\n");
}

#[tokio::test]
async fn test_live_benign_note_is_safe() {
    if skip_if_external_tests_disabled("test_live_benign_note_is_safe") {
        return;
    }

    let classifier = ChatClassifier::from_env();
    print_config(&classifier);

    let text = "Great coffee shop, quiet patio in the evening.";
    println!("Classifying: {}", text);

    let verdict = classifier.classify(text).await.expect("classifier call");
    println!("Verdict: {:?}", verdict);
    assert_eq!(verdict, ClassifierVerdict::Safe);
}

#[tokio::test]
async fn test_live_threatening_note_is_harmful() {
    if skip_if_external_tests_disabled("test_live_threatening_note_is_harmful") {
        return;
    }

    let classifier = ChatClassifier::from_env();
    print_config(&classifier);

    let text = "If I see you at this spot again I will hurt you.";
    println!("Classifying: {}", text);

    let verdict = classifier.classify(text).await.expect("classifier call");
    println!("Verdict: {:?}", verdict);
    assert_eq!(verdict, ClassifierVerdict::Harmful);
}

#[tokio::test]
async fn test_live_full_gate_allows_benign_note() {
    if skip_if_external_tests_disabled("test_live_full_gate_allows_benign_note") {
        return;
    }

    let validator = ClassifiedValidator::new(Arc::new(ChatClassifier::from_env()));

    let verdict = validator.validate("Lovely sunset view here").await;
    println!("Gate verdict: {:?}", verdict);
    assert!(verdict.is_allowed());
}
