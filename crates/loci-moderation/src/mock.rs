//! Mock classifier backend for deterministic testing.
//!
//! Lets tests script verdicts, outages, and latency without a live
//! endpoint, and assert on exactly which texts reached the classifier.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use loci_core::{ClassifierBackend, ClassifierVerdict, Error, Result};

/// Mock classifier for testing.
#[derive(Clone)]
pub struct MockClassifier {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    default_verdict: ClassifierVerdict,
    harmful_markers: Vec<String>,
    fail_all: bool,
    latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_verdict: ClassifierVerdict::Safe,
            harmful_markers: Vec::new(),
            fail_all: false,
            latency_ms: 0,
        }
    }
}

impl MockClassifier {
    /// Create a mock that answers `Safe` for everything.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the verdict returned when no harmful marker matches.
    pub fn with_default_verdict(mut self, verdict: ClassifierVerdict) -> Self {
        Arc::make_mut(&mut self.config).default_verdict = verdict;
        self
    }

    /// Texts containing this substring classify as `Harmful`.
    pub fn with_harmful_marker(mut self, marker: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config)
            .harmful_markers
            .push(marker.into());
        self
    }

    /// Every call fails with a transport error, simulating an outage.
    pub fn with_failure(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_all = true;
        self
    }

    /// Simulated latency for all calls.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// All texts classified so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of classify calls made.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClassifierBackend for MockClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict> {
        self.call_log.lock().unwrap().push(text.to_string());

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail_all {
            return Err(Error::Request("simulated classifier outage".to_string()));
        }

        if self
            .config
            .harmful_markers
            .iter()
            .any(|m| text.contains(m.as_str()))
        {
            return Ok(ClassifierVerdict::Harmful);
        }

        Ok(self.config.default_verdict)
    }

    fn model_name(&self) -> String {
        "mock-classifier".to_string()
    }
}
