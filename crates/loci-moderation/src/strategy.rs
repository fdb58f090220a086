//! Validation strategies composing the moderation stages.
//!
//! Two shipped strategies behind the [`NoteValidator`] trait:
//! - [`HeuristicValidator`]: local heuristics only.
//! - [`ClassifiedValidator`]: heuristics, then the remote classifier.
//!
//! The classifier stage fails closed: an unreachable or misbehaving
//! classifier rejects the note rather than waving it through.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use loci_core::defaults::ENV_MODERATION_STRATEGY;
use loci_core::{ClassifierBackend, ClassifierVerdict, ModerationStage, NoteValidator, Verdict};

use crate::classifier::ChatClassifier;
use crate::heuristics::HeuristicGate;

/// Rejection reason for harmful or indeterminate classifier outcomes.
pub const REASON_CONTENT_POLICY: &str = "This note violates content policy.";

/// Which validation strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationStrategy {
    /// Local heuristics only.
    Heuristic,
    /// Heuristics, then the remote classifier.
    Classified,
}

impl ModerationStrategy {
    /// Parse a strategy name (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "heuristic" => Some(Self::Heuristic),
            "classified" => Some(Self::Classified),
            _ => None,
        }
    }

    /// Read the strategy from the environment, defaulting to `Classified`.
    pub fn from_env() -> Self {
        match std::env::var(ENV_MODERATION_STRATEGY) {
            Ok(val) => Self::parse(&val).unwrap_or_else(|| {
                warn!(value = %val, "Invalid moderation strategy, using default");
                Self::Classified
            }),
            Err(_) => Self::Classified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::Classified => "classified",
        }
    }
}

/// Heuristics-only strategy.
pub struct HeuristicValidator {
    gate: HeuristicGate,
}

impl HeuristicValidator {
    pub fn new() -> Self {
        Self {
            gate: HeuristicGate::new(),
        }
    }

    /// Validator over a custom gate (e.g. a custom profanity set).
    pub fn with_gate(gate: HeuristicGate) -> Self {
        Self { gate }
    }
}

impl Default for HeuristicValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteValidator for HeuristicValidator {
    async fn validate(&self, text: &str) -> Verdict {
        self.gate.check(text)
    }
}

/// Two-stage strategy: heuristics first, then the remote classifier.
///
/// The classifier never sees text the heuristics rejected. Classifier
/// errors of any kind are absorbed into a rejection with the
/// content-policy reason.
pub struct ClassifiedValidator {
    gate: HeuristicGate,
    classifier: Arc<dyn ClassifierBackend>,
}

impl ClassifiedValidator {
    pub fn new(classifier: Arc<dyn ClassifierBackend>) -> Self {
        Self {
            gate: HeuristicGate::new(),
            classifier,
        }
    }

    /// Validator over a custom gate and classifier.
    pub fn with_gate(gate: HeuristicGate, classifier: Arc<dyn ClassifierBackend>) -> Self {
        Self { gate, classifier }
    }
}

#[async_trait]
impl NoteValidator for ClassifiedValidator {
    async fn validate(&self, text: &str) -> Verdict {
        let verdict = self.gate.check(text);
        if !verdict.is_allowed() {
            return verdict;
        }

        match self.classifier.classify(text).await {
            Ok(ClassifierVerdict::Safe) => Verdict::Allowed,
            Ok(ClassifierVerdict::Harmful) => {
                debug!(
                    model = %self.classifier.model_name(),
                    "Classifier flagged note as harmful"
                );
                Verdict::reject(ModerationStage::Classifier, REASON_CONTENT_POLICY)
            }
            Err(e) => {
                warn!(
                    model = %self.classifier.model_name(),
                    error = %e,
                    "Classifier unavailable, failing closed"
                );
                Verdict::reject(ModerationStage::Classifier, REASON_CONTENT_POLICY)
            }
        }
    }
}

/// Build the validator for an explicit strategy, with the HTTP classifier
/// configured from the environment.
pub fn build_validator(strategy: ModerationStrategy) -> Arc<dyn NoteValidator> {
    info!(strategy = strategy.as_str(), "Moderation strategy selected");
    match strategy {
        ModerationStrategy::Heuristic => Arc::new(HeuristicValidator::new()),
        ModerationStrategy::Classified => Arc::new(ClassifiedValidator::new(Arc::new(
            ChatClassifier::from_env(),
        ))),
    }
}

/// Build the validator selected by the environment.
pub fn validator_from_env() -> Arc<dyn NoteValidator> {
    build_validator(ModerationStrategy::from_env())
}
