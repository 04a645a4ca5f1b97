use crate::config::ClassifierConfig;
use crate::models::Priority;
use crate::triage::error::ClassificationResult;
use crate::triage::lexicon::{Lexicon, MatchStrategy, TierScores};
use crate::triage::normalizer::TextNormalizer;
use crate::triage::sentiment::{SentimentScorer, SentimentScores, VaderScorer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Share of the sentiment signal folded into the tier scores
pub const SENTIMENT_WEIGHT: f64 = 0.3;

/// `high` is chosen when its score is strictly above this value
pub const HIGH_THRESHOLD: f64 = 0.5;

/// `medium` is chosen when its score is strictly above this value
pub const MEDIUM_THRESHOLD: f64 = 0.3;

/// Reported with every classification. It is not a probability and should
/// not be read as one.
pub const PLACEHOLDER_CONFIDENCE: f64 = 1.0;

/// Outcome of triaging one description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub priority: Priority,
    pub confidence: f64,
    pub scores: TierScores,
}

/// Rule-based urgency classifier.
///
/// Owns its lexicon, normalizer and sentiment scorer; built once at startup
/// and shared read-only (usually behind an `Arc`) by every request handler.
pub struct PriorityClassifier {
    lexicon: Lexicon,
    normalizer: TextNormalizer,
    scorer: Arc<dyn SentimentScorer>,
    config: ClassifierConfig,
}

impl PriorityClassifier {
    /// Classifier with the emergency lexicon and the VADER scorer
    pub fn new(config: ClassifierConfig) -> Self {
        Self::with_components(
            Lexicon::emergency(),
            TextNormalizer::new(),
            Arc::new(VaderScorer::new()),
            config,
        )
    }

    pub fn with_components(
        lexicon: Lexicon,
        normalizer: TextNormalizer,
        scorer: Arc<dyn SentimentScorer>,
        config: ClassifierConfig,
    ) -> Self {
        tracing::debug!(
            scorer = scorer.name(),
            match_strategy = %config.match_strategy,
            high_keywords = lexicon.high().len(),
            medium_keywords = lexicon.medium().len(),
            "Priority classifier constructed"
        );

        Self {
            lexicon,
            normalizer,
            scorer,
            config,
        }
    }

    /// Swap the scorer, keeping everything else
    pub fn with_scorer(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn match_strategy(&self) -> MatchStrategy {
        self.config.match_strategy
    }

    /// Triage a free-text description.
    ///
    /// Any string, including the empty one, yields a tier. The only failure
    /// is the sentiment scorer being unusable.
    pub fn classify(&self, description: &str) -> ClassificationResult<Classification> {
        let scores = self.score(description)?;
        let priority = self.decide(&scores);

        tracing::debug!(
            priority = %priority,
            high_score = scores.high,
            medium_score = scores.medium,
            "Description classified"
        );

        Ok(Classification {
            priority,
            confidence: PLACEHOLDER_CONFIDENCE,
            scores,
        })
    }

    /// Lexicon scores with the sentiment adjustment applied
    pub fn score(&self, description: &str) -> ClassificationResult<TierScores> {
        let tokens = self.normalizer.normalize(description);
        let mut scores = self.lexicon.score(&tokens, self.config.match_strategy);

        let sentiment = self.sentiment(&tokens)?;
        scores.high += sentiment.negative.abs() * self.config.sentiment_weight;
        scores.medium += sentiment.neutral.abs() * self.config.sentiment_weight;

        Ok(scores)
    }

    fn sentiment(&self, tokens: &[String]) -> ClassificationResult<SentimentScores> {
        if tokens.is_empty() {
            return Ok(SentimentScores::default());
        }

        let joined = tokens.join(" ");
        self.scorer.polarity(&joined).map_err(|e| {
            tracing::warn!(scorer = self.scorer.name(), error = %e, "Sentiment scoring failed");
            e
        })
    }

    /// Map final scores to a tier; thresholds are exclusive and checked high first
    pub fn decide(&self, scores: &TierScores) -> Priority {
        if scores.high > self.config.high_threshold {
            Priority::High
        } else if scores.medium > self.config.medium_threshold {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl std::fmt::Debug for PriorityClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityClassifier")
            .field("scorer", &self.scorer.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
