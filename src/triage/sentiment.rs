use crate::triage::error::{ClassificationError, ClassificationResult};
use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Sums of the three components may drift this far above 1.0 through rounding
const SUM_TOLERANCE: f64 = 0.01;

/// Negative / neutral / positive proportions for a span of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl SentimentScores {
    pub fn new(negative: f64, neutral: f64, positive: f64) -> Self {
        Self {
            negative,
            neutral,
            positive,
        }
    }

    /// Reject scores a well-behaved scorer could not have produced.
    ///
    /// Every component must be finite and within [0, 1] and the three must sum
    /// to at most one (all zeros is what scorers return for empty text).
    pub fn validate(self) -> ClassificationResult<Self> {
        for (name, value) in [
            ("negative", self.negative),
            ("neutral", self.neutral),
            ("positive", self.positive),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ClassificationError::ScorerUnavailable(format!(
                    "{} score out of range: {}",
                    name, value
                )));
            }
        }

        let sum = self.negative + self.neutral + self.positive;
        if sum > 1.0 + SUM_TOLERANCE {
            return Err(ClassificationError::ScorerUnavailable(format!(
                "scores sum to {:.3}, expected at most 1",
                sum
            )));
        }

        Ok(self)
    }
}

/// A general-purpose sentiment model.
///
/// Implementations must be safe to call from many request handlers at once.
pub trait SentimentScorer: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Score a span of already-normalized text
    fn polarity(&self, text: &str) -> ClassificationResult<SentimentScores>;
}

/// Lexicon and rule based scorer backed by VADER
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VaderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaderScorer").finish_non_exhaustive()
    }
}

impl SentimentScorer for VaderScorer {
    fn name(&self) -> &str {
        "vader"
    }

    fn polarity(&self, text: &str) -> ClassificationResult<SentimentScores> {
        let scores = self.analyzer.polarity_scores(text);

        let component = |key: &str| {
            scores.get(key).copied().ok_or_else(|| {
                ClassificationError::ScorerUnavailable(format!("VADER output missing '{}'", key))
            })
        };

        SentimentScores::new(component("neg")?, component("neu")?, component("pos")?).validate()
    }
}
