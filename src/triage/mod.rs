/// Rule-based priority triage for free-text emergency reports
///
/// A description goes through:
/// - Normalization (lowercase, tokenize, drop punctuation and stopwords, lemmatize)
/// - Lexicon scoring against weighted `high` and `medium` keyword tables
/// - A sentiment adjustment (negative mass raises `high`, neutral mass raises `medium`)
/// - A threshold decision into `low`, `medium` or `high`

pub mod classifier;
pub mod error;
pub mod lexicon;
pub mod normalizer;
pub mod sentiment;

pub use classifier::{
    Classification, PriorityClassifier, HIGH_THRESHOLD, MEDIUM_THRESHOLD,
    PLACEHOLDER_CONFIDENCE, SENTIMENT_WEIGHT,
};
pub use error::{ClassificationError, ClassificationResult};
pub use lexicon::{Keyword, Lexicon, MatchStrategy, TierScores};
pub use normalizer::{NounLemmatizer, TextNormalizer};
pub use sentiment::{SentimentScorer, SentimentScores, VaderScorer};
