use crate::triage::error::{ClassificationError, ClassificationResult};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a lexicon keyword is compared against a normalized token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MatchStrategy {
    /// Keyword fires when it occurs anywhere inside the token ("cut" in "cutlery")
    #[default]
    Substring,
    /// Keyword fires only when it equals the token
    ExactToken,
}

impl MatchStrategy {
    pub fn matches(&self, keyword: &str, token: &str) -> bool {
        match self {
            MatchStrategy::Substring => token.contains(keyword),
            MatchStrategy::ExactToken => token == keyword,
        }
    }
}

/// A weighted keyword phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub phrase: String,
    pub weight: f64,
}

impl Keyword {
    fn new(phrase: &str, weight: f64) -> Self {
        Self {
            phrase: phrase.to_string(),
            weight,
        }
    }
}

/// Raw per-tier scores accumulated for one description
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierScores {
    pub high: f64,
    pub medium: f64,
}

/// Keyword tables for the `high` and `medium` tiers.
///
/// Entries are kept in insertion order so that floating point sums are
/// reproducible between runs. A lexicon is never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    high: Vec<Keyword>,
    medium: Vec<Keyword>,
}

impl Lexicon {
    /// Build a lexicon from explicit tables.
    ///
    /// Phrases are lowercased; empty phrases and negative or non-finite
    /// weights are rejected.
    pub fn new(high: Vec<Keyword>, medium: Vec<Keyword>) -> ClassificationResult<Self> {
        Ok(Self {
            high: Self::checked(high)?,
            medium: Self::checked(medium)?,
        })
    }

    fn checked(entries: Vec<Keyword>) -> ClassificationResult<Vec<Keyword>> {
        entries
            .into_iter()
            .map(|entry| {
                let phrase = entry.phrase.trim().to_lowercase();
                if phrase.is_empty() {
                    return Err(ClassificationError::InvalidLexicon(
                        "keyword phrase must not be empty".to_string(),
                    ));
                }
                if !entry.weight.is_finite() || entry.weight < 0.0 {
                    return Err(ClassificationError::InvalidLexicon(format!(
                        "weight for '{}' must be a non-negative number, got {}",
                        phrase, entry.weight
                    )));
                }
                Ok(Keyword {
                    phrase,
                    weight: entry.weight,
                })
            })
            .collect()
    }

    /// The emergency lexicon used by the reporting service
    pub fn emergency() -> Self {
        let high = vec![
            Keyword::new("fire", 1.0),
            Keyword::new("heart attack", 1.0),
            Keyword::new("shooting", 1.0),
            Keyword::new("explosion", 1.0),
            Keyword::new("bleeding", 1.0),
            Keyword::new("unconscious", 1.0),
            Keyword::new("not breathing", 1.0),
            Keyword::new("weapon", 1.0),
            Keyword::new("gun", 1.0),
            Keyword::new("severe", 0.8),
            Keyword::new("critical", 0.8),
            Keyword::new("dying", 1.0),
            Keyword::new("death", 1.0),
            Keyword::new("immediate", 0.7),
            Keyword::new("emergency", 0.7),
            Keyword::new("urgent", 0.7),
            Keyword::new("life-threatening", 1.0),
            Keyword::new("serious injury", 0.9),
        ];

        let medium = vec![
            Keyword::new("accident", 0.6),
            Keyword::new("injury", 0.6),
            Keyword::new("pain", 0.5),
            Keyword::new("broken", 0.6),
            Keyword::new("cut", 0.5),
            Keyword::new("wound", 0.5),
            Keyword::new("sick", 0.4),
            Keyword::new("fever", 0.4),
            Keyword::new("theft", 0.5),
            Keyword::new("robbery", 0.6),
            Keyword::new("break-in", 0.5),
            Keyword::new("fight", 0.5),
            Keyword::new("assault", 0.6),
        ];

        Self { high, medium }
    }

    pub fn high(&self) -> &[Keyword] {
        &self.high
    }

    pub fn medium(&self) -> &[Keyword] {
        &self.medium
    }

    /// Sum keyword weights over every token.
    ///
    /// Each (token, keyword) pair that matches adds the keyword's weight, so
    /// repeated hits accumulate without bound. Multi-word phrases never match
    /// a single token under either strategy.
    pub fn score<S: AsRef<str>>(&self, tokens: &[S], strategy: MatchStrategy) -> TierScores {
        let mut scores = TierScores::default();

        for token in tokens {
            let token = token.as_ref();
            scores.high += Self::tier_score(&self.high, token, strategy);
            scores.medium += Self::tier_score(&self.medium, token, strategy);
        }

        scores
    }

    fn tier_score(entries: &[Keyword], token: &str, strategy: MatchStrategy) -> f64 {
        entries
            .iter()
            .filter(|entry| strategy.matches(&entry.phrase, token))
            .map(|entry| entry.weight)
            .sum()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::emergency()
    }
}
