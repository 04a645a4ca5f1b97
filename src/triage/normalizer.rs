//! Text normalization for incident descriptions.
//!
//! Descriptions are lowercased, split into word tokens, stripped of
//! punctuation and English stopwords, and reduced to their base form with a
//! noun lemmatizer.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    /// Words (letters/digits joined by internal hyphens or apostrophes) or
    /// runs of anything else that is not whitespace.
    static ref TOKEN_PATTERN: Regex =
        Regex::new(r"[\p{L}\p{N}]+(?:['\-][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]+")
            .expect("token pattern is valid");
}

/// NLTK's English stopword list
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Plural nouns whose singular cannot be derived by suffix rules
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("firemen", "fireman"),
    ("policemen", "policeman"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("oxen", "ox"),
    ("lives", "life"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("thieves", "thief"),
    ("shelves", "shelf"),
    ("selves", "self"),
    ("calves", "calf"),
    ("buses", "bus"),
    ("gases", "gas"),
    ("crises", "crisis"),
    ("diagnoses", "diagnosis"),
    ("analyses", "analysis"),
    ("heroes", "hero"),
    ("criteria", "criterion"),
    ("data", "datum"),
];

/// Words ending in "s" that are not plurals
const UNINFLECTED: &[&str] = &[
    "news", "series", "species", "means", "chaos", "lens", "gas", "bus", "diabetes", "measles",
    "mumps", "rabies", "herpes", "aids", "always", "perhaps", "yes", "towards", "upstairs",
    "downstairs", "outdoors", "indoors", "whereas",
];

/// Endings after which a trailing "s" is part of the word
const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is", "ous", "ics", "'s"];

/// Shortest base form a suffix rule may produce
const MIN_STEM_LEN: usize = 3;

/// Reduces plural nouns to their dictionary form.
///
/// Tokens that are not recognisably plural (verbs, adjectives, gerunds such
/// as "bleeding") are returned unchanged.
#[derive(Debug, Clone)]
pub struct NounLemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    uninflected: HashSet<&'static str>,
}

impl NounLemmatizer {
    pub fn new() -> Self {
        Self {
            irregular: IRREGULAR_PLURALS.iter().copied().collect(),
            uninflected: UNINFLECTED.iter().copied().collect(),
        }
    }

    pub fn lemmatize(&self, token: &str) -> String {
        if let Some(base) = self.irregular.get(token) {
            return (*base).to_string();
        }

        if self.uninflected.contains(token)
            || !token.ends_with('s')
            || PROTECTED_ENDINGS.iter().any(|ending| token.ends_with(ending))
        {
            return token.to_string();
        }

        Self::detach_suffix(token)
            .filter(|base| base.chars().count() >= MIN_STEM_LEN)
            .unwrap_or_else(|| token.to_string())
    }

    fn detach_suffix(token: &str) -> Option<String> {
        if let Some(stem) = token.strip_suffix("ies") {
            return Some(format!("{}y", stem));
        }
        if let Some(stem) = token.strip_suffix("sses") {
            return Some(format!("{}ss", stem));
        }
        if token.ends_with("aches") {
            return token.strip_suffix('s').map(str::to_string);
        }
        for suffix in ["ches", "shes", "xes", "zzes"] {
            if token.ends_with(suffix) {
                return token.strip_suffix("es").map(str::to_string);
            }
        }
        token.strip_suffix('s').map(str::to_string)
    }
}

impl Default for NounLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns raw description text into a deterministic sequence of normalized tokens
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stopwords: HashSet<&'static str>,
    lemmatizer: NounLemmatizer,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            stopwords: ENGLISH_STOPWORDS.iter().copied().collect(),
            lemmatizer: NounLemmatizer::new(),
        }
    }

    /// Lowercase and split into word and punctuation tokens.
    ///
    /// Hyphenated words stay whole. Contractions split the way the Penn
    /// Treebank does it: "don't" becomes "do" + "n't", "it's" becomes "it" + "'s".
    pub fn tokenize(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");
        let mut tokens = Vec::new();

        for m in TOKEN_PATTERN.find_iter(&lowered) {
            let word = m.as_str();
            match Self::split_contraction(word) {
                Some((head, tail)) => {
                    if !head.is_empty() {
                        tokens.push(head.to_string());
                    }
                    tokens.push(tail.to_string());
                }
                None => tokens.push(word.to_string()),
            }
        }

        tokens
    }

    fn split_contraction(word: &str) -> Option<(&str, &str)> {
        if word.len() > 3 && word.ends_with("n't") {
            let at = word.len() - 3;
            return Some((&word[..at], &word[at..]));
        }
        word.find('\'').filter(|&at| at > 0).map(|at| (&word[..at], &word[at..]))
    }

    fn is_punctuation(token: &str) -> bool {
        token.chars().all(|c| !c.is_alphanumeric())
    }

    /// Full normalization pipeline
    pub fn normalize(&self, text: &str) -> Vec<String> {
        Self::tokenize(text)
            .into_iter()
            .filter(|token| !Self::is_punctuation(token))
            .filter(|token| !self.stopwords.contains(token.as_str()))
            .map(|token| self.lemmatizer.lemmatize(&token))
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopword_list_size() {
        assert_eq!(ENGLISH_STOPWORDS.len(), 179);
    }

    #[test]
    fn test_tokenize_keeps_hyphenated_words() {
        let tokens = TextNormalizer::tokenize("A life-threatening break-in!");
        assert_eq!(tokens, vec!["a", "life-threatening", "break-in", "!"]);
    }

    #[test]
    fn test_tokenize_splits_contractions() {
        let tokens = TextNormalizer::tokenize("He isn't breathing, it's bad");
        assert_eq!(
            tokens,
            vec!["he", "is", "n't", "breathing", ",", "it", "'s", "bad"]
        );
    }

    #[test]
    fn test_normalize_drops_stopwords_and_punctuation() {
        let normalizer = TextNormalizer::new();
        let tokens =
            normalizer.normalize("There is a fire and the victim is bleeding and unconscious.");
        assert_eq!(tokens, vec!["fire", "victim", "bleeding", "unconscious"]);
    }

    #[test]
    fn test_normalize_lemmatizes_plurals() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.normalize("Two children with injuries and several burns");
        assert_eq!(tokens, vec!["two", "child", "injury", "several", "burn"]);
    }

    #[test]
    fn test_normalize_empty_and_whitespace() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("   \n\t ").is_empty());
        assert!(normalizer.normalize("?!... ,,").is_empty());
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let normalizer = TextNormalizer::new();
        let text = "Gunshots reported near the station, people running";
        assert_eq!(normalizer.normalize(text), normalizer.normalize(text));
    }

    #[test]
    fn test_lemmatizer_leaves_non_plurals() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("bleeding"), "bleeding");
        assert_eq!(lemmatizer.lemmatize("unconscious"), "unconscious");
        assert_eq!(lemmatizer.lemmatize("glass"), "glass");
        assert_eq!(lemmatizer.lemmatize("crisis"), "crisis");
        assert_eq!(lemmatizer.lemmatize("virus"), "virus");
        assert_eq!(lemmatizer.lemmatize("gas"), "gas");
    }

    #[test]
    fn test_lemmatizer_suffix_rules() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("emergencies"), "emergency");
        assert_eq!(lemmatizer.lemmatize("robberies"), "robbery");
        assert_eq!(lemmatizer.lemmatize("glasses"), "glass");
        assert_eq!(lemmatizer.lemmatize("branches"), "branch");
        assert_eq!(lemmatizer.lemmatize("headaches"), "headache");
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("weapons"), "weapon");
        assert_eq!(lemmatizer.lemmatize("break-ins"), "break-in");
    }

    #[test]
    fn test_lemmatizer_irregulars() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("children"), "child");
        assert_eq!(lemmatizer.lemmatize("knives"), "knife");
        assert_eq!(lemmatizer.lemmatize("people"), "person");
    }

    #[test]
    fn test_lemmatizer_short_words_unchanged() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("ties"), "ties");
        assert_eq!(lemmatizer.lemmatize("its"), "its");
    }
}
