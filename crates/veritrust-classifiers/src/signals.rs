//! Rule-based explainability signals
//!
//! Each rule inspects the raw review text (and the model's rounded confidence)
//! independently. Every rule that fires contributes its message; results keep
//! rule declaration order and no rule suppresses another.

use aho_corasick::AhoCorasick;
use veritrust_core::{word_count, Error, Result};

pub const SHORT_REVIEW_SIGNAL: &str = "Very short review length";
pub const EXCESSIVE_PUNCTUATION_SIGNAL: &str = "Excessive punctuation";
pub const PROMOTIONAL_LANGUAGE_SIGNAL: &str = "Overly promotional language";
pub const MODEL_CONFIDENCE_SIGNAL: &str = "Strong deceptive language pattern detected by model";

/// Reviews with fewer whitespace-separated words than this are flagged
pub const SHORT_REVIEW_MIN_WORDS: usize = 5;

/// Number of `!` at which punctuation is considered excessive
pub const EXCESSIVE_EXCLAMATIONS: usize = 3;

/// Model confidence strictly above this emits the model signal
pub const MODEL_CONFIDENCE_THRESHOLD: f64 = 0.90;

/// Phrases matched case-insensitively anywhere in the text
pub const PROMOTIONAL_PHRASES: [&str; 5] = [
    "best ever",
    "must buy",
    "highly recommend",
    "five stars",
    "life changing",
];

/// A single heuristic check
#[derive(Debug, Clone)]
pub enum SignalRule {
    /// Word count below `min_words`
    ShortReview { min_words: usize },

    /// At least `min_exclamations` exclamation marks
    ExcessivePunctuation { min_exclamations: usize },

    /// Any promotional phrase present
    PromotionalLanguage { matcher: AhoCorasick },

    /// Model confidence above `threshold`, whichever label won
    ModelConfidence { threshold: f64 },
}

impl SignalRule {
    /// Build a promotional-language rule over the given phrases
    pub fn promotional<I, P>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(phrases)
            .map_err(|e| {
                Error::classifier(format!("Failed to build promotional phrase matcher: {e}"))
            })?;

        Ok(Self::PromotionalLanguage { matcher })
    }

    /// Message appended when this rule fires
    pub fn message(&self) -> &'static str {
        match self {
            Self::ShortReview { .. } => SHORT_REVIEW_SIGNAL,
            Self::ExcessivePunctuation { .. } => EXCESSIVE_PUNCTUATION_SIGNAL,
            Self::PromotionalLanguage { .. } => PROMOTIONAL_LANGUAGE_SIGNAL,
            Self::ModelConfidence { .. } => MODEL_CONFIDENCE_SIGNAL,
        }
    }

    /// Whether this rule fires for the given review
    pub fn fires(&self, text: &str, confidence: f64) -> bool {
        match self {
            Self::ShortReview { min_words } => word_count(text) < *min_words,
            Self::ExcessivePunctuation { min_exclamations } => {
                text.matches('!').count() >= *min_exclamations
            }
            Self::PromotionalLanguage { matcher } => matcher.is_match(text),
            Self::ModelConfidence { threshold } => confidence > *threshold,
        }
    }
}

/// Ordered rule table evaluated against every prediction
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    rules: Vec<SignalRule>,
}

impl SignalExtractor {
    /// Create an extractor over an explicit rule table
    pub fn new(rules: Vec<SignalRule>) -> Self {
        Self { rules }
    }

    /// The production rule table
    pub fn standard() -> Result<Self> {
        Ok(Self::new(vec![
            SignalRule::ShortReview {
                min_words: SHORT_REVIEW_MIN_WORDS,
            },
            SignalRule::ExcessivePunctuation {
                min_exclamations: EXCESSIVE_EXCLAMATIONS,
            },
            SignalRule::promotional(PROMOTIONAL_PHRASES)?,
            SignalRule::ModelConfidence {
                threshold: MODEL_CONFIDENCE_THRESHOLD,
            },
        ]))
    }

    /// Messages of every rule that fires, in table order
    pub fn extract(&self, text: &str, confidence: f64) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| rule.fires(text, confidence))
            .map(|rule| rule.message().to_string())
            .collect()
    }

    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn extractor() -> SignalExtractor {
        SignalExtractor::standard().unwrap()
    }

    #[test]
    fn test_best_ever_example() {
        let signals = extractor().extract("Best ever!", 0.5);
        assert_eq!(
            signals,
            vec![SHORT_REVIEW_SIGNAL, PROMOTIONAL_LANGUAGE_SIGNAL]
        );
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let text = "BEST EVER!!! must buy";
        let signals = extractor().extract(text, 0.97);
        assert_eq!(
            signals,
            vec![
                SHORT_REVIEW_SIGNAL,
                EXCESSIVE_PUNCTUATION_SIGNAL,
                PROMOTIONAL_LANGUAGE_SIGNAL,
                MODEL_CONFIDENCE_SIGNAL,
            ]
        );
    }

    #[test]
    fn test_balanced_review_has_no_signals() {
        let text = "I've been using this product for 2 months. The build quality is good, \
                    though the battery life could be better.";
        assert!(extractor().extract(text, 0.61).is_empty());
    }

    #[test]
    fn test_word_count_boundary() {
        let ex = extractor();
        assert!(ex
            .extract("one two three four", 0.0)
            .contains(&SHORT_REVIEW_SIGNAL.to_string()));
        assert!(!ex
            .extract("one two three four five", 0.0)
            .contains(&SHORT_REVIEW_SIGNAL.to_string()));
        // Runs of whitespace do not create extra words
        assert!(ex
            .extract("  one \t two\n\nthree   four  ", 0.0)
            .contains(&SHORT_REVIEW_SIGNAL.to_string()));
    }

    #[test]
    fn test_information_separators_split_words() {
        let ex = extractor();
        assert!(!ex
            .extract("a\u{1c}b\u{1c}c\u{1c}d\u{1c}e", 0.0)
            .contains(&SHORT_REVIEW_SIGNAL.to_string()));
    }

    #[test]
    fn test_exclamation_boundary() {
        let ex = extractor();
        let long = "this text is long enough to avoid the length rule";
        assert!(ex.extract(&format!("{long}!!"), 0.0).is_empty());
        assert_eq!(
            ex.extract(&format!("{long}! ! !"), 0.0),
            vec![EXCESSIVE_PUNCTUATION_SIGNAL]
        );
    }

    #[test]
    fn test_confidence_threshold_is_strict() {
        let ex = extractor();
        let long = "this text is long enough to avoid the length rule";
        assert!(ex.extract(long, 0.9).is_empty());
        assert_eq!(ex.extract(long, 0.9001), vec![MODEL_CONFIDENCE_SIGNAL]);
    }

    #[test]
    fn test_phrase_inside_longer_word_still_matches() {
        let ex = extractor();
        let text = "honestly the lifechanging part was not there, but five starsss anyway";
        assert!(ex
            .extract(text, 0.0)
            .contains(&PROMOTIONAL_LANGUAGE_SIGNAL.to_string()));
    }

    #[test]
    fn test_custom_rule_table() {
        let ex = SignalExtractor::new(vec![SignalRule::ModelConfidence { threshold: 0.5 }]);
        assert_eq!(ex.rules().len(), 1);
        assert_eq!(ex.extract("x", 0.6), vec![MODEL_CONFIDENCE_SIGNAL]);
        assert!(ex.extract("x", 0.4).is_empty());
    }

    proptest! {
        #[test]
        fn prop_short_text_flagged(words in prop::collection::vec("[a-z]{1,8}", 0..5)) {
            let text = words.join(" ");
            let signals = extractor().extract(&text, 0.0);
            prop_assert!(signals.contains(&SHORT_REVIEW_SIGNAL.to_string()));
        }

        #[test]
        fn prop_three_bangs_flagged(prefix in "[a-z ]{0,40}", bangs in 3usize..10) {
            let text = format!("{}{}", prefix, "!".repeat(bangs));
            let signals = extractor().extract(&text, 0.0);
            prop_assert!(signals.contains(&EXCESSIVE_PUNCTUATION_SIGNAL.to_string()));
        }

        #[test]
        fn prop_promotional_phrase_any_case(
            idx in 0usize..PROMOTIONAL_PHRASES.len(),
            upper in prop::collection::vec(any::<bool>(), 16),
            prefix in "[a-z ]{0,20}",
        ) {
            let phrase: String = PROMOTIONAL_PHRASES[idx]
                .chars()
                .zip(upper.iter().cycle())
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
                .collect();
            let text = format!("{prefix}{phrase}");
            let signals = extractor().extract(&text, 0.0);
            prop_assert!(signals.contains(&PROMOTIONAL_LANGUAGE_SIGNAL.to_string()));
        }

        #[test]
        fn prop_signals_follow_rule_order(text in ".{0,80}", confidence in 0.0f64..=1.0) {
            let order = [
                SHORT_REVIEW_SIGNAL,
                EXCESSIVE_PUNCTUATION_SIGNAL,
                PROMOTIONAL_LANGUAGE_SIGNAL,
                MODEL_CONFIDENCE_SIGNAL,
            ];
            let signals = extractor().extract(&text, confidence);
            let positions: Vec<usize> = signals
                .iter()
                .map(|s| order.iter().position(|o| o == s).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
