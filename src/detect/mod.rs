//! Language classification.
//!
//! This module maps an unlabeled text blob to a best-guess [`Language`]
//! with an honest [`Confidence`], using two tiers evaluated in order:
//! - [`patterns`]: weighted regex signature table (tier 1)
//! - [`lexer`]: syntect first-line lookup as a supporting signal (tier 2)
//!
//! Classification is a pure function of the input text and the configured
//! thresholds; it never fails, degrading to `unknown`/low instead.

pub mod lexer;
pub mod patterns;

use crate::config::Config;
use crate::language::{Confidence, Detection, DetectionMethod, Language};

pub use lexer::lexer_guess;

/// Tier-1 scores for every supported language, in precedence order.
#[must_use]
pub fn score_languages(text: &str) -> Vec<(Language, u32)> {
    patterns::SIGNATURES
        .iter()
        .map(|set| (set.language, set.score(text)))
        .collect()
}

/// Pick the leader and runner-up score from a precedence-ordered score list.
///
/// Only a strictly greater score replaces the leader, so exact ties resolve
/// to the earlier-declared language. Deterministic across runs.
fn leader(scores: &[(Language, u32)]) -> (Language, u32, u32) {
    let mut best = Language::Unknown;
    let mut best_score = 0;
    let mut second_score = 0;
    for &(language, score) in scores {
        if score > best_score {
            second_score = best_score;
            best_score = score;
            best = language;
        } else if score > second_score {
            second_score = score;
        }
    }
    (best, best_score, second_score)
}

/// Classify `text`, producing exactly one [`Detection`].
///
/// - Empty or whitespace-only input short-circuits to `unknown`/low.
/// - Input shorter than `min_reliable_len` keeps the pattern verdict but
///   caps confidence at low.
/// - Otherwise tier 1 resolves high (strong, unambiguous score) or medium
///   (weak score); tier 2 is consulted only below the weak threshold.
#[must_use]
pub fn detect(text: &str, config: &Config) -> Detection {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Detection::unknown(DetectionMethod::Empty);
    }

    let scores = score_languages(text);
    let (best, best_score, second_score) = leader(&scores);

    if trimmed.len() < config.min_reliable_len {
        // Too short to be reliable regardless of what matched.
        if best_score > 0 {
            return Detection::new(best, Confidence::Low, DetectionMethod::Short);
        }
        return Detection::unknown(DetectionMethod::Short);
    }

    if best_score >= config.strong_threshold
        && best_score - second_score >= config.high_margin
    {
        return Detection::new(best, Confidence::High, DetectionMethod::Patterns);
    }
    if best_score >= config.weak_threshold {
        return Detection::new(best, Confidence::Medium, DetectionMethod::Patterns);
    }

    // Tier 2: lexical library fallback.
    if let Some(language) = lexer_guess(text) {
        return Detection::new(language, Confidence::Medium, DetectionMethod::Lexer);
    }

    if best_score > 0 {
        return Detection::new(best, Confidence::Low, DetectionMethod::PatternsWeak);
    }
    Detection::unknown(DetectionMethod::NoSignal)
}
