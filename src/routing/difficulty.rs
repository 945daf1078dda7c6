//! Zero-cost query difficulty estimation.
//!
//! Scores a query in `[0, 1]` from its text alone, without calling any model.
//! Three sub-scores are combined:
//!
//! | Signal    | Weight | Source                                           |
//! |-----------|--------|--------------------------------------------------|
//! | length    | 0.25   | whitespace word count                            |
//! | keyword   | 0.50   | first matching keyword class (hard, medium, easy) |
//! | structure | 0.25   | multiple sentences, conjunctions, causal markers |
//!
//! Two floors are then applied: any hard keyword lifts the score to at least
//! 0.6, and a multi-part phrase ("pros and cons", ...) lifts it to at least 0.5.

use serde::Serialize;
use std::fmt;

const HARD_KEYWORDS: &[&str] = &[
    "why",
    "how",
    "prove",
    "derive",
    "analyze",
    "reason",
    "justify",
    "evaluate",
    "critique",
    "implications",
];

const MEDIUM_KEYWORDS: &[&str] = &[
    "explain",
    "describe",
    "summarize",
    "compare",
    "difference",
    "overview",
];

const EASY_KEYWORDS: &[&str] = &[
    "what",
    "define",
    "definition",
    "list",
    "name",
    "who",
    "when",
    "where",
];

const MULTI_PART_PHRASES: &[&str] = &[
    "advantages and disadvantages",
    "pros and cons",
    "trade-offs",
    "implications",
    "limitations",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "vs", "versus", "while"];
const CAUSAL_MARKERS: &[&str] = &["if", "because", "therefore", "however"];

const LENGTH_WEIGHT: f64 = 0.25;
const KEYWORD_WEIGHT: f64 = 0.5;
const STRUCTURE_WEIGHT: f64 = 0.25;

const HARD_FLOOR: f64 = 0.6;
const MULTI_PART_FLOOR: f64 = 0.5;

/// Upper bound (exclusive) of the easy tier.
pub const EASY_CEILING: f64 = 0.3;
/// Lower bound (inclusive) of the hard tier.
pub const HARD_THRESHOLD: f64 = 0.6;

/// Coarse difficulty band that selects the token budget and initial backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    /// `< 0.3`: local only, never escalated
    Easy,
    /// `[0.3, 0.6)`: local first, escalated on failed verification
    Medium,
    /// `>= 0.6`: remote directly
    Hard,
}

impl DifficultyTier {
    pub fn from_score(score: f64) -> Self {
        if score < EASY_CEILING {
            DifficultyTier::Easy
        } else if score < HARD_THRESHOLD {
            DifficultyTier::Medium
        } else {
            DifficultyTier::Hard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-scores behind a difficulty estimate, for `frugal estimate` and debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyBreakdown {
    pub length: f64,
    pub keyword: f64,
    pub structure: f64,
    /// Hard keyword floor applied
    pub hard_floor: bool,
    /// Multi-part phrase floor applied
    pub multi_part_floor: bool,
    /// Final score, clamped and rounded to 3 decimals
    pub score: f64,
}

impl DifficultyBreakdown {
    pub fn tier(&self) -> DifficultyTier {
        DifficultyTier::from_score(self.score)
    }
}

/// Stateless difficulty estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifficultyEstimator;

impl DifficultyEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Difficulty score in `[0, 1]`, rounded to 3 decimals.
    pub fn estimate(&self, query: &str) -> f64 {
        self.breakdown(query).score
    }

    pub fn breakdown(&self, query: &str) -> DifficultyBreakdown {
        let lower = query.to_lowercase();

        let length = length_score(query.split_whitespace().count());
        let keyword = keyword_score(&lower);
        let structure = structure_score(&lower);

        let mut score =
            LENGTH_WEIGHT * length + KEYWORD_WEIGHT * keyword + STRUCTURE_WEIGHT * structure;

        let hard_floor = contains_any(&lower, HARD_KEYWORDS);
        if hard_floor {
            score = score.max(HARD_FLOOR);
        }
        let multi_part_floor = contains_any(&lower, MULTI_PART_PHRASES);
        if multi_part_floor {
            score = score.max(MULTI_PART_FLOOR);
        }

        DifficultyBreakdown {
            length,
            keyword,
            structure,
            hard_floor,
            multi_part_floor,
            score: round3(score.clamp(0.0, 1.0)),
        }
    }
}

fn length_score(words: usize) -> f64 {
    if words <= 5 {
        0.1
    } else if words >= 30 {
        1.0
    } else {
        (words as f64 - 5.0) / 25.0
    }
}

fn keyword_score(lower: &str) -> f64 {
    if contains_any(lower, HARD_KEYWORDS) {
        1.0
    } else if contains_any(lower, MEDIUM_KEYWORDS) {
        0.5
    } else if contains_any(lower, EASY_KEYWORDS) {
        0.1
    } else {
        0.3
    }
}

fn structure_score(lower: &str) -> f64 {
    let mut score: f64 = 0.0;

    let terminators = lower.chars().filter(|c| *c == '.' || *c == '?').count();
    if terminators > 1 {
        score += 0.4;
    }

    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.iter().any(|w| CONJUNCTIONS.contains(w)) {
        score += 0.3;
    }
    if words.iter().any(|w| CAUSAL_MARKERS.contains(w)) {
        score += 0.3;
    }

    score.min(1.0)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
