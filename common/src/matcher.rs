//! Finisher name matching
//!
//! Resolves a free-text finisher name to at most one member.
//!
//! ## Resolution order
//! 1. Correction table (exact canonical name, confidence 1.0)
//! 2. Fuzzy scoring against every member (token-sorted indel ratio)
//! 3. Threshold check, then ambiguity check against the runner-up

use crate::alias::normalize_name;
use crate::error::{Error, Result};
use crate::registry::MemberRegistry;
use crate::types::{Member, MatchOutcome};
use rapidfuzz::distance::indel;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.70;
pub const DEFAULT_AMBIGUITY_THRESHOLD: f64 = 0.05;

/// Matcher thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity to accept any match
    pub min_confidence: f64,
    /// Best-vs-second gap at or below which an accepted match is flagged ambiguous
    pub ambiguity_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            ambiguity_threshold: DEFAULT_AMBIGUITY_THRESHOLD,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_confidence", self.min_confidence),
            ("ambiguity_threshold", self.ambiguity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within 0.0..=1.0 (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One scored candidate, see [`NameMatcher::rank`]
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub member: &'a Member,
    pub score: f64,
}

/// Split on whitespace, sort the tokens and join them with single spaces
pub fn token_sort(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Word-order independent similarity in `[0, 1]`
///
/// Both sides are normalized and token-sorted, then compared with the indel
/// ratio `1 - (insertions + deletions) / (len_a + len_b)`, so "Smith John"
/// and "John Smith" score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = token_sort(&normalize_name(a));
    let b = token_sort(&normalize_name(b));
    sorted_ratio(&a, &b)
}

/// Indel ratio of two already token-sorted names
fn sorted_ratio(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars())
}

#[derive(Debug, Clone, Default)]
pub struct NameMatcher {
    config: MatcherConfig,
}

impl NameMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Resolve one finisher name
    ///
    /// Never fails: any string is comparable. An unmatched outcome carries
    /// the best (rejected) score so callers can report how close it came.
    pub fn resolve(&self, name: &str, registry: &MemberRegistry) -> MatchOutcome {
        if registry.is_empty() {
            return MatchOutcome::rejected(0.0);
        }

        let normalized = normalize_name(name);

        // A correction whose target is not on the roster falls through to fuzzy matching
        if let Some(canonical) = registry.corrections().lookup(&normalized) {
            if let Some(member) = registry.find_exact(canonical) {
                return MatchOutcome::accepted(member.clone(), 1.0, false);
            }
        }

        let query = token_sort(&normalized);
        let mut scores: Vec<(usize, f64)> = Vec::with_capacity(registry.len());
        for (idx, key) in registry.sort_keys().iter().enumerate() {
            let score = sorted_ratio(&query, key);
            if score == 1.0 {
                return MatchOutcome::accepted(registry.members()[idx].clone(), 1.0, false);
            }
            scores.push((idx, score));
        }

        // Stable: equal scores keep roster order
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));

        let Some(&(best_idx, best_score)) = scores.first() else {
            return MatchOutcome::rejected(0.0);
        };

        if best_score < self.config.min_confidence {
            return MatchOutcome::rejected(best_score);
        }

        let is_ambiguous = scores
            .get(1)
            .map(|&(_, second)| best_score - second <= self.config.ambiguity_threshold)
            .unwrap_or(false);

        MatchOutcome::accepted(registry.members()[best_idx].clone(), best_score, is_ambiguous)
    }

    /// Top `limit` candidates by fuzzy score, corrections ignored
    pub fn rank<'a>(&self, name: &str, registry: &'a MemberRegistry, limit: usize) -> Vec<Candidate<'a>> {
        let query = token_sort(&normalize_name(name));
        let mut candidates: Vec<Candidate<'a>> = registry
            .members()
            .iter()
            .zip(registry.sort_keys())
            .map(|(member, key)| Candidate {
                member,
                score: sorted_ratio(&query, key),
            })
            .collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(limit);
        candidates
    }
}
