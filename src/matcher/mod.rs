//! Race-level matching
//!
//! Runs the finisher name matcher over every record of a race. Outcomes are
//! independent per finisher, so records are matched in parallel; the result
//! keeps results-file order.

mod types;

pub use types::{MatchResult, MatchStats, ReviewReason, ReviewRow};

use crate::race::Race;
use race_series_common::{MemberRegistry, NameMatcher};
use rayon::prelude::*;
use tracing::debug;

/// Match every finisher of `race`
pub fn match_race(race: &Race, registry: &MemberRegistry, matcher: &NameMatcher) -> Vec<MatchResult> {
    race.finishers
        .par_iter()
        .map(|finisher| {
            let outcome = matcher.resolve(&finisher.name, registry);
            debug!(
                race = %race.name,
                name = %finisher.name,
                member = outcome.member_id().unwrap_or("-"),
                confidence = outcome.confidence(),
                ambiguous = outcome.is_ambiguous(),
                "finisher resolved"
            );
            MatchResult {
                finisher: finisher.clone(),
                outcome,
            }
        })
        .collect()
}

pub fn match_stats(matches: &[MatchResult]) -> MatchStats {
    let mut stats = MatchStats {
        finishers: matches.len(),
        ..Default::default()
    };
    for m in matches.iter().filter(|m| m.matched()) {
        stats.matched += 1;
        if m.outcome.is_ambiguous() {
            stats.ambiguous += 1;
        }
        if m.outcome.confidence() >= 1.0 {
            stats.corrected_or_exact += 1;
        }
    }
    stats
}

/// Accepted matches that deserve a human look
///
/// Ambiguous matches are always listed; otherwise a match is listed when its
/// confidence is below `review_below`. Unmatched finishers are not listed.
pub fn review_rows(race_name: &str, matches: &[MatchResult], review_below: f64) -> Vec<ReviewRow> {
    matches
        .iter()
        .filter_map(|m| {
            if !m.matched() {
                return None;
            }
            let reason = if m.outcome.is_ambiguous() {
                ReviewReason::Ambiguous
            } else if m.outcome.confidence() < review_below {
                ReviewReason::LowConfidence
            } else {
                return None;
            };
            Some(ReviewRow {
                race: race_name.to_string(),
                name: m.finisher.name.clone(),
                confidence: m.outcome.confidence(),
                reason,
            })
        })
        .collect()
}
