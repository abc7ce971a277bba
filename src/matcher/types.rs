use crate::race::FinisherRecord;
use race_series_common::{Member, MatchOutcome};
use serde::Serialize;

/// A finisher paired with the matcher's verdict
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub finisher: FinisherRecord,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn matched(&self) -> bool {
        self.outcome.matched()
    }

    pub fn member(&self) -> Option<&Member> {
        self.outcome.member()
    }

    pub fn member_id(&self) -> Option<&str> {
        self.outcome.member_id()
    }
}

/// Why an accepted match was flagged for review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReviewReason {
    Ambiguous,
    LowConfidence,
}

impl std::fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewReason::Ambiguous => write!(f, "ambiguous"),
            ReviewReason::LowConfidence => write!(f, "low confidence"),
        }
    }
}

/// One row of the match-review report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRow {
    pub race: String,
    pub name: String,
    pub confidence: f64,
    pub reason: ReviewReason,
}

/// Per-race match counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub finishers: usize,
    pub matched: usize,
    pub ambiguous: usize,
    pub corrected_or_exact: usize,
}
