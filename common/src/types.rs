//! Shared domain types
//!
//! - Member: one roster row, immutable for a run
//! - MatchOutcome: the matcher's verdict for one finisher name

use serde::{Deserialize, Serialize};

/// Club member loaded from the roster
///
/// Optional text fields are empty strings when absent, while `age` is `None`
/// when absent or unparseable. Downstream exports rely on that asymmetry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: String,
}

impl Member {
    pub fn new(
        member_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Upper-cased gender code, `None` when blank
    pub fn gender_code(&self) -> Option<String> {
        let gender = self.gender.trim();
        if gender.is_empty() {
            None
        } else {
            Some(gender.to_uppercase())
        }
    }
}

/// Result of resolving one finisher name against the registry
///
/// Built only through [`MatchOutcome::accepted`] / [`MatchOutcome::rejected`],
/// so `matched` always agrees with `member`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    matched: bool,
    member: Option<Member>,
    confidence: f64,
    is_ambiguous: bool,
}

impl MatchOutcome {
    pub fn accepted(member: Member, confidence: f64, is_ambiguous: bool) -> Self {
        Self {
            matched: true,
            member: Some(member),
            confidence,
            is_ambiguous,
        }
    }

    /// Unmatched outcome; `confidence` keeps the best rejected score for reporting
    pub fn rejected(confidence: f64) -> Self {
        Self {
            matched: false,
            member: None,
            confidence,
            is_ambiguous: false,
        }
    }

    pub fn matched(&self) -> bool {
        self.matched
    }

    pub fn member(&self) -> Option<&Member> {
        self.member.as_ref()
    }

    pub fn member_id(&self) -> Option<&str> {
        self.member.as_ref().map(|m| m.member_id.as_str())
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_ambiguous(&self) -> bool {
        self.is_ambiguous
    }
}
