//! Age grading
//!
//! Converts a finish time into a percentage of the age/gender standard for
//! the race distance, so runners of different ages can be ranked together.
//!
//! ## Steps
//! 1. Distance is inferred from the race name (`spring_5k` -> 5K)
//! 2. The factor for (distance, gender, age) is read from the 2020 tables,
//!    interpolated linearly between 5-year knots
//! 3. `percentage = open standard * factor / actual seconds * 100`
//!
//! Results that cannot be graded (no age or gender, unknown distance, bad
//! time) are skipped, never fatal.

pub mod series;

use crate::error::{RaceSeriesError, Result};
use crate::matcher::MatchResult;
use crate::race::FinisherRecord;
use race_series_common::Member;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RaceDistance {
    Km5,
    Km8,
    Km10,
    HalfMarathon,
    Marathon,
}

impl RaceDistance {
    fn index(&self) -> usize {
        match self {
            RaceDistance::Km5 => 0,
            RaceDistance::Km8 => 1,
            RaceDistance::Km10 => 2,
            RaceDistance::HalfMarathon => 3,
            RaceDistance::Marathon => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RaceDistance::Km5 => "5K",
            RaceDistance::Km8 => "8K",
            RaceDistance::Km10 => "10K",
            RaceDistance::HalfMarathon => "Half Marathon",
            RaceDistance::Marathon => "Marathon",
        }
    }
}

impl std::fmt::Display for RaceDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Guess the distance from a race's display name
pub fn infer_race_distance(race_name: &str) -> Option<RaceDistance> {
    lazy_static::lazy_static! {
        static ref KM_RE: Regex = Regex::new(r"(\d+)k").unwrap();
    }

    let name = race_name.to_lowercase();
    if name.contains("5k") || name.contains("5_k") {
        return Some(RaceDistance::Km5);
    }
    if name.contains("8k") || name.contains("8_k") {
        return Some(RaceDistance::Km8);
    }
    if name.contains("10k") || name.contains("10_k") {
        return Some(RaceDistance::Km10);
    }
    if name.contains("half") {
        return Some(RaceDistance::HalfMarathon);
    }
    if name.contains("marathon") {
        return Some(RaceDistance::Marathon);
    }

    let km: u32 = KM_RE.captures(&name)?[1].parse().ok()?;
    let distance = match km {
        0..=6 => RaceDistance::Km5,
        7..=9 => RaceDistance::Km8,
        10..=15 => RaceDistance::Km10,
        16..=25 => RaceDistance::HalfMarathon,
        _ => RaceDistance::Marathon,
    };
    Some(distance)
}

/// Ages at which the factor tables are defined
const AGE_KNOTS: [u32; 14] = [20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85];

/// 2020 factors: `[distance][M=0, F=1][knot]`
const FACTORS_2020: [[[f64; 14]; 2]; 5] = [
    // 5K
    [
        [1.000, 1.000, 1.005, 1.020, 1.048, 1.089, 1.147, 1.222, 1.318, 1.442, 1.602, 1.810, 2.088, 2.458],
        [1.000, 1.000, 1.008, 1.027, 1.058, 1.102, 1.163, 1.244, 1.349, 1.485, 1.661, 1.890, 2.188, 2.576],
    ],
    // 8K
    [
        [1.000, 1.000, 1.006, 1.022, 1.052, 1.096, 1.158, 1.239, 1.343, 1.477, 1.650, 1.873, 2.164, 2.546],
        [1.000, 1.000, 1.009, 1.029, 1.062, 1.109, 1.174, 1.260, 1.372, 1.516, 1.701, 1.940, 2.251, 2.653],
    ],
    // 10K
    [
        [1.000, 1.000, 1.007, 1.024, 1.056, 1.103, 1.169, 1.256, 1.368, 1.512, 1.698, 1.936, 2.240, 2.634],
        [1.000, 1.000, 1.010, 1.031, 1.066, 1.116, 1.185, 1.276, 1.395, 1.547, 1.741, 1.990, 2.314, 2.730],
    ],
    // Half marathon
    [
        [1.000, 1.000, 1.009, 1.028, 1.064, 1.117, 1.191, 1.289, 1.418, 1.582, 1.792, 2.062, 2.408, 2.850],
        [1.000, 1.000, 1.012, 1.035, 1.074, 1.130, 1.207, 1.308, 1.441, 1.609, 1.821, 2.090, 2.440, 2.884],
    ],
    // Marathon
    [
        [1.000, 1.000, 1.011, 1.032, 1.072, 1.131, 1.213, 1.322, 1.468, 1.652, 1.886, 2.188, 2.576, 3.066],
        [1.000, 1.000, 1.014, 1.039, 1.082, 1.144, 1.229, 1.340, 1.487, 1.671, 1.901, 2.190, 2.566, 3.038],
    ],
];

/// Open (peak-age) standard in seconds: `[distance][M=0, F=1]`
const OPEN_STANDARDS: [[f64; 2]; 5] = [
    [769.0, 856.0],
    [1306.0, 1450.0],
    [1603.0, 1783.0],
    [3472.0, 3862.0],
    [7299.0, 8044.0],
];

fn gender_index(gender: &str) -> Option<usize> {
    match gender.trim().to_ascii_uppercase().as_str() {
        "M" => Some(0),
        "F" => Some(1),
        _ => None,
    }
}

/// Factor for (distance, age, gender)
///
/// Linear between knots, clamped to the first/last knot outside 20-85.
/// Genders other than M/F get 1.0.
pub fn get_age_factor(distance: RaceDistance, age: u32, gender: &str) -> f64 {
    let Some(g) = gender_index(gender) else {
        return 1.0;
    };
    let factors = &FACTORS_2020[distance.index()][g];

    let first = AGE_KNOTS[0];
    let last = AGE_KNOTS[AGE_KNOTS.len() - 1];
    if age <= first {
        return factors[0];
    }
    if age >= last {
        return factors[factors.len() - 1];
    }

    for i in 0..AGE_KNOTS.len() - 1 {
        let (low, high) = (AGE_KNOTS[i], AGE_KNOTS[i + 1]);
        if (low..=high).contains(&age) {
            let ratio = f64::from(age - low) / f64::from(high - low);
            return factors[i] + ratio * (factors[i + 1] - factors[i]);
        }
    }
    1.0
}

/// Open standard for the distance, `None` for genders without a table
pub fn open_standard(distance: RaceDistance, gender: &str) -> Option<f64> {
    gender_index(gender).map(|g| OPEN_STANDARDS[distance.index()][g])
}

/// `MM:SS` or `HH:MM:SS`, seconds may be fractional
pub fn time_to_seconds(time: &str) -> Result<f64> {
    let invalid = || RaceSeriesError::InvalidTime(time.to_string());
    let parts: Vec<f64> = time
        .trim()
        .split(':')
        .map(|p| p.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<_>>()?;

    if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(invalid());
    }
    match parts.as_slice() {
        [m, s] => Ok(m * 60.0 + s),
        [h, m, s] => Ok(h * 3600.0 + m * 60.0 + s),
        _ => Err(invalid()),
    }
}

/// One graded performance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGradedResult {
    pub member_id: String,
    pub member_name: String,
    pub race_name: String,
    pub age: u32,
    pub gender: String,
    pub actual_time: String,
    pub actual_seconds: f64,
    pub distance: RaceDistance,
    pub age_factor: f64,
    pub age_graded_percentage: f64,
    pub overall_place: u32,
}

impl AgeGradedResult {
    /// Equivalent time at peak age
    pub fn age_graded_seconds(&self) -> f64 {
        self.actual_seconds / self.age_factor
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AgeGradingCalculator {
    factor_year: u16,
}

impl AgeGradingCalculator {
    pub const SUPPORTED_YEARS: [u16; 1] = [2020];

    pub fn new(factor_year: u16) -> Result<Self> {
        if !Self::SUPPORTED_YEARS.contains(&factor_year) {
            return Err(RaceSeriesError::UnsupportedFactorYear(factor_year));
        }
        Ok(Self { factor_year })
    }

    pub fn factor_year(&self) -> u16 {
        self.factor_year
    }

    /// Grade one finisher; `None` when any input is missing or unusable
    pub fn calculate(&self, member: &Member, finisher: &FinisherRecord, race_name: &str) -> Option<AgeGradedResult> {
        let age = member.age.filter(|a| *a > 0)?;
        let gender = member.gender_code()?;

        let Some(distance) = infer_race_distance(race_name) else {
            debug!(race = race_name, "distance not recognised; skipping age grading");
            return None;
        };
        let Some(standard) = open_standard(distance, &gender) else {
            debug!(member_id = %member.member_id, gender = %gender, "no age-grading table for gender");
            return None;
        };

        let actual_seconds = match time_to_seconds(&finisher.time) {
            Ok(secs) if secs > 0.0 => secs,
            _ => {
                debug!(member_id = %member.member_id, time = %finisher.time, "unusable time; skipping age grading");
                return None;
            }
        };

        let age_factor = get_age_factor(distance, age, &gender);
        Some(AgeGradedResult {
            member_id: member.member_id.clone(),
            member_name: member.full_name(),
            race_name: race_name.to_string(),
            age,
            gender,
            actual_time: finisher.time.clone(),
            actual_seconds,
            distance,
            age_factor,
            age_graded_percentage: standard * age_factor / actual_seconds * 100.0,
            overall_place: finisher.place,
        })
    }

    /// Grade every matched finisher of a race
    ///
    /// A member matched more than once is graded from the better place only.
    pub fn calculate_race(&self, matches: &[MatchResult], race_name: &str) -> Vec<AgeGradedResult> {
        let mut matched: Vec<&MatchResult> = matches.iter().filter(|m| m.matched()).collect();
        matched.sort_by_key(|m| m.finisher.place);

        let mut seen: HashSet<&str> = HashSet::new();
        matched
            .into_iter()
            .filter_map(|m| {
                let member = m.member()?;
                if !seen.insert(member.member_id.as_str()) {
                    warn!(
                        race = race_name,
                        member_id = %member.member_id,
                        place = m.finisher.place,
                        "member matched more than once; grading the better place"
                    );
                    return None;
                }
                self.calculate(member, &m.finisher, race_name)
            })
            .collect()
    }
}

impl Default for AgeGradingCalculator {
    fn default() -> Self {
        Self { factor_year: 2020 }
    }
}
