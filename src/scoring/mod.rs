//! Points engine
//!
//! ## Per-race scoring
//! 1. Overall points from the finishing place (two-segment formula, floor 1)
//! 2. Age-group points from the rank inside the (age group, gender) subgroup
//! 3. Race total = overall + age-group points
//!
//! Series accumulation lives in [`series`].

pub mod series;

use crate::matcher::MatchResult;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Point ceiling class of a race
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceTier {
    /// 75-point races (5K, 8K, 10K ...)
    #[default]
    Standard,
    /// 100-point races (half marathon, county marathon ...)
    Major,
}

impl RaceTier {
    /// Tier for a race name given the configured list of major races
    pub fn for_race(race_name: &str, major_races: &[String]) -> Self {
        if major_races.iter().any(|m| m.trim().eq_ignore_ascii_case(race_name.trim())) {
            RaceTier::Major
        } else {
            RaceTier::Standard
        }
    }

    pub fn overall_ceiling(&self) -> u32 {
        match self {
            RaceTier::Standard => 75,
            RaceTier::Major => 100,
        }
    }

    pub fn age_group_ceiling(&self) -> u32 {
        match self {
            RaceTier::Standard => 15,
            RaceTier::Major => 20,
        }
    }

    /// Places 1-10 drop by 2 from the ceiling, later places drop by 1, never below 1
    ///
    /// 75-point: 1 -> 75, 10 -> 57, 11 -> 56, 66 -> 1
    pub fn overall_points(&self, place: u32) -> u32 {
        let ceiling = i64::from(self.overall_ceiling());
        let place = i64::from(place.max(1));
        let points = if place <= 10 {
            ceiling - 2 * (place - 1)
        } else {
            (ceiling - 18) - (place - 10)
        };
        points.max(1) as u32
    }

    /// 1st in group gets the ceiling, each later place one less, never below 1
    pub fn age_group_points(&self, place_in_group: u32) -> u32 {
        let ceiling = i64::from(self.age_group_ceiling());
        let place = i64::from(place_in_group.max(1));
        (ceiling - (place - 1)).max(1) as u32
    }
}

impl std::fmt::Display for RaceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-point", self.overall_ceiling())
    }
}

/// Ten-year age bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    Under20,
    Age20To29,
    Age30To39,
    Age40To49,
    Age50To59,
    Age60To69,
    Age70To79,
    Age80Plus,
}

impl AgeGroup {
    pub fn from_age(age: Option<u32>) -> Option<Self> {
        let group = match age? {
            0..=19 => AgeGroup::Under20,
            20..=29 => AgeGroup::Age20To29,
            30..=39 => AgeGroup::Age30To39,
            40..=49 => AgeGroup::Age40To49,
            50..=59 => AgeGroup::Age50To59,
            60..=69 => AgeGroup::Age60To69,
            70..=79 => AgeGroup::Age70To79,
            _ => AgeGroup::Age80Plus,
        };
        Some(group)
    }

    /// Label used in category names and exports (file-name safe)
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Under20 => "0-19",
            AgeGroup::Age20To29 => "20-29",
            AgeGroup::Age30To39 => "30-39",
            AgeGroup::Age40To49 => "40-49",
            AgeGroup::Age50To59 => "50-59",
            AgeGroup::Age60To69 => "60-69",
            AgeGroup::Age70To79 => "70-79",
            AgeGroup::Age80Plus => "80+",
        }
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Points one member earned in one race
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RacePoints {
    pub member_id: String,
    pub race_name: String,
    pub overall_place: u32,
    pub overall_points: u32,
    pub age_group: Option<AgeGroup>,
    pub age_group_place: Option<u32>,
    pub age_group_points: u32,
    pub gender: Option<String>,
}

impl RacePoints {
    pub fn total_points(&self) -> u32 {
        self.overall_points + self.age_group_points
    }
}

/// Score the matched finishers of one race
///
/// Unmatched finishers are ignored. Age group and gender come from the
/// member record, not the results file. A member matched twice in the same
/// race only scores for the better place.
pub fn calculate_race_points(matches: &[MatchResult], race_name: &str, tier: RaceTier) -> Vec<RacePoints> {
    let mut matched: Vec<&MatchResult> = matches.iter().filter(|m| m.matched()).collect();
    matched.sort_by_key(|m| m.finisher.place);

    let mut seen: HashSet<&str> = HashSet::new();
    let mut race_points = Vec::with_capacity(matched.len());

    for m in matched {
        let Some(member) = m.member() else { continue };
        if !seen.insert(member.member_id.as_str()) {
            warn!(
                race = race_name,
                member_id = %member.member_id,
                place = m.finisher.place,
                "member matched more than once; keeping the better place"
            );
            continue;
        }

        race_points.push(RacePoints {
            member_id: member.member_id.clone(),
            race_name: race_name.to_string(),
            overall_place: m.finisher.place,
            overall_points: tier.overall_points(m.finisher.place),
            age_group: AgeGroup::from_age(member.age),
            age_group_place: None,
            age_group_points: 0,
            gender: member.gender_code(),
        });
    }

    assign_age_group_points(&mut race_points, tier);
    race_points
}

/// Rank inside each (age group, gender) subgroup by overall place
fn assign_age_group_points(race_points: &mut [RacePoints], tier: RaceTier) {
    let mut groups: HashMap<(Option<AgeGroup>, Option<String>), Vec<usize>> = HashMap::new();
    for (idx, rp) in race_points.iter().enumerate() {
        groups
            .entry((rp.age_group, rp.gender.clone()))
            .or_default()
            .push(idx);
    }

    for indices in groups.values_mut() {
        indices.sort_by_key(|&idx| race_points[idx].overall_place);
        for (rank, &idx) in indices.iter().enumerate() {
            let place_in_group = rank as u32 + 1;
            race_points[idx].age_group_place = Some(place_in_group);
            race_points[idx].age_group_points = tier.age_group_points(place_in_group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::FinisherRecord;
    use race_series_common::{MatchOutcome, Member};

    fn matched(place: u32, member: Member) -> MatchResult {
        MatchResult {
            finisher: FinisherRecord::new(place, member.full_name(), "20:00"),
            outcome: MatchOutcome::accepted(member, 1.0, false),
        }
    }

    #[test]
    fn test_standard_overall_points() {
        let tier = RaceTier::Standard;
        assert_eq!(tier.overall_points(1), 75);
        assert_eq!(tier.overall_points(2), 73);
        assert_eq!(tier.overall_points(10), 57);
        assert_eq!(tier.overall_points(11), 56);
        assert_eq!(tier.overall_points(66), 1);
        assert_eq!(tier.overall_points(67), 1);
        assert_eq!(tier.overall_points(200), 1);
    }

    #[test]
    fn test_major_overall_points() {
        let tier = RaceTier::Major;
        assert_eq!(tier.overall_points(1), 100);
        assert_eq!(tier.overall_points(10), 82);
        assert_eq!(tier.overall_points(11), 81);
        assert_eq!(tier.overall_points(91), 1);
        assert_eq!(tier.overall_points(150), 1);
    }

    #[test]
    fn test_age_group_points() {
        assert_eq!(RaceTier::Standard.age_group_points(1), 15);
        assert_eq!(RaceTier::Standard.age_group_points(2), 14);
        assert_eq!(RaceTier::Standard.age_group_points(15), 1);
        assert_eq!(RaceTier::Standard.age_group_points(40), 1);
        assert_eq!(RaceTier::Major.age_group_points(1), 20);
        assert_eq!(RaceTier::Major.age_group_points(20), 1);
    }

    #[test]
    fn test_age_group_from_age() {
        assert_eq!(AgeGroup::from_age(None), None);
        assert_eq!(AgeGroup::from_age(Some(19)), Some(AgeGroup::Under20));
        assert_eq!(AgeGroup::from_age(Some(20)), Some(AgeGroup::Age20To29));
        assert_eq!(AgeGroup::from_age(Some(39)), Some(AgeGroup::Age30To39));
        assert_eq!(AgeGroup::from_age(Some(80)), Some(AgeGroup::Age80Plus));
        assert_eq!(AgeGroup::Age30To39.to_string(), "30-39");
    }

    #[test]
    fn test_tier_for_race() {
        let majors = vec!["County_Half".to_string()];
        assert_eq!(RaceTier::for_race("county_half", &majors), RaceTier::Major);
        assert_eq!(RaceTier::for_race("spring_5k", &majors), RaceTier::Standard);
    }

    #[test]
    fn test_same_subgroup_ranks() {
        let a = Member::new("M001", "John", "Doe").with_age(35).with_gender("M");
        let b = Member::new("M002", "Bob", "Jones").with_age(36).with_gender("M");
        let points = calculate_race_points(&[matched(5, b), matched(1, a)], "spring_5k", RaceTier::Standard);

        let first = points.iter().find(|p| p.member_id == "M001").unwrap();
        let second = points.iter().find(|p| p.member_id == "M002").unwrap();
        assert_eq!(first.age_group_points, 15);
        assert_eq!(first.age_group_place, Some(1));
        assert_eq!(second.age_group_points, 14);
        assert_eq!(second.overall_points, 67);
        assert_eq!(second.total_points(), 81);
    }

    #[test]
    fn test_different_subgroups_rank_independently() {
        let man = Member::new("M001", "John", "Doe").with_age(35).with_gender("M");
        let woman = Member::new("M002", "Jane", "Smith").with_age(35).with_gender("F");
        let older = Member::new("M003", "Bob", "Jones").with_age(45).with_gender("m");
        let points = calculate_race_points(
            &[matched(1, man), matched(2, woman), matched(3, older)],
            "spring_5k",
            RaceTier::Standard,
        );
        assert!(points.iter().all(|p| p.age_group_points == 15));
        assert_eq!(points[2].gender.as_deref(), Some("M"));
    }

    #[test]
    fn test_unmatched_finishers_ignored() {
        let unmatched = MatchResult {
            finisher: FinisherRecord::new(1, "Unknown Runner", "18:00"),
            outcome: MatchOutcome::rejected(0.3),
        };
        let member = Member::new("M001", "John", "Doe");
        let points = calculate_race_points(&[unmatched, matched(2, member)], "spring_5k", RaceTier::Standard);
        assert_eq!(points.len(), 1);
        // Overall points use the real place, unmatched runners still occupy theirs
        assert_eq!(points[0].overall_points, 73);
    }

    #[test]
    fn test_duplicate_member_keeps_better_place() {
        let member = Member::new("M001", "John", "Doe");
        let points = calculate_race_points(
            &[matched(4, member.clone()), matched(2, member)],
            "spring_5k",
            RaceTier::Standard,
        );
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].overall_place, 2);
    }
}
