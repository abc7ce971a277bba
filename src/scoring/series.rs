//! Series accumulation
//!
//! [`SeriesBuilder`] collects race points race by race (single writer), then
//! [`SeriesBuilder::finish`] freezes them into read-only [`SeriesStandings`]:
//!
//! - `{G}_overall` for every known gender G
//! - `{G}_{age group}` when both age and gender are known
//!
//! In every category a member's total is the sum of their best `max_races`
//! race totals.

use super::{AgeGroup, RacePoints};
use race_series_common::MemberRegistry;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Scoring bucket
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Category {
    pub gender: String,
    pub age_group: Option<AgeGroup>,
}

impl Category {
    pub fn overall(gender: &str) -> Self {
        Self {
            gender: gender.to_string(),
            age_group: None,
        }
    }

    pub fn age_group(gender: &str, age_group: AgeGroup) -> Self {
        Self {
            gender: gender.to_string(),
            age_group: Some(age_group),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.age_group {
            Some(group) => write!(f, "{}_{}", self.gender, group),
            None => write!(f, "{}_overall", self.gender),
        }
    }
}

/// One ranked line of a category table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    pub rank: usize,
    pub member_id: String,
    pub member_name: String,
    /// Race name -> race total, for every race the member scored in
    pub race_points: HashMap<String, u32>,
    pub races_counted: usize,
    pub total_points: u32,
}

/// Best-N total for one member across every race, category-independent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTotal {
    pub member_id: String,
    pub member_name: String,
    pub races_completed: usize,
    pub total_points: u32,
    /// Counted races, best first
    pub race_details: Vec<RacePoints>,
}

#[derive(Debug, Default)]
pub struct SeriesBuilder {
    race_names: Vec<String>,
    points: Vec<RacePoints>,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a race; its name keeps its first-seen column position
    pub fn add_race(&mut self, race_name: &str, race_points: Vec<RacePoints>) {
        if !self.race_names.iter().any(|n| n == race_name) {
            self.race_names.push(race_name.to_string());
        }
        self.points.extend(race_points);
    }

    pub fn race_names(&self) -> &[String] {
        &self.race_names
    }

    pub fn finish(self, registry: &MemberRegistry, max_races: usize) -> SeriesStandings {
        // Per member, in first-scored order
        let mut order: Vec<String> = Vec::new();
        let mut by_member: HashMap<String, Vec<RacePoints>> = HashMap::new();
        for rp in self.points {
            if !by_member.contains_key(&rp.member_id) {
                order.push(rp.member_id.clone());
            }
            by_member.entry(rp.member_id.clone()).or_default().push(rp);
        }

        let mut categories: BTreeMap<String, Vec<StandingRow>> = BTreeMap::new();
        let mut totals = Vec::with_capacity(order.len());

        for member_id in &order {
            let mut races = by_member.remove(member_id).unwrap_or_default();
            races.sort_by(|a, b| b.total_points().cmp(&a.total_points()));

            let member = registry.get(member_id);
            let member_name = member
                .map(|m| m.full_name())
                .unwrap_or_else(|| "Unknown".to_string());

            let counted: Vec<RacePoints> = races.iter().take(max_races).cloned().collect();
            let total_points: u32 = counted.iter().map(|r| r.total_points()).sum();

            if let Some(member) = member {
                if let Some(gender) = member.gender_code() {
                    let race_points: HashMap<String, u32> = races
                        .iter()
                        .map(|r| (r.race_name.clone(), r.total_points()))
                        .collect();
                    let row = StandingRow {
                        rank: 0,
                        member_id: member_id.clone(),
                        member_name: member_name.clone(),
                        race_points,
                        races_counted: counted.len(),
                        total_points,
                    };

                    let mut member_categories = vec![Category::overall(&gender)];
                    if let Some(group) = AgeGroup::from_age(member.age) {
                        member_categories.push(Category::age_group(&gender, group));
                    }
                    for category in member_categories {
                        categories.entry(category.to_string()).or_default().push(row.clone());
                    }
                }
            }

            totals.push(SeriesTotal {
                member_id: member_id.clone(),
                member_name,
                races_completed: counted.len(),
                total_points,
                race_details: counted,
            });
        }

        for rows in categories.values_mut() {
            rows.sort_by(|a, b| {
                b.total_points
                    .cmp(&a.total_points)
                    .then_with(|| a.member_id.cmp(&b.member_id))
            });
            for (idx, row) in rows.iter_mut().enumerate() {
                row.rank = idx + 1;
            }
        }

        totals.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.member_id.cmp(&b.member_id))
        });

        SeriesStandings {
            race_names: self.race_names,
            categories,
            totals,
        }
    }
}

/// Frozen series results
#[derive(Debug, Clone, Default)]
pub struct SeriesStandings {
    race_names: Vec<String>,
    categories: BTreeMap<String, Vec<StandingRow>>,
    totals: Vec<SeriesTotal>,
}

impl SeriesStandings {
    /// Race columns in first-seen order
    pub fn race_names(&self) -> &[String] {
        &self.race_names
    }

    /// Category name -> ranked rows, sorted by category name
    pub fn categories(&self) -> &BTreeMap<String, Vec<StandingRow>> {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&[StandingRow]> {
        self.categories.get(name).map(|rows| rows.as_slice())
    }

    /// Every scoring member, ranked by best-N total
    pub fn overall_totals(&self) -> &[SeriesTotal] {
        &self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use race_series_common::Member;

    fn rp(member_id: &str, race: &str, overall_points: u32, age_group_points: u32) -> RacePoints {
        RacePoints {
            member_id: member_id.to_string(),
            race_name: race.to_string(),
            overall_place: 1,
            overall_points,
            age_group: None,
            age_group_place: Some(1),
            age_group_points,
            gender: None,
        }
    }

    fn registry() -> MemberRegistry {
        MemberRegistry::builder()
            .member(Member::new("M001", "John", "Doe").with_age(35).with_gender("M"))
            .member(Member::new("M002", "Jane", "Smith").with_age(28).with_gender("F"))
            .member(Member::new("M003", "Bob", "Jones").with_gender("M"))
            .member(Member::new("M004", "Pat", "Lee").with_age(40))
            .build()
            .unwrap()
    }

    #[test]
    fn test_race_names_first_seen_order() {
        let mut builder = SeriesBuilder::new();
        builder.add_race("summer_8k", vec![]);
        builder.add_race("spring_5k", vec![]);
        builder.add_race("summer_8k", vec![]);
        assert_eq!(builder.race_names(), ["summer_8k", "spring_5k"]);
    }

    #[test]
    fn test_best_n_races_counted() {
        let mut builder = SeriesBuilder::new();
        for (i, pts) in [10u32, 50, 30, 40, 20].iter().enumerate() {
            builder.add_race(&format!("race_{}", i), vec![rp("M001", &format!("race_{}", i), *pts, 0)]);
        }
        let standings = builder.finish(&registry(), 3);

        let rows = standings.category("M_overall").unwrap();
        assert_eq!(rows[0].total_points, 120);
        assert_eq!(rows[0].races_counted, 3);
        assert_eq!(rows[0].race_points.len(), 5);

        let totals = standings.overall_totals();
        assert_eq!(totals[0].race_details.len(), 3);
        assert_eq!(totals[0].race_details[0].total_points(), 50);
    }

    #[test]
    fn test_category_membership() {
        let mut builder = SeriesBuilder::new();
        builder.add_race(
            "spring_5k",
            vec![
                rp("M001", "spring_5k", 75, 15),
                rp("M002", "spring_5k", 73, 15),
                rp("M003", "spring_5k", 71, 15),
                rp("M004", "spring_5k", 69, 15),
            ],
        );
        let standings = builder.finish(&registry(), 7);

        let names: Vec<&str> = standings.categories().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["F_20-29", "F_overall", "M_30-39", "M_overall"]);

        // No age: overall only. No gender: no category at all.
        let m_overall: Vec<&str> = standings
            .category("M_overall")
            .unwrap()
            .iter()
            .map(|r| r.member_id.as_str())
            .collect();
        assert_eq!(m_overall, vec!["M001", "M003"]);
        assert_eq!(standings.category("M_30-39").unwrap().len(), 1);
        assert_eq!(standings.overall_totals().len(), 4);
    }

    #[test]
    fn test_ranking_and_ties() {
        let reg = MemberRegistry::builder()
            .member(Member::new("M002", "Bob", "Jones").with_gender("M"))
            .member(Member::new("M001", "John", "Doe").with_gender("M"))
            .member(Member::new("M003", "Tim", "Long").with_gender("M"))
            .build()
            .unwrap();
        let mut builder = SeriesBuilder::new();
        builder.add_race(
            "spring_5k",
            vec![rp("M003", "spring_5k", 10, 0), rp("M002", "spring_5k", 60, 0), rp("M001", "spring_5k", 60, 0)],
        );
        let standings = builder.finish(&reg, 7);
        let rows = standings.category("M_overall").unwrap();

        assert_eq!(rows[0].member_id, "M001");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].member_id, "M002");
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[2].member_id, "M003");
        assert_eq!(rows[2].rank, 3);
    }

    #[test]
    fn test_unknown_member_only_in_totals() {
        let mut builder = SeriesBuilder::new();
        builder.add_race("spring_5k", vec![rp("X999", "spring_5k", 75, 15)]);
        let standings = builder.finish(&registry(), 7);
        assert!(standings.categories().is_empty());
        assert_eq!(standings.overall_totals()[0].member_name, "Unknown");
    }
}
