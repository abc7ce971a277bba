//! Age-graded series
//!
//! One combined table across genders: a member's score is the average of
//! their best `max_races` percentages. Higher average ranks first; equal
//! averages go to the member with more counted races.

use super::AgeGradedResult;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGradedRow {
    pub rank: usize,
    pub member_id: String,
    pub member_name: String,
    /// Race name -> best percentage in that race
    pub race_percentages: HashMap<String, f64>,
    pub races_counted: usize,
    pub average_percentage: f64,
    /// Counted results, best first
    pub race_details: Vec<AgeGradedResult>,
}

#[derive(Debug, Default)]
pub struct AgeGradedSeriesBuilder {
    race_names: Vec<String>,
    results: Vec<AgeGradedResult>,
}

impl AgeGradedSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_race(&mut self, race_name: &str, results: Vec<AgeGradedResult>) {
        if !self.race_names.iter().any(|n| n == race_name) {
            self.race_names.push(race_name.to_string());
        }
        self.results.extend(results);
    }

    pub fn race_names(&self) -> &[String] {
        &self.race_names
    }

    pub fn finish(self, max_races: usize) -> AgeGradedStandings {
        let mut order: Vec<String> = Vec::new();
        let mut by_member: HashMap<String, Vec<AgeGradedResult>> = HashMap::new();
        for result in self.results {
            if !by_member.contains_key(&result.member_id) {
                order.push(result.member_id.clone());
            }
            by_member.entry(result.member_id.clone()).or_default().push(result);
        }

        let mut rows: Vec<AgeGradedRow> = order
            .into_iter()
            .filter_map(|member_id| {
                let mut results = by_member.remove(&member_id)?;
                results.sort_by(|a, b| b.age_graded_percentage.total_cmp(&a.age_graded_percentage));

                let mut race_percentages: HashMap<String, f64> = HashMap::new();
                for r in &results {
                    race_percentages
                        .entry(r.race_name.clone())
                        .or_insert(r.age_graded_percentage);
                }

                let counted: Vec<AgeGradedResult> = results.into_iter().take(max_races).collect();
                if counted.is_empty() {
                    return None;
                }
                let average =
                    counted.iter().map(|r| r.age_graded_percentage).sum::<f64>() / counted.len() as f64;

                Some(AgeGradedRow {
                    rank: 0,
                    member_name: counted[0].member_name.clone(),
                    member_id,
                    race_percentages,
                    races_counted: counted.len(),
                    average_percentage: average,
                    race_details: counted,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.average_percentage
                .total_cmp(&a.average_percentage)
                .then_with(|| b.races_counted.cmp(&a.races_counted))
        });
        for (idx, row) in rows.iter_mut().enumerate() {
            row.rank = idx + 1;
        }

        AgeGradedStandings {
            race_names: self.race_names,
            rows,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgeGradedStandings {
    race_names: Vec<String>,
    rows: Vec<AgeGradedRow>,
}

impl AgeGradedStandings {
    pub fn race_names(&self) -> &[String] {
        &self.race_names
    }

    pub fn rows(&self) -> &[AgeGradedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age_grading::RaceDistance;

    fn result(member_id: &str, race: &str, pct: f64) -> AgeGradedResult {
        AgeGradedResult {
            member_id: member_id.to_string(),
            member_name: format!("Runner {}", member_id),
            race_name: race.to_string(),
            age: 40,
            gender: "M".to_string(),
            actual_time: "20:00".to_string(),
            actual_seconds: 1200.0,
            distance: RaceDistance::Km5,
            age_factor: 1.048,
            age_graded_percentage: pct,
            overall_place: 1,
        }
    }

    #[test]
    fn test_average_of_best_races() {
        let mut builder = AgeGradedSeriesBuilder::new();
        builder.add_race("a_5k", vec![result("M001", "a_5k", 60.0)]);
        builder.add_race("b_5k", vec![result("M001", "b_5k", 80.0)]);
        builder.add_race("c_5k", vec![result("M001", "c_5k", 70.0)]);
        let standings = builder.finish(2);

        let row = &standings.rows()[0];
        assert_eq!(row.races_counted, 2);
        assert!((row.average_percentage - 75.0).abs() < 1e-9);
        assert_eq!(row.race_percentages.len(), 3);
        assert_eq!(standings.race_names(), ["a_5k", "b_5k", "c_5k"]);
    }

    #[test]
    fn test_ties_prefer_more_races() {
        let mut builder = AgeGradedSeriesBuilder::new();
        builder.add_race("a_5k", vec![result("M001", "a_5k", 70.0), result("M002", "a_5k", 70.0)]);
        builder.add_race("b_5k", vec![result("M002", "b_5k", 70.0)]);
        builder.add_race("c_5k", vec![result("M003", "c_5k", 90.0)]);
        let standings = builder.finish(7);

        let ids: Vec<&str> = standings.rows().iter().map(|r| r.member_id.as_str()).collect();
        assert_eq!(ids, vec!["M003", "M002", "M001"]);
        assert_eq!(standings.rows()[2].rank, 3);
    }

    #[test]
    fn test_race_recorded_without_results() {
        let mut builder = AgeGradedSeriesBuilder::new();
        builder.add_race("turkey_trot", vec![]);
        let standings = builder.finish(7);
        assert!(standings.is_empty());
        assert_eq!(standings.race_names(), ["turkey_trot"]);
    }
}
