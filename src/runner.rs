//! Series pipeline
//!
//! ## Flow
//! 1. Load the roster (and corrections) into a registry
//! 2. Per race: load, match, score, age-grade, collect review rows
//! 3. Freeze the series and age-graded standings
//! 4. Export the selected files

use crate::age_grading::series::{AgeGradedSeriesBuilder, AgeGradedStandings};
use crate::age_grading::AgeGradingCalculator;
use crate::config::Config;
use crate::error::Result;
use crate::export;
use crate::matcher::{self, MatchStats, ReviewRow};
use crate::race::{self, race_name_from_path};
use crate::roster;
use crate::scoring::series::{SeriesBuilder, SeriesStandings};
use crate::scoring::{self, RaceTier};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use race_series_common::{MatcherConfig, NameMatcher};
use std::path::{Path, PathBuf};
use tracing::info;

/// Category-filter keyword that toggles the age-graded file
pub const AGE_GRADED_CATEGORY: &str = "age_graded";

#[derive(Debug, Clone)]
pub struct ScoreOptions {
    pub members: PathBuf,
    pub races: Vec<PathBuf>,
    pub corrections: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Requested categories, `None` for all
    pub categories: Option<Vec<String>>,
    pub major_races: Vec<String>,
    pub max_races: usize,
    pub matcher: MatcherConfig,
    pub age_grading_year: u16,
    pub review_below: f64,
    pub review: bool,
    pub detailed: bool,
    pub show_progress: bool,
}

impl ScoreOptions {
    /// Options seeded from persisted config; callers override per run
    pub fn from_config(config: &Config, members: PathBuf, races: Vec<PathBuf>) -> Self {
        Self {
            members,
            races,
            corrections: None,
            output_dir: config.output_dir.clone(),
            categories: None,
            major_races: config.major_races.clone(),
            max_races: config.max_races,
            matcher: config.matcher_config(),
            age_grading_year: config.age_grading_year,
            review_below: config.review_below,
            review: false,
            detailed: false,
            show_progress: false,
        }
    }

    /// Whether `age_graded.csv` is written (all when no filter is given)
    pub fn include_age_graded(&self) -> bool {
        match &self.categories {
            Some(list) => list.iter().any(|c| c == AGE_GRADED_CATEGORY),
            None => true,
        }
    }

    /// Category names to export, without the age-graded keyword
    pub fn category_filter(&self) -> Option<Vec<String>> {
        let list = self.categories.as_ref()?;
        let filtered: Vec<String> = list
            .iter()
            .filter(|c| c.as_str() != AGE_GRADED_CATEGORY)
            .cloned()
            .collect();
        if filtered.is_empty() {
            None
        } else {
            Some(filtered)
        }
    }
}

/// Parse `--categories a,b,c`
pub fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
pub struct RaceReport {
    pub race_name: String,
    pub loaded_on: NaiveDate,
    pub tier: RaceTier,
    pub stats: MatchStats,
    pub age_graded: usize,
}

/// Files written by one run
#[derive(Debug, Clone, Default)]
pub struct OutputFiles {
    pub category_files: Vec<PathBuf>,
    pub age_graded_file: Option<PathBuf>,
    pub review_file: Option<PathBuf>,
    pub summary_file: Option<PathBuf>,
    pub detailed_file: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub members: usize,
    pub races: Vec<RaceReport>,
    pub standings: SeriesStandings,
    pub age_graded: AgeGradedStandings,
    pub review_rows: Vec<ReviewRow>,
    pub files: OutputFiles,
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// Run the whole scoring pipeline and write the output files
pub fn score_series(options: &ScoreOptions) -> Result<RunSummary> {
    let name_matcher = NameMatcher::new(options.matcher)?;
    let calculator = AgeGradingCalculator::new(options.age_grading_year)?;

    // 1. Roster
    println!("[1/4] Loading members...");
    let registry = roster::load_registry(&options.members, options.corrections.as_deref())?;
    println!(
        "✔ {} members, {} name corrections\n",
        registry.len(),
        registry.corrections().len()
    );

    // 2. Races
    println!("[2/4] Processing {} races...", options.races.len());
    let mut series = SeriesBuilder::new();
    let mut age_graded = AgeGradedSeriesBuilder::new();
    let mut review_rows = Vec::new();
    let mut reports = Vec::with_capacity(options.races.len());

    let bar = progress_bar(options.races.len(), options.show_progress);
    for path in &options.races {
        bar.set_message(race_name_from_path(path));
        let race = race::load_race(path)?;
        let tier = RaceTier::for_race(&race.name, &options.major_races);

        let matches = matcher::match_race(&race, &registry, &name_matcher);
        let stats = matcher::match_stats(&matches);
        series.add_race(&race.name, scoring::calculate_race_points(&matches, &race.name, tier));

        let graded = calculator.calculate_race(&matches, &race.name);
        let graded_count = graded.len();
        age_graded.add_race(&race.name, graded);

        review_rows.extend(matcher::review_rows(&race.name, &matches, options.review_below));
        info!(
            race = %race.name,
            loaded_on = %race.loaded_on,
            tier = %tier,
            finishers = stats.finishers,
            matched = stats.matched,
            ambiguous = stats.ambiguous,
            age_graded = graded_count,
            "race scored"
        );

        reports.push(RaceReport {
            race_name: race.name,
            loaded_on: race.loaded_on,
            tier,
            stats,
            age_graded: graded_count,
        });
        bar.inc(1);
    }
    bar.finish_and_clear();

    for report in &reports {
        println!(
            "  {} ({}, loaded {}): {}/{} matched, {} ambiguous, {} age-graded",
            report.race_name,
            report.tier,
            report.loaded_on,
            report.stats.matched,
            report.stats.finishers,
            report.stats.ambiguous,
            report.age_graded
        );
    }
    println!("✔ {} races processed\n", reports.len());

    // 3. Standings
    println!("[3/4] Calculating standings...");
    let standings = series.finish(&registry, options.max_races);
    let age_graded = age_graded.finish(options.max_races);
    println!(
        "✔ {} categories, {} age-graded runners\n",
        standings.categories().len(),
        age_graded.len()
    );

    // 4. Export
    println!("[4/4] Exporting to {}...", options.output_dir.display());
    let files = export_outputs(options, &standings, &age_graded, &review_rows)?;
    println!("✔ {} category files written", files.category_files.len());
    if let Some(path) = &files.age_graded_file {
        println!("✔ Age-graded standings: {}", path.display());
    }
    if let Some(path) = &files.review_file {
        println!("✔ Match review ({} rows): {}", review_rows.len(), path.display());
    }
    if let Some(path) = &files.summary_file {
        println!("✔ Series summary: {}", path.display());
    }
    if let Some(path) = &files.detailed_file {
        println!("✔ Series detail: {}", path.display());
    }

    Ok(RunSummary {
        members: registry.len(),
        races: reports,
        standings,
        age_graded,
        review_rows,
        files,
    })
}

fn export_outputs(
    options: &ScoreOptions,
    standings: &SeriesStandings,
    age_graded: &AgeGradedStandings,
    review_rows: &[ReviewRow],
) -> Result<OutputFiles> {
    let dir = options.output_dir.as_path();
    let filter = options.category_filter();
    let mut files = OutputFiles {
        category_files: export::export_category_standings(standings, dir, filter.as_deref())?,
        ..Default::default()
    };

    if options.include_age_graded() {
        let path = dir.join("age_graded.csv");
        export::export_age_graded_standings(age_graded, &path)?;
        files.age_graded_file = Some(path);
    }

    if options.review {
        let path = dir.join("match_review.csv");
        export::export_match_review(review_rows, &path)?;
        files.review_file = Some(path);
    }

    if options.detailed {
        let summary_path = dir.join("series_summary.csv");
        let detailed_path = dir.join("series_detailed.csv");
        export::export_summary_csv(standings.overall_totals(), &summary_path)?;
        export::export_detailed_csv(standings.overall_totals(), &detailed_path)?;
        files.summary_file = Some(summary_path);
        files.detailed_file = Some(detailed_path);
    }

    Ok(files)
}

/// Print how every finisher of one race resolves
pub fn print_race_matches(
    members: &Path,
    corrections: Option<&Path>,
    race_path: &Path,
    matcher_config: MatcherConfig,
    top: usize,
) -> Result<MatchStats> {
    let name_matcher = NameMatcher::new(matcher_config)?;
    let registry = roster::load_registry(members, corrections)?;
    let race = race::load_race(race_path)?;
    let matches = matcher::match_race(&race, &registry, &name_matcher);

    println!("{} ({} finishers)\n", race.name, race.finishers.len());
    for m in &matches {
        let verdict = match m.member() {
            Some(member) => format!(
                "{} {} ({:.3}){}",
                member.member_id,
                member.full_name(),
                m.outcome.confidence(),
                if m.outcome.is_ambiguous() { " [ambiguous]" } else { "" }
            ),
            None => format!("no match ({:.3})", m.outcome.confidence()),
        };
        println!("{:>4}. {:<28} -> {}", m.finisher.place, m.finisher.name, verdict);

        if top > 0 {
            for candidate in name_matcher.rank(&m.finisher.name, &registry, top) {
                println!(
                    "        {:.3}  {} {}",
                    candidate.score,
                    candidate.member.member_id,
                    candidate.member.full_name()
                );
            }
        }
    }

    let stats = matcher::match_stats(&matches);
    println!(
        "\n✔ {}/{} matched, {} ambiguous",
        stats.matched, stats.finishers, stats.ambiguous
    );
    Ok(stats)
}
