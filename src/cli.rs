use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "race-series")]
#[command(about = "Running club race-series scoring", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a series of races and write standings files
    Score {
        /// Member roster CSV
        #[arg(short, long)]
        members: PathBuf,

        /// Race results CSVs, in series order
        #[arg(short, long = "race", required = true, num_args = 1..)]
        races: Vec<PathBuf>,

        /// Name corrections CSV (race_name, member_name)
        #[arg(short, long)]
        corrections: Option<PathBuf>,

        /// Output directory (default from config: data/output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Comma-separated categories, e.g. "M_overall,F_30-39,age_graded"
        #[arg(long)]
        categories: Option<String>,

        /// Race scored on the 100-point scale (repeatable)
        #[arg(long = "major")]
        major: Vec<String>,

        /// Best-N races counted per member
        #[arg(long)]
        max_races: Option<usize>,

        /// Minimum similarity to accept a match
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Best-vs-second gap flagged as ambiguous
        #[arg(long)]
        ambiguity_threshold: Option<f64>,

        /// Age-grading factor table year
        #[arg(long)]
        age_grading_year: Option<u16>,

        /// Write match_review.csv
        #[arg(long)]
        review: bool,

        /// Write series_summary.csv and series_detailed.csv
        #[arg(long)]
        detailed: bool,
    },

    /// Show how each finisher of one race resolves to a member
    Match {
        /// Member roster CSV
        #[arg(short, long)]
        members: PathBuf,

        /// Race results CSV
        #[arg(short, long)]
        race: PathBuf,

        /// Name corrections CSV
        #[arg(short, long)]
        corrections: Option<PathBuf>,

        /// Also list the N best candidates per finisher
        #[arg(long, default_value = "0")]
        top: usize,
    },

    /// Show or change saved defaults
    Config {
        /// Set a value, e.g. "max_races=6"
        #[arg(long)]
        set: Option<String>,

        /// Print the current configuration
        #[arg(long)]
        show: bool,
    },
}
