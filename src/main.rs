use clap::Parser;
use race_series::{cli, config, error, logging, runner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Score {
            members,
            races,
            corrections,
            output,
            categories,
            major,
            max_races,
            min_confidence,
            ambiguity_threshold,
            age_grading_year,
            review,
            detailed,
        } => {
            println!("🏃 race-series - scoring\n");

            let mut options = runner::ScoreOptions::from_config(&config, members, races);
            options.corrections = corrections;
            options.categories = categories.as_deref().map(runner::parse_categories);
            options.major_races.extend(major);
            options.review = review;
            options.detailed = detailed;
            options.show_progress = !cli.verbose;
            if let Some(dir) = output {
                options.output_dir = dir;
            }
            if let Some(n) = max_races {
                options.max_races = n;
            }
            if let Some(v) = min_confidence {
                options.matcher.min_confidence = v;
            }
            if let Some(v) = ambiguity_threshold {
                options.matcher.ambiguity_threshold = v;
            }
            if let Some(year) = age_grading_year {
                options.age_grading_year = year;
            }
            if options.max_races == 0 {
                return Err(error::RaceSeriesError::Config("--max-races must be at least 1".into()));
            }

            let summary = runner::score_series(&options)?;

            for row in summary.age_graded.rows().iter().take(5) {
                println!(
                    "  {}. {} - {:.2}% ({} races)",
                    row.rank, row.member_name, row.average_percentage, row.races_counted
                );
            }
            if summary.age_graded.len() > 5 {
                println!("  ... and {} more", summary.age_graded.len() - 5);
            }

            for (category, rows) in summary.standings.categories() {
                let leader = rows
                    .first()
                    .map(|r| format!("{} ({} pts)", r.member_name, r.total_points))
                    .unwrap_or_default();
                println!("  {:<12} {:>3} runners  leader: {}", category, rows.len(), leader);
            }

            println!("\n✅ Done");
        }

        Commands::Match {
            members,
            race,
            corrections,
            top,
        } => {
            runner::print_race_matches(
                &members,
                corrections.as_deref(),
                &race,
                config.matcher_config(),
                top,
            )?;
        }

        Commands::Config { set, show } => {
            let mut config = config;

            if let Some(assignment) = set {
                config.set(&assignment)?;
                config.save()?;
                println!("✔ Saved {}", Config::config_path()?.display());
            }

            if show {
                println!("Config: {}", Config::config_path()?.display());
                println!("  min_confidence: {}", config.min_confidence);
                println!("  ambiguity_threshold: {}", config.ambiguity_threshold);
                println!("  max_races: {}", config.max_races);
                println!("  review_below: {}", config.review_below);
                println!("  age_grading_year: {}", config.age_grading_year);
                println!("  output_dir: {}", config.output_dir.display());
                println!("  major_races: {}", config.major_races.join(", "));
            }
        }
    }

    Ok(())
}
