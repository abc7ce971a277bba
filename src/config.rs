use crate::error::{RaceSeriesError, Result};
use race_series_common::MatcherConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MAX_RACES: usize = 7;
pub const DEFAULT_REVIEW_BELOW: f64 = 0.90;
pub const DEFAULT_FACTOR_YEAR: u16 = 2020;

/// Persisted defaults, overridden per run by CLI flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub min_confidence: f64,
    pub ambiguity_threshold: f64,
    /// Best-N races counted toward a series total
    pub max_races: usize,
    /// Accepted matches below this confidence go to the review report
    pub review_below: f64,
    pub age_grading_year: u16,
    pub output_dir: PathBuf,
    /// Race names scored on the 100-point scale
    pub major_races: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let matcher = MatcherConfig::default();
        Self {
            min_confidence: matcher.min_confidence,
            ambiguity_threshold: matcher.ambiguity_threshold,
            max_races: DEFAULT_MAX_RACES,
            review_below: DEFAULT_REVIEW_BELOW,
            age_grading_year: DEFAULT_FACTOR_YEAR,
            output_dir: PathBuf::from("data/output"),
            major_races: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RaceSeriesError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("race-series").join("config.json"))
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            min_confidence: self.min_confidence,
            ambiguity_threshold: self.ambiguity_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.matcher_config().validate()?;
        if self.max_races == 0 {
            return Err(RaceSeriesError::Config("max_races must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.review_below) {
            return Err(RaceSeriesError::Config(format!(
                "review_below must be within 0.0..=1.0 (got {})",
                self.review_below
            )));
        }
        Ok(())
    }

    /// Apply a `key=value` assignment from `race-series config --set`
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| RaceSeriesError::Config(format!("expected key=value, got '{}'", assignment)))?;
        let value = value.trim();
        let invalid = |e: &dyn std::fmt::Display| {
            RaceSeriesError::Config(format!("invalid value for {}: {}", key.trim(), e))
        };

        match key.trim() {
            "min_confidence" => self.min_confidence = value.parse().map_err(|e| invalid(&e))?,
            "ambiguity_threshold" => self.ambiguity_threshold = value.parse().map_err(|e| invalid(&e))?,
            "max_races" => self.max_races = value.parse().map_err(|e| invalid(&e))?,
            "review_below" => self.review_below = value.parse().map_err(|e| invalid(&e))?,
            "age_grading_year" => self.age_grading_year = value.parse().map_err(|e| invalid(&e))?,
            "output_dir" => self.output_dir = PathBuf::from(value),
            "major_races" => {
                self.major_races = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }
            other => return Err(RaceSeriesError::Config(format!("unknown config key '{}'", other))),
        }

        self.validate()
    }
}
