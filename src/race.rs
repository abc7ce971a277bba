//! Race results loader
//!
//! Columns: `place, name, time, age, gender, bib_number`. The race's display
//! name is the file stem, never anything inside the file.

use crate::error::{RaceSeriesError, Result};
use crate::roster::{field, open_reader, optional_number, Columns};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// One finishing record, in results-file order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinisherRecord {
    pub place: u32,
    pub name: String,
    pub time: String,
    pub age: Option<u32>,
    pub gender: String,
    pub bib_number: String,
}

impl FinisherRecord {
    pub fn new(place: u32, name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            place,
            name: name.into(),
            time: time.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Race {
    pub name: String,
    /// Date the file was loaded; results files carry no race date
    pub loaded_on: NaiveDate,
    pub finishers: Vec<FinisherRecord>,
}

/// Display name for a results file: its base name without extension
pub fn race_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load one race
///
/// A `place` that is not an integer aborts the load; unparseable ages
/// become `None`, absent gender/bib become "".
pub fn load_race(path: &Path) -> Result<Race> {
    if !path.exists() {
        return Err(RaceSeriesError::RaceFileNotFound(path.display().to_string()));
    }

    let mut reader = open_reader(path)?;
    let columns = Columns::new(path, reader.headers()?);
    let place_idx = columns.required("place")?;
    let name_idx = columns.required("name")?;
    let time_idx = columns.optional("time");
    let age_idx = columns.optional("age");
    let gender_idx = columns.optional("gender");
    let bib_idx = columns.optional("bib_number");

    let mut finishers = Vec::new();
    for record in reader.records() {
        let record = record?;
        let place_raw = field(&record, Some(place_idx)).trim();
        let place: u32 = place_raw.parse().map_err(|_| RaceSeriesError::InvalidRecord {
            file: path.display().to_string(),
            line: record.position().map(|p| p.line()).unwrap_or(0),
            message: format!("invalid place '{}'", place_raw),
        })?;

        finishers.push(FinisherRecord {
            place,
            name: field(&record, Some(name_idx)).trim().to_string(),
            time: field(&record, time_idx).to_string(),
            age: optional_number(field(&record, age_idx)),
            gender: field(&record, gender_idx).to_string(),
            bib_number: field(&record, bib_idx).to_string(),
        });
    }

    let race = Race {
        name: race_name_from_path(path),
        loaded_on: chrono::Local::now().date_naive(),
        finishers,
    };
    info!(race = %race.name, finishers = race.finishers.len(), "race loaded");
    Ok(race)
}
