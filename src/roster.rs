//! Roster and name-correction loaders
//!
//! Roster columns: `member_id, first_name, last_name, email, age, gender`.
//! Correction columns: `race_name, member_name`.

use crate::error::{RaceSeriesError, Result};
use race_series_common::{Member, MemberRegistry, NameCorrections};
use std::path::Path;
use tracing::{debug, info};

/// Header lookup for one CSV file
pub(crate) struct Columns {
    file: String,
    headers: Vec<String>,
}

impl Columns {
    pub(crate) fn new(file: &Path, headers: &csv::StringRecord) -> Self {
        Self {
            file: file.display().to_string(),
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
        }
    }

    pub(crate) fn required(&self, name: &str) -> Result<usize> {
        self.optional(name).ok_or_else(|| RaceSeriesError::MissingColumn {
            file: self.file.clone(),
            column: name.to_string(),
        })
    }

    pub(crate) fn optional(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Field value, or "" when the column is absent or the row is short
pub(crate) fn field<'r>(record: &'r csv::StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

/// Optional integer field; blank or unparseable values become `None`
pub(crate) fn optional_number(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

pub(crate) fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?)
}

/// Load members in file order
///
/// First and last names are trimmed; email and gender are kept verbatim
/// (empty string when blank), age is `None` when blank or unparseable.
pub fn load_members(path: &Path) -> Result<Vec<Member>> {
    if !path.exists() {
        return Err(RaceSeriesError::MemberFileNotFound(path.display().to_string()));
    }

    let mut reader = open_reader(path)?;
    let columns = Columns::new(path, reader.headers()?);
    let id_idx = columns.required("member_id")?;
    let first_idx = columns.required("first_name")?;
    let last_idx = columns.required("last_name")?;
    let email_idx = columns.optional("email");
    let age_idx = columns.optional("age");
    let gender_idx = columns.optional("gender");

    let mut members = Vec::new();
    for record in reader.records() {
        let record = record?;
        let age_raw = field(&record, age_idx);
        let age = optional_number(age_raw);
        if age.is_none() && !age_raw.trim().is_empty() {
            debug!(member_id = field(&record, Some(id_idx)), age = age_raw, "unparseable age ignored");
        }

        members.push(Member {
            member_id: field(&record, Some(id_idx)).to_string(),
            first_name: field(&record, Some(first_idx)).trim().to_string(),
            last_name: field(&record, Some(last_idx)).trim().to_string(),
            email: field(&record, email_idx).to_string(),
            age,
            gender: field(&record, gender_idx).to_string(),
        });
    }

    info!(count = members.len(), path = %path.display(), "members loaded");
    Ok(members)
}

/// Load the correction table; rows with a blank side are skipped
pub fn load_corrections(path: &Path) -> Result<NameCorrections> {
    if !path.exists() {
        return Err(RaceSeriesError::CorrectionsFileNotFound(path.display().to_string()));
    }

    let mut reader = open_reader(path)?;
    let columns = Columns::new(path, reader.headers()?);
    let race_idx = columns.required("race_name")?;
    let member_idx = columns.required("member_name")?;

    let mut corrections = NameCorrections::new();
    for record in reader.records() {
        let record = record?;
        let race_name = field(&record, Some(race_idx));
        let member_name = field(&record, Some(member_idx));
        if !corrections.insert(race_name, member_name) {
            debug!(race_name, member_name, "blank correction row skipped");
        }
    }

    info!(count = corrections.len(), path = %path.display(), "name corrections loaded");
    Ok(corrections)
}

/// Roster plus optional corrections, frozen into a registry
pub fn load_registry(members_path: &Path, corrections_path: Option<&Path>) -> Result<MemberRegistry> {
    let members = load_members(members_path)?;
    let corrections = match corrections_path {
        Some(path) => load_corrections(path)?,
        None => NameCorrections::new(),
    };

    Ok(MemberRegistry::builder()
        .members(members)
        .corrections(corrections)
        .build()?)
}
