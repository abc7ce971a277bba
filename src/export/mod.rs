//! CSV exporters
//!
//! Every writer creates missing parent directories. Text cells are always
//! quoted, even when they look like numbers (member id `1001`, a race named
//! `2024`), and numeric cells never are. Text also goes through
//! [`sanitize_field`] so spreadsheet apps never evaluate it as a formula.

use crate::age_grading::series::AgeGradedStandings;
use crate::error::{RaceSeriesError, Result};
use crate::matcher::ReviewRow;
use crate::scoring::series::{SeriesStandings, SeriesTotal, StandingRow};
use crate::roster::{open_reader, Columns};
use csv::{QuoteStyle, StringRecord, Writer, WriterBuilder};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Prefix `'` to text a spreadsheet would treat as a formula
pub fn sanitize_field(value: &str) -> String {
    match value.chars().next() {
        Some(c) if FORMULA_PREFIXES.contains(&c) => format!("'{}", value),
        _ => value.to_string(),
    }
}

/// Sanitized, quoted text cell for a writer that never quotes on its own
fn text(value: &str) -> String {
    format!("\"{}\"", sanitize_field(value).replace('"', "\"\""))
}

fn text_record<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values.into_iter().map(text).collect()
}

fn create_writer(path: &Path) -> Result<Writer<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_path(path)?)
}

fn header_with_races(race_names: &[String], last: &str) -> Vec<String> {
    let mut header = text_record(["Rank", "Member ID", "Name"]);
    header.extend(race_names.iter().map(|r| text(r)));
    header.push(text(last));
    header
}

/// Which category files to write
///
/// An empty or absent filter selects every category. Requested names with no
/// standings are logged and skipped.
pub fn select_categories<'a>(
    standings: &'a SeriesStandings,
    filter: Option<&[String]>,
) -> Vec<(&'a str, &'a [StandingRow])> {
    let all = standings.categories();
    match filter {
        Some(wanted) if !wanted.is_empty() => {
            for name in wanted.iter().filter(|n| !all.contains_key(n.as_str())) {
                warn!(category = %name, "requested category has no standings");
            }
            all.iter()
                .filter(|(name, _)| wanted.iter().any(|w| w == *name))
                .map(|(name, rows)| (name.as_str(), rows.as_slice()))
                .collect()
        }
        _ => all
            .iter()
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
            .collect(),
    }
}

/// One `{category}.csv` per selected category; returns the written paths
pub fn export_category_standings(
    standings: &SeriesStandings,
    output_dir: &Path,
    filter: Option<&[String]>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let race_names = standings.race_names();

    let mut written = Vec::new();
    for (category, rows) in select_categories(standings, filter) {
        let path = output_dir.join(format!("{}.csv", category));
        let mut writer = create_writer(&path)?;
        writer.write_record(header_with_races(race_names, "Total Points"))?;

        for row in rows {
            let mut record = vec![row.rank.to_string(), text(&row.member_id), text(&row.member_name)];
            record.extend(
                race_names
                    .iter()
                    .map(|race| row.race_points.get(race).map(|p| p.to_string()).unwrap_or_default()),
            );
            record.push(row.total_points.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        debug!(category, rows = rows.len(), path = %path.display(), "category exported");
        written.push(path);
    }
    Ok(written)
}

pub fn export_age_graded_standings(standings: &AgeGradedStandings, path: &Path) -> Result<()> {
    let race_names = standings.race_names();
    let mut writer = create_writer(path)?;
    writer.write_record(header_with_races(race_names, "Avg %"))?;

    for row in standings.rows() {
        let mut record = vec![row.rank.to_string(), text(&row.member_id), text(&row.member_name)];
        record.extend(race_names.iter().map(|race| {
            row.race_percentages
                .get(race)
                .map(|p| format!("{:.2}", p))
                .unwrap_or_default()
        }));
        record.push(format!("{:.2}", row.average_percentage));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_match_review(rows: &[ReviewRow], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(text_record(["Race", "Name", "Confidence", "Reason"]))?;
    for row in rows {
        writer.write_record([
            text(&row.race),
            text(&row.name),
            format!("{:.3}", row.confidence),
            text(&row.reason.to_string()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// `Rank, Member ID, Name, Races, Total Points` for every scoring member
pub fn export_summary_csv(totals: &[SeriesTotal], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(text_record(["Rank", "Member ID", "Name", "Races", "Total Points"]))?;
    for (idx, total) in totals.iter().enumerate() {
        writer.write_record([
            (idx + 1).to_string(),
            text(&total.member_id),
            text(&total.member_name),
            total.races_completed.to_string(),
            total.total_points.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One line per counted race; members without races get a single line
/// with empty race columns
pub fn export_detailed_csv(totals: &[SeriesTotal], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(text_record([
        "Rank",
        "Member ID",
        "Name",
        "Race",
        "Overall Place",
        "Overall Points",
        "Age Group",
        "Age Group Place",
        "Age Group Points",
        "Race Total",
        "Series Total",
    ]))?;

    for (idx, total) in totals.iter().enumerate() {
        let rank = (idx + 1).to_string();
        let id = text(&total.member_id);
        let name = text(&total.member_name);
        let series_total = total.total_points.to_string();

        if total.race_details.is_empty() {
            let mut record = vec![rank, id, name];
            record.extend(std::iter::repeat(String::new()).take(7));
            record.push(series_total);
            writer.write_record(&record)?;
            continue;
        }

        for rp in &total.race_details {
            writer.write_record([
                rank.clone(),
                id.clone(),
                name.clone(),
                text(&rp.race_name),
                rp.overall_place.to_string(),
                rp.overall_points.to_string(),
                rp.age_group.map(|g| text(g.label())).unwrap_or_default(),
                rp.age_group_place.map(|p| p.to_string()).unwrap_or_default(),
                rp.age_group_points.to_string(),
                rp.total_points().to_string(),
                series_total.clone(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// A category file read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    pub race_names: Vec<String>,
    pub rows: Vec<CategoryTableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTableRow {
    pub rank: usize,
    pub member_id: String,
    pub member_name: String,
    /// Race name -> points, races left blank are absent
    pub race_points: BTreeMap<String, u32>,
    pub total_points: u32,
}

/// Numeric cell parsed straight into its target type, so values that
/// overflow it are rejected instead of truncated
fn parse_cell<T: FromStr>(record: &StringRecord, idx: usize, path: &Path, line: u64, what: &str) -> Result<T> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse().map_err(|_| RaceSeriesError::InvalidRecord {
        file: path.display().to_string(),
        line,
        message: format!("invalid {} '{}'", what, raw),
    })
}

/// Parse a file written by [`export_category_standings`]
pub fn read_category_standings(path: &Path) -> Result<CategoryTable> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    let columns = Columns::new(path, &headers);
    let rank_idx = columns.required("Rank")?;
    let id_idx = columns.required("Member ID")?;
    let name_idx = columns.required("Name")?;
    let total_idx = columns.required("Total Points")?;

    let race_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| ![rank_idx, id_idx, name_idx, total_idx].contains(i))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let mut race_points = BTreeMap::new();
        for (idx, race) in &race_columns {
            let raw = record.get(*idx).unwrap_or("").trim();
            if !raw.is_empty() {
                race_points.insert(race.clone(), parse_cell(&record, *idx, path, line, race)?);
            }
        }

        rows.push(CategoryTableRow {
            rank: parse_cell(&record, rank_idx, path, line, "rank")?,
            member_id: record.get(id_idx).unwrap_or("").to_string(),
            member_name: record.get(name_idx).unwrap_or("").to_string(),
            race_points,
            total_points: parse_cell(&record, total_idx, path, line, "total")?,
        });
    }

    Ok(CategoryTable {
        race_names: race_columns.into_iter().map(|(_, name)| name).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_field() {
        assert_eq!(sanitize_field("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(sanitize_field("+1"), "'+1");
        assert_eq!(sanitize_field("-2"), "'-2");
        assert_eq!(sanitize_field("@cmd"), "'@cmd");
        assert_eq!(sanitize_field("\tx"), "'\tx");
        assert_eq!(sanitize_field("\rx"), "'\rx");
        assert_eq!(sanitize_field("John Doe"), "John Doe");
        assert_eq!(sanitize_field("O'Brien"), "O'Brien");
        assert_eq!(sanitize_field(""), "");
    }

    #[test]
    fn test_text_cells_are_quoted() {
        assert_eq!(text("1001"), r#""1001""#);
        assert_eq!(text(""), r#""""#);
        assert_eq!(text(r#"Bob "Rocket" Jones"#), r#""Bob ""Rocket"" Jones""#);
        assert_eq!(text("=1+1"), r#""'=1+1""#);
    }

    #[test]
    fn test_export_match_review() {
        use crate::matcher::ReviewReason;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("review.csv");
        let rows = vec![ReviewRow {
            race: "spring_5k".to_string(),
            name: "Jeff Davis".to_string(),
            confidence: 0.7692,
            reason: ReviewReason::LowConfidence,
        }];
        export_match_review(&rows, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(r#""Race","Name","Confidence","Reason""#));
        assert_eq!(
            lines.next(),
            Some(r#""spring_5k","Jeff Davis",0.769,"low confidence""#)
        );
    }
}
