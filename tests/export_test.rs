//! Category export and read-back

use race_series::error::RaceSeriesError;
use race_series::export::{export_category_standings, read_category_standings};
use race_series::scoring::series::SeriesBuilder;
use race_series::scoring::{AgeGroup, RacePoints};
use race_series_common::{Member, MemberRegistry};
use tempfile::tempdir;

fn race_points(member_id: &str, race: &str, place: u32, points: u32) -> RacePoints {
    RacePoints {
        member_id: member_id.to_string(),
        race_name: race.to_string(),
        overall_place: place,
        overall_points: points,
        age_group: Some(AgeGroup::Age30To39),
        age_group_place: Some(place),
        age_group_points: 15 - (place - 1),
        gender: Some("M".to_string()),
    }
}

fn registry() -> MemberRegistry {
    MemberRegistry::builder()
        .member(Member::new("M001", "John", "Doe").with_age(35).with_gender("M"))
        .member(Member::new("M002", "Bob", "Jones").with_age(31).with_gender("M"))
        .member(Member::new("=HYPERLINK(1)", "Eve", "Hacker").with_age(33).with_gender("M"))
        .member(Member::new("1001", "Sam", "Numeric").with_age(34).with_gender("M"))
        .build()
        .unwrap()
}

#[test]
fn test_category_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut builder = SeriesBuilder::new();
    builder.add_race(
        "spring_5k",
        vec![
            race_points("M002", "spring_5k", 1, 75),
            race_points("M001", "spring_5k", 2, 73),
            race_points("=HYPERLINK(1)", "spring_5k", 3, 71),
        ],
    );
    builder.add_race("summer_8k", vec![race_points("M001", "summer_8k", 1, 75)]);
    let standings = builder.finish(&registry(), 7);

    let written = export_category_standings(&standings, dir.path(), None).unwrap();
    assert_eq!(written.len(), 2);

    for (category, rows) in standings.categories() {
        let table = read_category_standings(&dir.path().join(format!("{}.csv", category))).unwrap();
        assert_eq!(table.race_names, vec!["spring_5k", "summer_8k"]);
        assert_eq!(table.rows.len(), rows.len());
        for (read, expected) in table.rows.iter().zip(rows) {
            assert_eq!(read.rank, expected.rank);
            assert_eq!(read.total_points, expected.total_points);
        }
    }
}

#[test]
fn test_formula_cells_are_neutralised() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut builder = SeriesBuilder::new();
    builder.add_race("spring_5k", vec![race_points("=HYPERLINK(1)", "spring_5k", 1, 75)]);
    let standings = builder.finish(&registry(), 7);
    export_category_standings(&standings, dir.path(), None).unwrap();

    let content = std::fs::read_to_string(dir.path().join("M_overall.csv")).unwrap();
    assert!(content.contains(r#""'=HYPERLINK(1)","Eve Hacker",90,90"#));
}

#[test]
fn test_unknown_category_filter_writes_nothing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut builder = SeriesBuilder::new();
    builder.add_race("spring_5k", vec![race_points("M001", "spring_5k", 1, 75)]);
    let standings = builder.finish(&registry(), 7);

    let filter = vec!["X_overall".to_string()];
    let written = export_category_standings(&standings, dir.path(), Some(filter.as_slice())).unwrap();
    assert!(written.is_empty());
}

/// Ids and race names that look like numbers stay quoted text
#[test]
fn test_numeric_looking_text_is_quoted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut builder = SeriesBuilder::new();
    builder.add_race("2024", vec![race_points("1001", "2024", 1, 75)]);
    let standings = builder.finish(&registry(), 7);
    export_category_standings(&standings, dir.path(), None).unwrap();

    let content = std::fs::read_to_string(dir.path().join("M_overall.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], r#""Rank","Member ID","Name","2024","Total Points""#);
    assert_eq!(lines[1], r#"1,"1001","Sam Numeric",90,90"#);

    let table = read_category_standings(&dir.path().join("M_overall.csv")).unwrap();
    assert_eq!(table.race_names, vec!["2024"]);
    assert_eq!(table.rows[0].member_id, "1001");
    assert_eq!(table.rows[0].race_points.get("2024"), Some(&90));
}

/// A total too large for the points type is rejected, not truncated
#[test]
fn test_oversized_total_is_invalid() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("M_overall.csv");
    std::fs::write(
        &path,
        "Rank,Member ID,Name,spring_5k,Total Points\n1,M001,John Doe,75,99999999999\n",
    )
    .unwrap();

    match read_category_standings(&path).unwrap_err() {
        RaceSeriesError::InvalidRecord { line, message, .. } => {
            assert_eq!(line, 2);
            assert!(message.contains("99999999999"));
        }
        other => panic!("unexpected error: {}", other),
    }
}
