use std::path::PathBuf;

use player_scout::ScoutError;
use player_scout::roster::{Roster, SIM_FEATURES};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn loads_sample_roster() {
    let roster = Roster::from_path(&fixture_path("players_sample.csv")).expect("fixture loads");
    assert_eq!(roster.len(), 13);
    for column in SIM_FEATURES {
        assert!(roster.has_column(column), "missing {column}");
    }

    let first = &roster.records()[0];
    assert_eq!(first.player, "Cole Palmer");
    assert_eq!(first.squad.as_deref(), Some("Chelsea"));
    assert_eq!(first.comp.as_deref(), Some("eng Premier League"));
    assert_eq!(first.pos.as_deref(), Some("MF"));
    assert_eq!(first.age, Some(22.0));
    assert_eq!(first.nineties, Some(33.1));
    assert_eq!(first.stats.prg_r, Some(294.0));
    assert_eq!(roster.records()[2].player, "Martin Ødegaard");
}

#[test]
fn unmodelled_columns_are_kept_as_extras() {
    let roster = Roster::from_path(&fixture_path("players_sample.csv")).expect("fixture loads");
    let salah = &roster.records()[7];
    assert_eq!(salah.extra.get("Nation").map(String::as_str), Some("eg EGY"));
    assert_eq!(salah.numeric("Score"), Some(91.4));
    assert_eq!(salah.text("Born"), Some("1992"));
    assert!(roster.has_column("Score"));
}

#[test]
fn missing_cells_stay_missing() {
    let roster = Roster::from_path(&fixture_path("players_sample.csv")).expect("fixture loads");
    let white = &roster.records()[9];
    assert_eq!(white.player, "Ben White");
    assert_eq!(white.stats.xg_90, None);
    assert_eq!(white.stats.xg_xag_90, None);
    assert_eq!(white.stats.xag_90, Some(0.05));
}

#[test]
fn fingerprint_is_stable_per_file() {
    let a = Roster::from_path(&fixture_path("players_sample.csv")).expect("fixture loads");
    let b = Roster::from_path(&fixture_path("players_sample.csv")).expect("fixture loads");
    let c = Roster::from_path(&fixture_path("no_minutes_column.csv")).expect("fixture loads");
    let fp = a.fingerprint().expect("file rosters carry a fingerprint");
    assert_eq!(fp.len(), 64);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn in_memory_rosters_have_no_fingerprint() {
    let roster = Roster::from_reader("Player\nA\n".as_bytes()).expect("parses");
    assert_eq!(roster.len(), 1);
    assert!(roster.fingerprint().is_none());
}

#[test]
fn csv_without_player_column_is_a_schema_error() {
    let err = Roster::from_path(&fixture_path("no_player_column.csv")).unwrap_err();
    assert!(matches!(err, ScoutError::Schema { ref column } if column == "Player"));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Roster::from_path(&fixture_path("does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, ScoutError::Io(_)));
}
