use std::path::PathBuf;

use player_scout::ScoutError;
use player_scout::player_id::{PlayerQuery, Resolution, resolve};
use player_scout::roster::{Roster, RosterRecord};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn sample() -> Roster {
    Roster::from_path(&fixture_path("players_sample.csv")).expect("fixture loads")
}

fn record(player: &str, squad: &str, comp: &str, pos: &str) -> RosterRecord {
    RosterRecord {
        player: player.into(),
        squad: Some(squad.into()),
        comp: Some(comp.into()),
        pos: Some(pos.into()),
        ..Default::default()
    }
}

fn indices(res: &Resolution<'_>) -> Vec<usize> {
    match res {
        Resolution::Unique(p) => vec![p.idx],
        Resolution::Ambiguous(c) => c.iter().map(|c| c.idx).collect(),
        Resolution::NotFound => Vec::new(),
    }
}

#[test]
fn exact_match_is_unique_with_no_candidates() {
    let roster = sample();
    let res = resolve(&roster, &PlayerQuery::new("Mohamed Salah")).unwrap();
    let player = res.resolved().expect("unique");
    assert_eq!(player.idx, 7);
    assert_eq!(player.record.squad.as_deref(), Some("Liverpool"));
    assert_eq!(player.uid, "Mohamed Salah_Liverpool_eng Premier League_FW");
    assert!(res.candidates().is_empty());
}

#[test]
fn matching_ignores_case_and_outer_whitespace() {
    let roster = sample();
    let res = resolve(&roster, &PlayerQuery::new("  mARTIN ødegaard ")).unwrap();
    assert_eq!(indices(&res), vec![2]);
}

#[test]
fn exact_match_wins_over_partial() {
    let roster = Roster::from_records(vec![
        record("Rodri", "Manchester City", "ENG", "MF"),
        record("Rodrigo", "Ipswich", "ENG", "FW"),
    ]);
    let res = resolve(&roster, &PlayerQuery::new("rodri")).unwrap();
    assert_eq!(indices(&res), vec![0]);
}

#[test]
fn nothing_matching_is_not_found() {
    let roster = sample();
    let res = resolve(&roster, &PlayerQuery::new("Zinedine Zidane")).unwrap();
    assert!(res.is_not_found());
    assert!(res.resolved().is_none());
    assert!(res.candidates().is_empty());
}

#[test]
fn duplicate_rows_are_not_deduplicated() {
    let roster = Roster::from_records(vec![
        record("Cole Palmer", "Chelsea", "ENG", "MF"),
        record("Cole Palmer", "Chelsea", "ENG", "MF"),
    ]);
    let query = PlayerQuery::new("cole palmer").allow_partial(false);
    let res = resolve(&roster, &query).unwrap();
    assert!(res.resolved().is_none());
    assert_eq!(res.candidates().len(), 2);
    assert_eq!(indices(&res), vec![0, 1]);
}

#[test]
fn partial_fallback_resolves_single_containing_name() {
    let roster = Roster::from_records(vec![
        record("Cole Palmer", "Chelsea", "ENG", "MF"),
        record("Bukayo Saka", "Arsenal", "ENG", "FW"),
    ]);
    let res = resolve(&roster, &PlayerQuery::new("palmer")).unwrap();
    assert_eq!(indices(&res), vec![0]);

    let strict = resolve(&roster, &PlayerQuery::new("palmer").allow_partial(false)).unwrap();
    assert!(strict.is_not_found());
}

#[test]
fn ambiguous_candidates_keep_dataset_order() {
    let roster = sample();
    let res = resolve(&roster, &PlayerQuery::new("Cole Palmer")).unwrap();
    let candidates = res.candidates();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].squad, "Chelsea");
    assert_eq!(candidates[1].squad, "Hereford");
    assert_eq!(candidates[1].age, Some(21.0));

    let partial = resolve(&roster, &PlayerQuery::new("a")).unwrap();
    let idx = indices(&partial);
    assert!(idx.len() > 2);
    assert!(idx.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn filters_narrow_an_ambiguous_name() {
    let roster = sample();
    let chelsea = resolve(&roster, &PlayerQuery::new("Cole Palmer").squad("chelsea")).unwrap();
    assert_eq!(indices(&chelsea), vec![0]);

    let national = resolve(
        &roster,
        &PlayerQuery::new("palmer").comp("eng National League"),
    )
    .unwrap();
    assert_eq!(indices(&national), vec![10]);

    let nobody = resolve(&roster, &PlayerQuery::new("Cole Palmer").pos("GK")).unwrap();
    assert!(nobody.is_not_found());
}

#[test]
fn filters_are_idempotent_and_conjunctive() {
    let roster = sample();
    let base = PlayerQuery::new("a");

    let squad_only = indices(&resolve(&roster, &base.clone().squad("Arsenal")).unwrap());
    let twice = indices(
        &resolve(&roster, &base.clone().squad("Arsenal").squad("Arsenal")).unwrap(),
    );
    assert_eq!(squad_only, twice);

    let pos_only = indices(&resolve(&roster, &base.clone().pos("MF")).unwrap());
    let both = indices(&resolve(&roster, &base.clone().squad("Arsenal").pos("MF")).unwrap());
    let intersection: Vec<usize> = squad_only
        .iter()
        .copied()
        .filter(|i| pos_only.contains(i))
        .collect();
    assert_eq!(both, intersection);
    assert_eq!(both, vec![2, 3]);
}

#[test]
fn filter_on_absent_column_is_skipped() {
    let roster = Roster::with_columns(
        ["Player", "Squad"],
        vec![
            record("Cole Palmer", "Chelsea", "ENG", "MF"),
            record("Cole Palmer", "Hereford", "ENG", "FW"),
        ],
    );
    let res = resolve(&roster, &PlayerQuery::new("Cole Palmer").pos("FW")).unwrap();
    assert_eq!(indices(&res), vec![0, 1]);

    let by_squad = resolve(&roster, &PlayerQuery::new("Cole Palmer").squad("Hereford")).unwrap();
    assert_eq!(indices(&by_squad), vec![1]);
}

#[test]
fn roster_without_player_column_is_a_schema_error() {
    let roster = Roster::with_columns(["Squad", "Pos"], vec![RosterRecord::new("ghost")]);
    let err = resolve(&roster, &PlayerQuery::new("ghost")).unwrap_err();
    assert!(matches!(err, ScoutError::Schema { ref column } if column == "Player"));
}
