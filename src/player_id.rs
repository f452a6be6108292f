use tracing::debug;

use crate::error::{Result, ScoutError};
use crate::roster::{COMP_COLUMN, PLAYER_COLUMN, POS_COLUMN, Roster, RosterRecord, SQUAD_COLUMN};

const UID_SEPARATOR: &str = "_";

/// A free-text lookup plus optional conjunctive filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerQuery {
    pub name: String,
    pub squad: Option<String>,
    pub comp: Option<String>,
    pub pos: Option<String>,
    pub allow_partial: bool,
}

impl PlayerQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            squad: None,
            comp: None,
            pos: None,
            allow_partial: true,
        }
    }

    pub fn squad(mut self, squad: impl Into<String>) -> Self {
        self.squad = Some(squad.into());
        self
    }

    pub fn comp(mut self, comp: impl Into<String>) -> Self {
        self.comp = Some(comp.into());
        self
    }

    pub fn pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    fn filters(&self) -> [(&'static str, Option<&str>); 3] {
        [
            (SQUAD_COLUMN, self.squad.as_deref()),
            (COMP_COLUMN, self.comp.as_deref()),
            (POS_COLUMN, self.pos.as_deref()),
        ]
    }
}

/// Disambiguation-time projection of a roster row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCandidate {
    /// Row index into the roster the candidate came from.
    pub idx: usize,
    pub player: String,
    pub squad: String,
    pub comp: String,
    pub pos: String,
    pub age: Option<f64>,
}

impl PlayerCandidate {
    pub fn from_record(idx: usize, record: &RosterRecord) -> Self {
        Self {
            idx,
            player: record.player.clone(),
            squad: record.squad.clone().unwrap_or_default(),
            comp: record.comp.clone().unwrap_or_default(),
            pos: record.pos.clone().unwrap_or_default(),
            age: record.age,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPlayer<'a> {
    pub idx: usize,
    pub record: &'a RosterRecord,
    /// Logging/dedup key, never used for matching.
    pub uid: String,
}

#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    Unique(ResolvedPlayer<'a>),
    /// Two or more rows, in dataset order. Never auto-picked.
    Ambiguous(Vec<PlayerCandidate>),
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn resolved(&self) -> Option<&ResolvedPlayer<'a>> {
        match self {
            Resolution::Unique(p) => Some(p),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[PlayerCandidate] {
        match self {
            Resolution::Ambiguous(c) => c,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

pub fn normalize_name(input: &str) -> String {
    input.trim().to_lowercase()
}

pub fn player_uid(record: &RosterRecord) -> String {
    [
        record.player.as_str(),
        record.squad.as_deref().unwrap_or(""),
        record.comp.as_deref().unwrap_or(""),
        record.pos.as_deref().unwrap_or(""),
    ]
    .join(UID_SEPARATOR)
    .trim()
    .to_string()
}

/// Resolve a query against every roster row.
pub fn resolve<'a>(roster: &'a Roster, query: &PlayerQuery) -> Result<Resolution<'a>> {
    if !roster.has_column(PLAYER_COLUMN) {
        return Err(ScoutError::Schema {
            column: PLAYER_COLUMN.to_string(),
        });
    }
    Ok(resolve_rows(roster, roster.records().iter().enumerate(), query))
}

/// Resolve a query against a subset of roster rows, keyed by roster index.
pub fn resolve_rows<'a, I>(roster: &Roster, rows: I, query: &PlayerQuery) -> Resolution<'a>
where
    I: IntoIterator<Item = (usize, &'a RosterRecord)>,
{
    let needle = normalize_name(&query.name);
    if needle.is_empty() {
        return Resolution::NotFound;
    }

    let rows: Vec<(usize, &'a RosterRecord)> = rows.into_iter().collect();
    let mut matches: Vec<(usize, &'a RosterRecord)> = rows
        .iter()
        .copied()
        .filter(|(_, r)| normalize_name(&r.player) == needle)
        .collect();

    if matches.is_empty() && query.allow_partial {
        matches = rows
            .iter()
            .copied()
            .filter(|(_, r)| normalize_name(&r.player).contains(&needle))
            .collect();
    }

    for (column, wanted) in query.filters() {
        let Some(wanted) = wanted.map(normalize_name).filter(|w| !w.is_empty()) else {
            continue;
        };
        if !roster.has_column(column) {
            debug!(column, "filter skipped, column absent from dataset");
            continue;
        }
        matches.retain(|(_, r)| {
            r.text(column).map(normalize_name).as_deref() == Some(wanted.as_str())
        });
    }

    match matches.as_slice() {
        [] => Resolution::NotFound,
        [(idx, record)] => Resolution::Unique(ResolvedPlayer {
            idx: *idx,
            record: *record,
            uid: player_uid(record),
        }),
        many => Resolution::Ambiguous(
            many.iter()
                .map(|(idx, r)| PlayerCandidate::from_record(*idx, r))
                .collect(),
        ),
    }
}

/// Diagnostic rows for a query that resolved to nothing: rows containing the
/// whole query, else rows containing any query token of two or more characters.
pub fn closest_matches<'a, I>(rows: I, query: &str, limit: usize) -> Vec<PlayerCandidate>
where
    I: IntoIterator<Item = (usize, &'a RosterRecord)>,
{
    let needle = normalize_name(query);
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }
    let rows: Vec<(usize, String, &RosterRecord)> = rows
        .into_iter()
        .map(|(idx, r)| (idx, normalize_name(&r.player), r))
        .collect();

    let whole: Vec<PlayerCandidate> = rows
        .iter()
        .filter(|(_, name, _)| name.contains(&needle))
        .take(limit)
        .map(|(idx, _, r)| PlayerCandidate::from_record(*idx, r))
        .collect();
    if !whole.is_empty() {
        return whole;
    }

    let tokens: Vec<&str> = needle
        .split_whitespace()
        .filter(|t| t.chars().count() >= 2)
        .collect();
    rows.iter()
        .filter(|(_, name, _)| tokens.iter().any(|t| name.contains(t)))
        .take(limit)
        .map(|(idx, _, r)| PlayerCandidate::from_record(*idx, r))
        .collect()
}
