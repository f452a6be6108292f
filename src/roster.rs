use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, ScoutError};

pub const PLAYER_COLUMN: &str = "Player";
pub const SQUAD_COLUMN: &str = "Squad";
pub const COMP_COLUMN: &str = "Comp";
pub const POS_COLUMN: &str = "Pos";
pub const AGE_COLUMN: &str = "Age";
pub const NINETIES_COLUMN: &str = "90s";

/// Columns the similarity embedding is fitted on, in artifact order.
pub const SIM_FEATURES: [&str; 15] = [
    "Age",
    "90s",
    "Gls_90",
    "Ast_90",
    "G+A_90",
    "G-PK_90",
    "G+A-PK_90",
    "xG_90",
    "xAG_90",
    "xG+xAG_90",
    "npxG_90",
    "npxG+xAG_90",
    "PrgC",
    "PrgP",
    "PrgR",
];

const MISSING_TOKENS: [&str; 5] = ["na", "nan", "null", "none", "-"];

/// Per-90 and progression statistics. `None` means the cell was empty or unparseable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStats {
    pub gls_90: Option<f64>,
    pub ast_90: Option<f64>,
    pub g_a_90: Option<f64>,
    pub g_pk_90: Option<f64>,
    pub g_a_pk_90: Option<f64>,
    pub xg_90: Option<f64>,
    pub xag_90: Option<f64>,
    pub xg_xag_90: Option<f64>,
    pub npxg_90: Option<f64>,
    pub npxg_xag_90: Option<f64>,
    pub prg_c: Option<f64>,
    pub prg_p: Option<f64>,
    pub prg_r: Option<f64>,
}

/// One player row. Columns the loader does not model are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterRecord {
    pub player: String,
    pub squad: Option<String>,
    pub comp: Option<String>,
    pub pos: Option<String>,
    pub age: Option<f64>,
    pub nineties: Option<f64>,
    pub stats: PlayerStats,
    pub extra: BTreeMap<String, String>,
}

impl RosterRecord {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            ..Default::default()
        }
    }

    /// Value of a typed numeric column. Outer `None` means the column is not modelled.
    pub fn feature(&self, column: &str) -> Option<Option<f64>> {
        let s = &self.stats;
        let v = match column {
            AGE_COLUMN => self.age,
            NINETIES_COLUMN => self.nineties,
            "Gls_90" => s.gls_90,
            "Ast_90" => s.ast_90,
            "G+A_90" => s.g_a_90,
            "G-PK_90" => s.g_pk_90,
            "G+A-PK_90" => s.g_a_pk_90,
            "xG_90" => s.xg_90,
            "xAG_90" => s.xag_90,
            "xG+xAG_90" => s.xg_xag_90,
            "npxG_90" => s.npxg_90,
            "npxG+xAG_90" => s.npxg_xag_90,
            "PrgC" => s.prg_c,
            "PrgP" => s.prg_p,
            "PrgR" => s.prg_r,
            _ => return None,
        };
        Some(v)
    }

    fn feature_slot_mut(&mut self, column: &str) -> Option<&mut Option<f64>> {
        let s = &mut self.stats;
        let slot = match column {
            AGE_COLUMN => &mut self.age,
            NINETIES_COLUMN => &mut self.nineties,
            "Gls_90" => &mut s.gls_90,
            "Ast_90" => &mut s.ast_90,
            "G+A_90" => &mut s.g_a_90,
            "G-PK_90" => &mut s.g_pk_90,
            "G+A-PK_90" => &mut s.g_a_pk_90,
            "xG_90" => &mut s.xg_90,
            "xAG_90" => &mut s.xag_90,
            "xG+xAG_90" => &mut s.xg_xag_90,
            "npxG_90" => &mut s.npxg_90,
            "npxG+xAG_90" => &mut s.npxg_xag_90,
            "PrgC" => &mut s.prg_c,
            "PrgP" => &mut s.prg_p,
            "PrgR" => &mut s.prg_r,
            _ => return None,
        };
        Some(slot)
    }

    /// Sets a typed numeric column. Returns false when the column is not modelled.
    pub fn set_feature(&mut self, column: &str, value: Option<f64>) -> bool {
        match self.feature_slot_mut(column) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Numeric lookup by column name: typed fields first, then parsed extras.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match self.feature(column) {
            Some(v) => v,
            None => self.extra.get(column).and_then(|raw| parse_number(raw)),
        }
    }

    /// Text lookup for the categorical key columns.
    pub fn text(&self, column: &str) -> Option<&str> {
        match column {
            PLAYER_COLUMN => Some(self.player.as_str()),
            SQUAD_COLUMN => self.squad.as_deref(),
            COMP_COLUMN => self.comp.as_deref(),
            POS_COLUMN => self.pos.as_deref(),
            _ => self.extra.get(column).map(String::as_str),
        }
    }
}

/// A fully materialized dataset. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<RosterRecord>,
    columns: HashSet<String>,
    fingerprint: Option<String>,
}

impl Roster {
    /// Builds a roster in memory with every modelled column marked present.
    pub fn from_records(records: Vec<RosterRecord>) -> Self {
        let columns = [PLAYER_COLUMN, SQUAD_COLUMN, COMP_COLUMN, POS_COLUMN]
            .into_iter()
            .chain(SIM_FEATURES)
            .map(str::to_string)
            .collect();
        Self {
            records,
            columns,
            fingerprint: None,
        }
    }

    pub fn with_columns<I, S>(columns: I, records: Vec<RosterRecord>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records,
            columns: columns.into_iter().map(Into::into).collect(),
            fingerprint: None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let mut roster = Self::from_reader(bytes.as_slice())?;
        roster.fingerprint = Some(format!("{:x}", Sha256::digest(&bytes)));
        info!(
            path = %path.display(),
            rows = roster.len(),
            "loaded roster dataset"
        );
        Ok(roster)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
        let header: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if !header.iter().any(|h| h == PLAYER_COLUMN) {
            return Err(ScoutError::Schema {
                column: PLAYER_COLUMN.to_string(),
            });
        }

        let mut records = Vec::new();
        for (row_no, result) in reader.records().enumerate() {
            let row = result?;
            let mut record = RosterRecord::default();
            for (column, cell) in header.iter().zip(row.iter()) {
                match column.as_str() {
                    PLAYER_COLUMN => record.player = cell.to_string(),
                    SQUAD_COLUMN => record.squad = text_cell(cell),
                    COMP_COLUMN => record.comp = text_cell(cell),
                    POS_COLUMN => record.pos = text_cell(cell),
                    AGE_COLUMN => record.age = parse_age(cell),
                    other if record.feature(other).is_some() => {
                        record.set_feature(other, numeric_cell(cell, row_no, other));
                    }
                    other => {
                        record.extra.insert(other.to_string(), cell.to_string());
                    }
                }
            }
            records.push(record);
        }

        Ok(Self {
            records,
            columns: header.into_iter().collect(),
            fingerprint: None,
        })
    }

    pub fn records(&self) -> &[RosterRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&RosterRecord> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// SHA-256 of the source bytes, when loaded from a file.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_missing_token(trimmed) {
        return None;
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// FBref exports age as `years-days`; only the year part is kept.
pub fn parse_age(raw: &str) -> Option<f64> {
    parse_number(raw).or_else(|| {
        let (years, _) = raw.trim().split_once('-')?;
        parse_number(years)
    })
}

fn numeric_cell(cell: &str, row_no: usize, column: &str) -> Option<f64> {
    let value = parse_number(cell);
    if value.is_none() && !cell.trim().is_empty() && !is_missing_token(cell.trim()) {
        debug!(row = row_no, column, cell, "unparseable numeric cell treated as missing");
    }
    value
}

fn text_cell(cell: &str) -> Option<String> {
    if cell.trim().is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_age_accepts_years_days() {
        assert_eq!(parse_age("24-187"), Some(24.0));
        assert_eq!(parse_age(" 31 "), Some(31.0));
        assert_eq!(parse_age(""), None);
    }

    #[test]
    fn parse_number_treats_tokens_as_missing() {
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("na"), None);
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number("0.42"), Some(0.42));
    }

    #[test]
    fn numeric_reads_typed_then_extra() {
        let mut record = RosterRecord::new("A");
        record.stats.xg_90 = Some(0.3);
        record.extra.insert("Score".into(), "0.75".into());
        assert_eq!(record.numeric("xG_90"), Some(0.3));
        assert_eq!(record.numeric("Score"), Some(0.75));
        assert_eq!(record.numeric("Nope"), None);
    }

    #[test]
    fn every_sim_feature_is_modelled() {
        let mut record = RosterRecord::new("A");
        for (i, name) in SIM_FEATURES.iter().enumerate() {
            assert!(record.set_feature(name, Some(i as f64)));
        }
        for (i, name) in SIM_FEATURES.iter().enumerate() {
            assert_eq!(record.feature(name), Some(Some(i as f64)));
        }
    }
}
