use std::cmp::Ordering;

use tracing::debug;

use crate::config::ScoutConfig;
use crate::embedding::Embeddings;
use crate::error::Result;
use crate::pca::dot;
use crate::player_id::{
    PlayerCandidate, PlayerQuery, Resolution, ResolvedPlayer, closest_matches, normalize_name,
    player_uid, resolve,
};
use crate::roster::{Roster, RosterRecord};

/// Cap on the diagnostic rows returned with a not-found lookup.
pub const CLOSEST_MATCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    pub top_n: usize,
    /// Restrict results to the query player's own position.
    pub same_position: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            same_position: true,
        }
    }
}

impl RankOptions {
    pub fn from_config(cfg: &ScoutConfig) -> Self {
        Self {
            top_n: cfg.top_n,
            same_position: cfg.same_position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimilarPlayer<'a> {
    pub idx: usize,
    pub record: &'a RosterRecord,
    /// Cosine similarity in [-1, 1].
    pub score: f64,
}

#[derive(Debug, Clone)]
pub enum SimilarityOutcome<'a> {
    Ranked {
        query: ResolvedPlayer<'a>,
        similar: Vec<SimilarPlayer<'a>>,
    },
    Ambiguous(Vec<PlayerCandidate>),
    NotFound {
        closest: Vec<PlayerCandidate>,
    },
    /// The row exists but was filtered out of the embedding (minutes or missing stats).
    NotEligible { idx: usize },
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

/// Rank every embedded row against the row at `query_pos`.
///
/// Scores sort descending; equal scores keep matrix order. The query row is
/// never returned. With `position` set, rows whose normalized position differs
/// are skipped. Returns at most `top_n` rows.
pub fn rank<'a>(
    roster: &'a Roster,
    embeddings: &Embeddings,
    query_pos: usize,
    top_n: usize,
    position: Option<&str>,
) -> Vec<SimilarPlayer<'a>> {
    let Some(query) = embeddings.vector(query_pos) else {
        return Vec::new();
    };

    let mut scored: Vec<(usize, f64)> = embeddings
        .vectors()
        .iter()
        .enumerate()
        .map(|(pos, v)| (pos, cosine_similarity(query, v)))
        .collect();
    // -0.0 and 0.0 tie, so they keep matrix order too.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let wanted = position.map(normalize_name);
    let mut out = Vec::with_capacity(top_n.min(scored.len()));
    for (pos, score) in scored {
        if out.len() >= top_n {
            break;
        }
        if pos == query_pos {
            continue;
        }
        let idx = embeddings.rows()[pos];
        let Some(record) = roster.get(idx) else {
            continue;
        };
        if let Some(wanted) = wanted.as_deref()
            && record.pos.as_deref().map(normalize_name).as_deref() != Some(wanted)
        {
            continue;
        }
        out.push(SimilarPlayer { idx, record, score });
    }
    out
}

/// Resolve the query against the whole roster, then rank.
///
/// A name matching several rows comes back as `Ambiguous` instead of silently
/// taking the first. A unique player outside the embedding is `NotEligible`.
pub fn find_similar<'a>(
    roster: &'a Roster,
    embeddings: &Embeddings,
    query: &PlayerQuery,
    options: RankOptions,
) -> Result<SimilarityOutcome<'a>> {
    let outcome = match resolve(roster, query)? {
        Resolution::Unique(player) => ranked(roster, embeddings, player, options),
        Resolution::Ambiguous(candidates) => SimilarityOutcome::Ambiguous(candidates),
        Resolution::NotFound => SimilarityOutcome::NotFound {
            closest: closest_matches(
                roster.records().iter().enumerate(),
                &query.name,
                CLOSEST_MATCH_LIMIT,
            ),
        },
    };
    Ok(outcome)
}

/// Rank for an already-resolved roster row.
pub fn find_similar_for_row<'a>(
    roster: &'a Roster,
    embeddings: &Embeddings,
    roster_idx: usize,
    options: RankOptions,
) -> SimilarityOutcome<'a> {
    let Some(record) = roster.get(roster_idx) else {
        return SimilarityOutcome::NotEligible { idx: roster_idx };
    };
    let player = ResolvedPlayer {
        idx: roster_idx,
        record,
        uid: player_uid(record),
    };
    ranked(roster, embeddings, player, options)
}

fn ranked<'a>(
    roster: &'a Roster,
    embeddings: &Embeddings,
    player: ResolvedPlayer<'a>,
    options: RankOptions,
) -> SimilarityOutcome<'a> {
    let Some(query_pos) = embeddings.position_of(player.idx) else {
        return SimilarityOutcome::NotEligible { idx: player.idx };
    };
    let position = if options.same_position {
        let pos = player.record.pos.as_deref();
        if pos.is_none() {
            debug!(uid = %player.uid, "query has no position; position filter not applied");
        }
        pos
    } else {
        None
    };
    debug!(uid = %player.uid, query_pos, top_n = options.top_n, "ranking similar players");
    let similar = rank(roster, embeddings, query_pos, options.top_n, position);
    SimilarityOutcome::Ranked {
        query: player,
        similar,
    }
}
