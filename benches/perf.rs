use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

use player_scout::embedding::build_embeddings;
use player_scout::player_id::{PlayerQuery, resolve};
use player_scout::ranking::{RankOptions, find_similar, rank};
use player_scout::roster::{Roster, RosterRecord, SIM_FEATURES};
use player_scout::similarity_model::fit_similarity_artifact;

const POSITIONS: [&str; 4] = ["GK", "DF", "MF", "FW"];

fn synthetic_roster(n: usize) -> Roster {
    let mut rng = StdRng::seed_from_u64(2425);
    let records = (0..n)
        .map(|i| {
            let mut r = RosterRecord::new(format!("Player {i:04}"));
            r.squad = Some(format!("Club {}", i % 40));
            r.comp = Some("eng Premier League".to_string());
            r.pos = Some(POSITIONS[i % POSITIONS.len()].to_string());
            for name in SIM_FEATURES {
                r.set_feature(name, Some(rng.gen_range(0.0..1.0)));
            }
            r.age = Some(rng.gen_range(17.0..38.0));
            r.nineties = Some(rng.gen_range(0.0..38.0));
            r
        })
        .collect();
    Roster::from_records(records)
}

fn bench_fit(c: &mut Criterion) {
    let roster = synthetic_roster(2_000);
    c.bench_function("similarity_fit", |b| {
        b.iter(|| {
            let artifact = fit_similarity_artifact(black_box(&roster), 5.0, 8, 42).unwrap();
            black_box(artifact.players_used);
        })
    });
}

fn bench_embeddings(c: &mut Criterion) {
    let roster = synthetic_roster(2_000);
    let artifact = fit_similarity_artifact(&roster, 5.0, 8, 42).unwrap();
    c.bench_function("embeddings_build", |b| {
        b.iter(|| {
            let embeddings = build_embeddings(black_box(&roster), 5.0, &artifact).unwrap();
            black_box(embeddings.len());
        })
    });
}

fn bench_ranking(c: &mut Criterion) {
    let roster = synthetic_roster(2_000);
    let artifact = fit_similarity_artifact(&roster, 5.0, 8, 42).unwrap();
    let embeddings = build_embeddings(&roster, 5.0, &artifact).unwrap();

    c.bench_function("rank_same_position", |b| {
        b.iter(|| {
            let out = rank(&roster, &embeddings, black_box(0), 10, Some("MF"));
            black_box(out.len());
        })
    });

    let query = PlayerQuery::new(roster.records()[embeddings.rows()[0]].player.clone());
    c.bench_function("find_similar_by_name", |b| {
        b.iter(|| {
            let out = find_similar(&roster, &embeddings, black_box(&query), RankOptions::default())
                .unwrap();
            black_box(out);
        })
    });
}

fn bench_resolve(c: &mut Criterion) {
    let roster = synthetic_roster(2_000);
    let query = PlayerQuery::new("player 01").squad("Club 3");
    c.bench_function("resolve_partial_filtered", |b| {
        b.iter(|| {
            let res = resolve(black_box(&roster), &query).unwrap();
            black_box(res.candidates().len());
        })
    });
}

criterion_group!(
    perf,
    bench_fit,
    bench_embeddings,
    bench_ranking,
    bench_resolve
);
criterion_main!(perf);
