// Criterion benchmarks for Matcha Discovery

use chrono::{Months, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matcha_discovery::core::{
    distance::{calculate_bounding_box, haversine_distance},
    filter_candidates, paginate, rank_candidates, BlockedSet, FilterOptions,
};
use matcha_discovery::models::{CandidateRecord, DiscoveryRequest, GeoPoint, SortBy};
use std::collections::BTreeSet;

const TAGS: [&str; 6] = ["sport", "music", "travel", "cooking", "cinema", "gaming"];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn create_candidate(id: usize, lat: f64, lng: f64) -> CandidateRecord {
    CandidateRecord {
        id: id as i64,
        first_name: Some(format!("User {}", id)),
        gender: Some(if id % 2 == 0 { "female" } else { "male" }.to_string()),
        tags: TAGS.iter().skip(id % 4).take(2).map(|t| t.to_string()).collect(),
        fame_rate: Some((id * 37 % 1001) as i32),
        born_at: Some(today() - Months::new(12 * (18 + (id % 30) as u32))),
        latitude: Some(lat),
        longitude: Some(lng),
        profile_picture: None,
    }
}

fn create_request(sort_by: SortBy) -> DiscoveryRequest {
    DiscoveryRequest {
        requester_id: 0,
        age_range: (21, 35),
        fame_range: (0, 1000),
        tags: ["sport", "music"].iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        origin: Some(GeoPoint::new(48.8566, 2.3522)),
        radius_km: 50.0,
        sort_by,
        offset: 0,
        limit: 20,
    }
}

fn create_pool(count: usize) -> Vec<CandidateRecord> {
    (1..=count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.001) % 0.8;
            let lng_offset = (i as f64 * 0.0013) % 0.8;
            create_candidate(i, 48.8566 + lat_offset - 0.4, 2.3522 + lng_offset - 0.4)
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(48.8566),
                black_box(2.3522),
                black_box(45.7640),
                black_box(4.8357),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| calculate_bounding_box(black_box(48.8566), black_box(2.3522), black_box(50.0)));
    });
}

fn bench_research(c: &mut Criterion) {
    let request = create_request(SortBy::Default);
    let blocks = BlockedSet::default();

    let mut group = c.benchmark_group("research");

    for candidate_count in [10, 100, 1000, 10000].iter() {
        let pool = create_pool(*candidate_count);

        group.bench_with_input(
            BenchmarkId::new("filter_rank_paginate", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    let (mut ranked, _) = filter_candidates(
                        black_box(pool.clone()),
                        black_box(&request),
                        &blocks,
                        FilterOptions::default(),
                        today(),
                    );
                    rank_candidates(&mut ranked, request.sort_by);
                    black_box(paginate(ranked, request.offset, request.limit))
                });
            },
        );
    }

    group.finish();
}

fn bench_sort_keys(c: &mut Criterion) {
    let pool = create_pool(1000);
    let (ranked, _) = filter_candidates(
        pool,
        &create_request(SortBy::Default),
        &BlockedSet::default(),
        FilterOptions::default(),
        today(),
    );

    let mut group = c.benchmark_group("ranking_1000_candidates");

    for sort_by in [SortBy::Distance, SortBy::Age, SortBy::FameRate, SortBy::Tags, SortBy::Default] {
        group.bench_function(format!("{:?}", sort_by), |b| {
            b.iter(|| {
                let mut candidates = ranked.clone();
                rank_candidates(&mut candidates, black_box(sort_by));
                black_box(candidates)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_research,
    bench_sort_keys
);

criterion_main!(benches);
