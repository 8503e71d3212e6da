// Unit tests for Matcha Discovery

use chrono::NaiveDate;
use matcha_discovery::core::{
    distance::{calculate_bounding_box, distance_km, haversine_distance, is_within_bounding_box},
    filters::{filter_candidates, BlockedSet, FilterOptions},
    ranking::{paginate, rank_candidates},
    tags::{parse_tag_list, raw_tag_overlap},
};
use matcha_discovery::models::{CandidateRecord, DiscoveryRequest, GeoPoint, SortBy};
use std::collections::BTreeSet;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn create_record(id: i64, born: (i32, u32, u32), fame: i32, location: Option<(f64, f64)>) -> CandidateRecord {
    CandidateRecord {
        id,
        first_name: Some(format!("User {}", id)),
        gender: Some("female".to_string()),
        tags: vec!["sport".to_string()],
        fame_rate: Some(fame),
        born_at: NaiveDate::from_ymd_opt(born.0, born.1, born.2),
        latitude: location.map(|(lat, _)| lat),
        longitude: location.map(|(_, lng)| lng),
        profile_picture: Some(format!("https://cdn.example/{}.jpg", id)),
    }
}

fn create_request() -> DiscoveryRequest {
    DiscoveryRequest {
        requester_id: 0,
        age_range: (18, 100),
        fame_range: (0, 1000),
        tags: BTreeSet::new(),
        origin: None,
        radius_km: 0.0,
        sort_by: SortBy::Default,
        offset: 0,
        limit: 30,
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(48.8566, 2.3522, 48.8566, 2.3522);
    assert_eq!(distance, 0.0);
}

#[test]
fn test_haversine_distance_paris_to_lyon() {
    // Paris to Lyon is approximately 392 km
    let distance = distance_km(GeoPoint::new(48.8566, 2.3522), GeoPoint::new(45.7640, 4.8357)).unwrap();
    assert!((distance - 392.0).abs() < 5.0, "Expected ~392km, got {}", distance);
}

#[test]
fn test_distance_symmetry_grid() {
    let mut points = Vec::new();
    for lat in [-89.5, -45.0, 0.0, 33.3, 71.1] {
        for lng in [-179.0, -90.0, 0.0, 12.5, 179.0] {
            points.push(GeoPoint::new(lat, lng));
        }
    }

    for a in &points {
        for b in &points {
            let ab = distance_km(*a, *b).unwrap();
            let ba = distance_km(*b, *a).unwrap();
            assert!((ab - ba).abs() < 1e-6);
        }
    }
}

#[test]
fn test_bounding_box_never_rejects_points_within_radius() {
    let centers = [(48.85, 2.35), (-33.87, 151.21), (69.65, 18.96), (0.0, 0.0)];

    for (lat, lng) in centers {
        for radius in [0.5, 10.0, 100.0, 1000.0] {
            let bbox = calculate_bounding_box(lat, lng, radius);
            // Walk the circle just inside the radius
            for step in 0..72 {
                let bearing = (step as f64 * 5.0).to_radians();
                let angular = radius * 0.999 / 6371.0;
                let lat1 = lat.to_radians();
                let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
                let lng2 = lng.to_radians()
                    + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());
                let (p_lat, p_lng) = (lat2.to_degrees(), lng2.to_degrees());

                assert!(haversine_distance(lat, lng, p_lat, p_lng) <= radius);
                assert!(
                    is_within_bounding_box(p_lat, p_lng, &bbox),
                    "({}, {}) r={} rejected ({}, {})",
                    lat,
                    lng,
                    radius,
                    p_lat,
                    p_lng
                );
            }
        }
    }
}

#[test]
fn test_tag_overlap_normalization() {
    assert_eq!(raw_tag_overlap(&["  SPORT", "Music"], &["sport", "music ", "travel"]), 2);
    assert_eq!(raw_tag_overlap::<&str, &str>(&[], &["sport"]), 0);
    assert_eq!(parse_tag_list("a,b, A ,").len(), 2);
}

#[test]
fn test_age_boundary_birthday() {
    // Turns 18 on the evaluation date
    let mut request = create_request();
    request.age_range = (18, 18);

    let pool = vec![
        create_record(1, (2007, 6, 1), 100, None),
        create_record(2, (2007, 6, 2), 100, None),
    ];
    let (kept, stats) = filter_candidates(pool, &request, &BlockedSet::default(), FilterOptions::default(), today());

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].candidate.id, 1);
    assert_eq!(kept[0].age, 18);
    assert_eq!(stats.excluded_age, 1);
}

#[test]
fn test_zero_radius_keeps_exact_location_only() {
    let mut request = create_request();
    request.origin = Some(GeoPoint::new(48.85, 2.35));
    request.radius_km = 0.0;

    let pool = vec![
        create_record(1, (1990, 1, 1), 100, Some((48.85, 2.35))),
        create_record(2, (1990, 1, 1), 100, Some((48.8501, 2.35))),
    ];
    let (kept, _) = filter_candidates(pool, &request, &BlockedSet::default(), FilterOptions::default(), today());

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].distance_km, Some(0.0));
}

#[test]
fn test_ranking_is_total_for_every_sort_key() {
    let pool: Vec<CandidateRecord> = (1..=20)
        .map(|id| create_record(id, (1990 + (id % 3) as i32, 1, 1), 500, Some((48.85, 2.35))))
        .collect();
    let mut request = create_request();
    request.origin = Some(GeoPoint::new(48.85, 2.35));
    request.radius_km = 10.0;

    for sort_by in [SortBy::Distance, SortBy::Age, SortBy::FameRate, SortBy::Tags, SortBy::Default] {
        let (mut forward, _) = filter_candidates(
            pool.clone(),
            &request,
            &BlockedSet::default(),
            FilterOptions::default(),
            today(),
        );
        let reversed_pool: Vec<_> = pool.iter().rev().cloned().collect();
        let (mut backward, _) = filter_candidates(
            reversed_pool,
            &request,
            &BlockedSet::default(),
            FilterOptions::default(),
            today(),
        );

        rank_candidates(&mut forward, sort_by);
        rank_candidates(&mut backward, sort_by);

        let forward_ids: Vec<i64> = forward.iter().map(|c| c.candidate.id).collect();
        let backward_ids: Vec<i64> = backward.iter().map(|c| c.candidate.id).collect();
        assert_eq!(forward_ids, backward_ids, "order depends on input order for {:?}", sort_by);
    }
}

#[test]
fn test_pagination_law() {
    let ranked: Vec<i64> = (1..=47).collect();
    let limit = 10;

    let mut rebuilt = Vec::new();
    let mut offset = 0;
    loop {
        let (page, has_more) = paginate(ranked.clone(), offset, limit);
        rebuilt.extend(page);
        if !has_more {
            break;
        }
        offset += limit;
    }

    assert_eq!(rebuilt, ranked);
}
