use chrono::NaiveDate;
use std::collections::HashSet;

use crate::core::distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box, BoundingBox};
use crate::core::tags::{normalize_tags, tag_overlap};
use crate::models::{CandidateProfile, CandidateRecord, DiscoveryRequest, FilterStats, GeoPoint, RankedCandidate};

/// Yes/no block relation between the requester and a candidate,
/// in either direction
pub trait BlockLookup {
    fn is_blocked(&self, requester_id: i64, candidate_id: i64) -> bool;
}

/// Ids the requester blocked or was blocked by, fetched once per request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedSet {
    requester_id: i64,
    ids: HashSet<i64>,
}

impl BlockedSet {
    pub fn new(requester_id: i64, ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            requester_id,
            ids: ids.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl BlockLookup for BlockedSet {
    fn is_blocked(&self, requester_id: i64, candidate_id: i64) -> bool {
        requester_id == self.requester_id && self.ids.contains(&candidate_id)
    }
}

/// Tunables of the candidate filter
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    /// Drop candidates sharing no tag with a non-empty requested tag set
    pub require_shared_tag: bool,
}

/// Everything the filter derives once from the request
struct RadiusCheck {
    origin: GeoPoint,
    radius_km: f64,
    bbox: BoundingBox,
}

impl RadiusCheck {
    fn new(origin: GeoPoint, radius_km: f64) -> Self {
        Self {
            origin,
            radius_km,
            bbox: calculate_bounding_box(origin.lat, origin.lng, radius_km),
        }
    }

    /// Distance to the point when it lies within the radius
    fn accept(&self, point: GeoPoint) -> Option<f64> {
        if !is_within_bounding_box(point.lat, point.lng, &self.bbox) {
            return None;
        }
        let distance = haversine_distance(self.origin.lat, self.origin.lng, point.lat, point.lng);
        (distance <= self.radius_km).then_some(distance)
    }
}

/// Apply the hard constraints of a request to a raw candidate pool
///
/// Candidates are kept when they are not the requester, their age and fame
/// rate lie within the requested ranges, they are within the radius of the
/// origin (when one is given), no block relation exists with the requester,
/// and, when enabled, they share at least one requested tag.
///
/// Malformed records are skipped and counted, never reported as errors.
/// The origin is expected to be validated by the caller.
pub fn filter_candidates(
    pool: Vec<CandidateRecord>,
    request: &DiscoveryRequest,
    blocks: &dyn BlockLookup,
    options: FilterOptions,
    today: NaiveDate,
) -> (Vec<RankedCandidate>, FilterStats) {
    let mut stats = FilterStats {
        examined: pool.len(),
        ..FilterStats::default()
    };

    let radius = request
        .origin
        .map(|origin| RadiusCheck::new(origin, request.radius_km));
    let (min_age, max_age) = request.age_range;
    let (min_fame, max_fame) = request.fame_range;
    let requested_tags = normalize_tags(&request.tags);
    let gate_on_tags = options.require_shared_tag && !requested_tags.is_empty();

    let mut kept = Vec::with_capacity(pool.len());

    for record in pool {
        let record_id = record.id;

        if record_id == request.requester_id {
            stats.excluded_self += 1;
            continue;
        }

        let candidate = match CandidateProfile::from_record(record, today) {
            Ok(candidate) => candidate,
            Err(reason) => {
                tracing::warn!("Skipping malformed candidate {}: {}", record_id, reason);
                stats.malformed_skipped += 1;
                continue;
            }
        };

        let age = candidate.age_on(today);
        if age < min_age || age > max_age {
            stats.excluded_age += 1;
            continue;
        }

        if candidate.fame_rate < min_fame || candidate.fame_rate > max_fame {
            stats.excluded_fame += 1;
            continue;
        }

        let distance_km = match (&radius, candidate.location) {
            (Some(check), Some(location)) => match check.accept(location) {
                Some(distance) => Some(distance),
                None => {
                    stats.excluded_distance += 1;
                    continue;
                }
            },
            // Without coordinates a candidate cannot satisfy an active radius
            (Some(_), None) => {
                stats.excluded_distance += 1;
                continue;
            }
            (None, _) => None,
        };

        if blocks.is_blocked(request.requester_id, candidate.id) {
            stats.excluded_blocked += 1;
            continue;
        }

        let overlap = tag_overlap(&requested_tags, &candidate.tags);
        if gate_on_tags && overlap == 0 {
            stats.excluded_tags += 1;
            continue;
        }

        kept.push(RankedCandidate {
            candidate,
            age,
            distance_km,
            tag_overlap: overlap,
        });
    }

    tracing::debug!(
        "Filter kept {} of {} candidates ({} malformed)",
        kept.len(),
        stats.examined,
        stats.malformed_skipped
    );

    (kept, stats)
}
