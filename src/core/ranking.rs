use std::cmp::Ordering;

use crate::models::{RankedCandidate, SortBy};

/// Order candidates by the requested key
///
/// The order is total: whenever the sort key ties, candidates fall back to
/// ascending id, so repeated calls page through the same sequence.
pub fn rank_candidates(candidates: &mut [RankedCandidate], sort_by: SortBy) {
    candidates.sort_by(|a, b| compare(a, b, sort_by));
}

/// Comparison used by [`rank_candidates`]
pub fn compare(a: &RankedCandidate, b: &RankedCandidate, sort_by: SortBy) -> Ordering {
    let primary = match sort_by {
        SortBy::Distance => compare_distance(a.distance_km, b.distance_km),
        SortBy::Age => a.age.cmp(&b.age),
        SortBy::FameRate => b.candidate.fame_rate.cmp(&a.candidate.fame_rate),
        SortBy::Tags => b.tag_overlap.cmp(&a.tag_overlap),
        SortBy::Default => b
            .tag_overlap
            .cmp(&a.tag_overlap)
            .then_with(|| b.candidate.fame_rate.cmp(&a.candidate.fame_rate))
            .then_with(|| compare_distance(a.distance_km, b.distance_km)),
    };

    primary.then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

/// Ascending distance, unknown distances last
#[inline]
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Slice one page out of the fully ranked sequence
///
/// Returns the page and whether more items follow it. An offset past the
/// end yields an empty page.
pub fn paginate<T>(ranked: Vec<T>, offset: usize, limit: usize) -> (Vec<T>, bool) {
    let total = ranked.len();
    let has_more = offset.saturating_add(limit) < total;
    let page = ranked.into_iter().skip(offset).take(limit).collect();
    (page, has_more)
}
