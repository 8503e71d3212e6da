use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::core::distance::ensure_valid;
use crate::core::error::{DiscoveryError, Result};
use crate::core::filters::{filter_candidates, BlockedSet, FilterOptions};
use crate::core::ranking::{paginate, rank_candidates};
use crate::models::{CandidateRecord, DiscoveryRequest, RankedResult};

/// Largest page a single discovery request may ask for
pub const MAX_PAGE_SIZE: usize = 30;

/// Read-only access to the candidate pool of a requester
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Every profile eligible for discovery, before filtering
    ///
    /// The pool may contain the requester; filtering excludes it.
    async fn fetch_candidate_pool(&self, requester_id: i64) -> Result<Vec<CandidateRecord>>;
}

/// Read-only access to block relations
#[async_trait]
pub trait RelationSource: Send + Sync {
    /// Ids the requester blocked or was blocked by
    async fn blocked_relations(&self, requester_id: i64) -> Result<Vec<i64>>;
}

#[async_trait]
impl<T: CandidateSource + ?Sized> CandidateSource for Arc<T> {
    async fn fetch_candidate_pool(&self, requester_id: i64) -> Result<Vec<CandidateRecord>> {
        (**self).fetch_candidate_pool(requester_id).await
    }
}

#[async_trait]
impl<T: RelationSource + ?Sized> RelationSource for Arc<T> {
    async fn blocked_relations(&self, requester_id: i64) -> Result<Vec<i64>> {
        (**self).blocked_relations(requester_id).await
    }
}

/// Discovery query façade: fetch, filter, rank, page
///
/// # Pipeline Stages
/// 1. Request validation
/// 2. Candidate pool and block relations fetch
/// 3. Hard-constraint filtering
/// 4. Ranking and pagination
#[derive(Clone)]
pub struct Discovery {
    candidates: Arc<dyn CandidateSource>,
    relations: Arc<dyn RelationSource>,
    options: FilterOptions,
}

impl Discovery {
    pub fn new(
        candidates: Arc<dyn CandidateSource>,
        relations: Arc<dyn RelationSource>,
        options: FilterOptions,
    ) -> Self {
        Self {
            candidates,
            relations,
            options,
        }
    }

    /// Run a discovery request, deriving ages at today's date (UTC)
    pub async fn discover(&self, request: &DiscoveryRequest) -> Result<RankedResult> {
        self.discover_on(request, Utc::now().date_naive()).await
    }

    /// Run a discovery request with an explicit evaluation date
    pub async fn discover_on(&self, request: &DiscoveryRequest, today: NaiveDate) -> Result<RankedResult> {
        check_request(request)?;

        let (pool, blocked) = tokio::try_join!(
            self.candidates.fetch_candidate_pool(request.requester_id),
            self.relations.blocked_relations(request.requester_id),
        )?;

        let blocks = BlockedSet::new(request.requester_id, blocked);
        tracing::debug!(
            "Fetched {} candidates and {} block relations for user {}",
            pool.len(),
            blocks.len(),
            request.requester_id
        );

        let (mut kept, stats) = filter_candidates(pool, request, &blocks, self.options, today);
        rank_candidates(&mut kept, request.sort_by);

        let total = kept.len();
        let (items, has_more) = paginate(kept, request.offset, request.limit);

        if stats.malformed_skipped > 0 {
            tracing::warn!(
                "Skipped {} malformed candidates for user {}",
                stats.malformed_skipped,
                request.requester_id
            );
        }

        Ok(RankedResult {
            items,
            has_more,
            total,
            stats,
        })
    }
}

/// Reject requests that break the value-object invariants
fn check_request(request: &DiscoveryRequest) -> Result<()> {
    let (min_age, max_age) = request.age_range;
    if min_age > max_age {
        return Err(DiscoveryError::validation(format!(
            "age range inverted: {}..{}",
            min_age, max_age
        )));
    }

    let (min_fame, max_fame) = request.fame_range;
    if min_fame > max_fame {
        return Err(DiscoveryError::validation(format!(
            "fame range inverted: {}..{}",
            min_fame, max_fame
        )));
    }

    if !request.radius_km.is_finite() || request.radius_km < 0.0 {
        return Err(DiscoveryError::validation(format!("invalid radius: {}", request.radius_km)));
    }

    if request.limit == 0 || request.limit > MAX_PAGE_SIZE {
        return Err(DiscoveryError::validation(format!(
            "limit must be within 1..={}, got {}",
            MAX_PAGE_SIZE, request.limit
        )));
    }

    if let Some(origin) = request.origin {
        ensure_valid(origin)?;
    }

    Ok(())
}
