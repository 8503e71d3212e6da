// Core algorithm exports
pub mod discovery;
pub mod distance;
pub mod error;
pub mod filters;
pub mod ranking;
pub mod tags;

pub use discovery::{CandidateSource, Discovery, RelationSource, MAX_PAGE_SIZE};
pub use distance::{calculate_bounding_box, distance_km, haversine_distance, is_within_bounding_box};
pub use error::DiscoveryError;
pub use filters::{filter_candidates, BlockLookup, BlockedSet, FilterOptions};
pub use ranking::{paginate, rank_candidates};
pub use tags::{parse_tag_list, tag_overlap};
