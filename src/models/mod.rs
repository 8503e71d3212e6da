// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateProfile, CandidateRecord, DiscoveryRequest, FilterStats, GeoPoint, MalformedRecord,
    RankedCandidate, RankedResult, SortBy,
};
pub use requests::DiscoveryQuery;
pub use responses::{DiscoveredUser, DiscoveryResponse, ErrorResponse, HealthResponse};
