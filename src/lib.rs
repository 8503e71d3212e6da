//! Matcha Discovery - match-research service for the Matcha dating app
//!
//! This library provides the discovery ranking engine: given a requesting
//! user and filter criteria it fetches the candidate pool, applies the hard
//! constraints, and returns a deterministic, paginated ranking.

pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{distance::haversine_distance, CandidateSource, Discovery, DiscoveryError, RelationSource};
pub use models::{CandidateProfile, CandidateRecord, DiscoveryRequest, GeoPoint, RankedResult, SortBy};
