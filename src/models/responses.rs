use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::domain::{RankedCandidate, RankedResult};

/// One user card in the research response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredUser {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    pub gender: String,
    pub tags: Vec<String>,
    #[serde(rename = "fameRate")]
    pub fame_rate: i32,
    #[serde(rename = "profilePicture")]
    pub profile_picture: Option<String>,
    #[serde(rename = "bornAt")]
    pub born_at: NaiveDate,
    pub distance: Option<f64>,
}

impl From<RankedCandidate> for DiscoveredUser {
    fn from(ranked: RankedCandidate) -> Self {
        let candidate = ranked.candidate;
        Self {
            id: candidate.id,
            first_name: candidate.first_name,
            gender: candidate.gender,
            tags: candidate.tags.into_iter().collect(),
            fame_rate: candidate.fame_rate,
            profile_picture: candidate.profile_picture,
            born_at: candidate.born_at,
            distance: ranked.distance_km,
        }
    }
}

/// Response for the research endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub users: Vec<DiscoveredUser>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    pub total: usize,
}

impl From<RankedResult> for DiscoveryResponse {
    fn from(result: RankedResult) -> Self {
        Self {
            users: result.items.into_iter().map(DiscoveredUser::from).collect(),
            has_more: result.has_more,
            total: result.total,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
