// Service exports
pub mod cache;
pub mod geolocation;
pub mod postgres;

pub use cache::{CacheError, CacheKey, CacheManager, CachedCandidateSource};
pub use geolocation::{GeolocationClient, GeolocationError};
pub use postgres::{PostgresClient, PostgresError};

use async_trait::async_trait;

use crate::core::error::DiscoveryError;
use crate::models::GeoPoint;

/// Profile lookups the HTTP layer needs around a discovery request
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Coordinates stored on the user's profile
    async fn stored_location(&self, user_id: i64) -> Result<Option<GeoPoint>, DiscoveryError>;

    /// Whether the backing store answers
    async fn is_healthy(&self) -> bool;
}
