use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::tags::parse_tag_list;
use crate::models::domain::{DiscoveryRequest, GeoPoint, SortBy, MAX_FAME_RATE};

/// Query parameters of the research endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_ranges"))]
pub struct DiscoveryQuery {
    #[serde(rename = "minAge", default = "default_min_age")]
    #[validate(range(min = 18, max = 100))]
    pub min_age: u32,
    #[serde(rename = "maxAge", default = "default_max_age")]
    #[validate(range(min = 18, max = 100))]
    pub max_age: u32,
    #[serde(rename = "minFame", default)]
    #[validate(range(min = 0, max = 1000))]
    pub min_fame: i32,
    #[serde(rename = "maxFame", default = "default_max_fame")]
    #[validate(range(min = 0, max = 1000))]
    pub max_fame: i32,
    /// Comma-separated tag names
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub radius: Option<f64>,
    #[serde(rename = "sortBy", default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    #[validate(range(min = 1, max = 30))]
    pub limit: Option<usize>,
}

fn default_min_age() -> u32 {
    18
}

fn default_max_age() -> u32 {
    100
}

fn default_max_fame() -> i32 {
    MAX_FAME_RATE
}

fn validate_ranges(query: &DiscoveryQuery) -> Result<(), ValidationError> {
    if query.min_age > query.max_age {
        return Err(ValidationError::new("age_range_inverted"));
    }
    if query.min_fame > query.max_fame {
        return Err(ValidationError::new("fame_range_inverted"));
    }
    if query.lat.is_some() != query.lng.is_some() {
        return Err(ValidationError::new("partial_coordinates"));
    }
    Ok(())
}

impl DiscoveryQuery {
    /// Coordinates given explicitly by the caller, if both are present
    pub fn explicit_origin(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }

    /// Normalise the transport form into the engine's request value
    pub fn into_request(
        self,
        requester_id: i64,
        origin: Option<GeoPoint>,
        default_radius_km: f64,
        default_limit: usize,
    ) -> DiscoveryRequest {
        DiscoveryRequest {
            requester_id,
            age_range: (self.min_age, self.max_age),
            fame_range: (self.min_fame, self.max_fame),
            tags: self.tags.as_deref().map(parse_tag_list).unwrap_or_default(),
            origin,
            radius_km: self.radius.unwrap_or(default_radius_km),
            sort_by: self.sort_by,
            offset: self.offset,
            limit: self.limit.unwrap_or(default_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(params: serde_json::Value) -> DiscoveryQuery {
        serde_json::from_value(params).unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let q = query(json!({}));
        assert!(q.validate().is_ok());
        assert_eq!(q.min_age, 18);
        assert_eq!(q.max_fame, 1000);
        assert_eq!(q.sort_by, SortBy::Default);
    }

    #[test]
    fn test_inverted_age_range_rejected() {
        let q = query(json!({"minAge": 40, "maxAge": 30}));
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_inverted_fame_range_rejected() {
        let q = query(json!({"minFame": 800, "maxFame": 200}));
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_limit_out_of_bounds_rejected() {
        assert!(query(json!({"limit": 31})).validate().is_err());
        assert!(query(json!({"limit": 0})).validate().is_err());
        assert!(query(json!({"limit": 30})).validate().is_ok());
    }

    #[test]
    fn test_negative_radius_rejected() {
        assert!(query(json!({"radius": -1.0})).validate().is_err());
    }

    #[test]
    fn test_partial_coordinates_rejected() {
        assert!(query(json!({"lat": 48.85})).validate().is_err());
        assert!(query(json!({"lat": 48.85, "lng": 2.35})).validate().is_ok());
        assert!(query(json!({"lat": 95.0, "lng": 2.35})).validate().is_err());
    }

    #[test]
    fn test_into_request_normalizes_tags() {
        let q = query(json!({"tags": "Sport, music,,sport", "sortBy": "tags", "radius": 25.0}));
        let request = q.into_request(3, None, 50.0, 20);
        assert_eq!(request.requester_id, 3);
        assert_eq!(request.tags.len(), 2);
        assert!(request.tags.contains("sport"));
        assert_eq!(request.radius_km, 25.0);
        assert_eq!(request.sort_by, SortBy::Tags);
        assert_eq!(request.limit, 20);
    }
}
