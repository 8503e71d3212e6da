use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::tags::normalize_tags;

/// Highest fame rate a profile can carry
pub const MAX_FAME_RATE: i32 = 1000;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Raw candidate row as handed over by a data source.
///
/// Every field except the id may be missing; conversion into a
/// [`CandidateProfile`] decides whether the row is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: i64,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "fameRate", default)]
    pub fame_rate: Option<i32>,
    #[serde(rename = "bornAt", default)]
    pub born_at: Option<NaiveDate>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "profilePicture", default)]
    pub profile_picture: Option<String>,
}

/// Why a raw record was skipped by the candidate filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    MissingField(&'static str),
    FameRateOutOfRange(i32),
    PartialCoordinates,
    InvalidCoordinates,
    BornInFuture,
}

impl std::fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedRecord::MissingField(field) => write!(f, "missing field `{}`", field),
            MalformedRecord::FameRateOutOfRange(rate) => write!(f, "fame rate {} out of range", rate),
            MalformedRecord::PartialCoordinates => write!(f, "only one coordinate present"),
            MalformedRecord::InvalidCoordinates => write!(f, "coordinates out of range"),
            MalformedRecord::BornInFuture => write!(f, "birth date in the future"),
        }
    }
}

/// Validated, read-only projection of a profile that the engine works on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    pub gender: String,
    pub tags: BTreeSet<String>,
    #[serde(rename = "fameRate")]
    pub fame_rate: i32,
    #[serde(rename = "bornAt")]
    pub born_at: NaiveDate,
    pub location: Option<GeoPoint>,
    #[serde(rename = "profilePicture")]
    pub profile_picture: Option<String>,
}

impl CandidateProfile {
    /// Validate a raw record against the evaluation date
    pub fn from_record(record: CandidateRecord, today: NaiveDate) -> Result<Self, MalformedRecord> {
        let first_name = record
            .first_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(MalformedRecord::MissingField("firstName"))?;
        let gender = record
            .gender
            .filter(|gender| !gender.trim().is_empty())
            .ok_or(MalformedRecord::MissingField("gender"))?;
        let fame_rate = record.fame_rate.ok_or(MalformedRecord::MissingField("fameRate"))?;
        if !(0..=MAX_FAME_RATE).contains(&fame_rate) {
            return Err(MalformedRecord::FameRateOutOfRange(fame_rate));
        }
        let born_at = record.born_at.ok_or(MalformedRecord::MissingField("bornAt"))?;
        if born_at > today {
            return Err(MalformedRecord::BornInFuture);
        }

        let location = match (record.latitude, record.longitude) {
            (Some(lat), Some(lng)) => {
                let point = GeoPoint::new(lat, lng);
                if !point.is_valid() {
                    return Err(MalformedRecord::InvalidCoordinates);
                }
                Some(point)
            }
            (None, None) => None,
            _ => return Err(MalformedRecord::PartialCoordinates),
        };

        Ok(Self {
            id: record.id,
            first_name,
            gender,
            tags: normalize_tags(&record.tags),
            fame_rate,
            born_at,
            location,
            profile_picture: record.profile_picture,
        })
    }

    /// Age in full years at the given date
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        age_on(self.born_at, today)
    }
}

/// Floor of the years elapsed between `born_at` and `today`, zero if not born yet
pub fn age_on(born_at: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - born_at.year();
    if (today.month(), today.day()) < (born_at.month(), born_at.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Sort key requested for the discovery results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Distance,
    Age,
    FameRate,
    Tags,
    #[default]
    Default,
}

/// Normalised discovery request handed to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    pub requester_id: i64,
    pub age_range: (u32, u32),
    pub fame_range: (i32, i32),
    pub tags: BTreeSet<String>,
    pub origin: Option<GeoPoint>,
    pub radius_km: f64,
    pub sort_by: SortBy,
    pub offset: usize,
    pub limit: usize,
}

/// A candidate that survived filtering, with the values it was ranked on
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: CandidateProfile,
    pub age: u32,
    pub distance_km: Option<f64>,
    pub tag_overlap: usize,
}

/// Per-request counters describing what the candidate filter did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub examined: usize,
    pub malformed_skipped: usize,
    pub excluded_self: usize,
    pub excluded_age: usize,
    pub excluded_fame: usize,
    pub excluded_distance: usize,
    pub excluded_blocked: usize,
    pub excluded_tags: usize,
}

/// One page of ranked candidates
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub items: Vec<RankedCandidate>,
    pub has_more: bool,
    pub total: usize,
    pub stats: FilterStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn complete_record() -> CandidateRecord {
        CandidateRecord {
            id: 7,
            first_name: Some("Alice".to_string()),
            gender: Some("female".to_string()),
            tags: vec![" Sport ".to_string(), "music".to_string()],
            fame_rate: Some(420),
            born_at: Some(date(1995, 6, 15)),
            latitude: Some(48.85),
            longitude: Some(2.35),
            profile_picture: Some("https://cdn.example/alice.jpg".to_string()),
        }
    }

    #[test]
    fn test_age_floors_before_birthday() {
        assert_eq!(age_on(date(2000, 6, 15), date(2025, 6, 14)), 24);
        assert_eq!(age_on(date(2000, 6, 15), date(2025, 6, 15)), 25);
        assert_eq!(age_on(date(2000, 2, 29), date(2025, 2, 28)), 24);
        assert_eq!(age_on(date(2000, 2, 29), date(2025, 3, 1)), 25);
    }

    #[test]
    fn test_record_conversion_normalizes_tags() {
        let profile = CandidateProfile::from_record(complete_record(), date(2025, 1, 1)).unwrap();
        assert_eq!(profile.tags.iter().collect::<Vec<_>>(), vec!["music", "sport"]);
        assert_eq!(profile.location, Some(GeoPoint::new(48.85, 2.35)));
        assert_eq!(profile.age_on(date(2025, 1, 1)), 29);
    }

    #[test]
    fn test_record_without_coordinates_is_usable() {
        let mut record = complete_record();
        record.latitude = None;
        record.longitude = None;
        let profile = CandidateProfile::from_record(record, date(2025, 1, 1)).unwrap();
        assert!(profile.location.is_none());
    }

    #[test]
    fn test_malformed_records() {
        let today = date(2025, 1, 1);

        let mut record = complete_record();
        record.born_at = None;
        assert_eq!(
            CandidateProfile::from_record(record, today),
            Err(MalformedRecord::MissingField("bornAt"))
        );

        let mut record = complete_record();
        record.fame_rate = Some(1001);
        assert_eq!(
            CandidateProfile::from_record(record, today),
            Err(MalformedRecord::FameRateOutOfRange(1001))
        );

        let mut record = complete_record();
        record.longitude = None;
        assert_eq!(
            CandidateProfile::from_record(record, today),
            Err(MalformedRecord::PartialCoordinates)
        );

        let mut record = complete_record();
        record.latitude = Some(91.0);
        assert_eq!(
            CandidateProfile::from_record(record, today),
            Err(MalformedRecord::InvalidCoordinates)
        );

        let mut record = complete_record();
        record.born_at = Some(date(2026, 1, 1));
        assert_eq!(
            CandidateProfile::from_record(record, today),
            Err(MalformedRecord::BornInFuture)
        );
    }

    #[test]
    fn test_sort_by_wire_names() {
        let parsed: SortBy = serde_json::from_str("\"fameRate\"").unwrap();
        assert_eq!(parsed, SortBy::FameRate);
        assert_eq!(serde_json::to_string(&SortBy::Default).unwrap(), "\"default\"");
    }
}
