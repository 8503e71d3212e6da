use reqwest::Client;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

use crate::models::GeoPoint;

/// Errors that can occur when resolving an IP address to a location
#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Body returned by ip-api compatible services
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// IP geolocation client
///
/// Used as the last fallback for a request origin when neither the query
/// nor the stored profile carries coordinates.
pub struct GeolocationClient {
    base_url: String,
    client: Client,
}

impl GeolocationClient {
    /// Create a new geolocation client
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, GeolocationError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    /// Locate a public IP address
    ///
    /// Returns `Ok(None)` for addresses that cannot be located, such as
    /// loopback or private ranges, without calling the service.
    pub async fn locate(&self, ip: IpAddr) -> Result<Option<GeoPoint>, GeolocationError> {
        if !is_public(ip) {
            tracing::debug!("Skipping geolocation for non-public address {}", ip);
            return Ok(None);
        }

        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&ip.to_string())
        );

        tracing::debug!("Locating {} via {}", ip, url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeolocationError::ApiError(format!(
                "Geolocation lookup failed: {}",
                response.status()
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| GeolocationError::InvalidResponse(e.to_string()))?;

        if let Some(status) = body.status.as_deref() {
            if status != "success" {
                return Err(GeolocationError::ApiError(
                    body.message.unwrap_or_else(|| status.to_string()),
                ));
            }
        }

        Ok(match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)).filter(GeoPoint::is_valid),
            _ => None,
        })
    }
}

/// Whether an address is worth sending to a public geolocation service
fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation())
        }
        IpAddr::V6(v6) => {
            let unique_local = (v6.segments()[0] & 0xfe00) == 0xfc00;
            let link_local = (v6.segments()[0] & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}
