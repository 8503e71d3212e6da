use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{AuthError, TokenVerifier};
use crate::config::DiscoverySettings;
use crate::core::{Discovery, DiscoveryError};
use crate::models::{DiscoveryQuery, DiscoveryResponse, ErrorResponse, GeoPoint, HealthResponse};
use crate::services::{GeolocationClient, ProfileStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub discovery: Discovery,
    pub profiles: Arc<dyn ProfileStore>,
    pub geolocation: Option<Arc<GeolocationClient>>,
    pub verifier: TokenVerifier,
    pub settings: DiscoverySettings,
}

/// Configure the health and research routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/users/{username}/research", web::get().to(research));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.profiles.is_healthy().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// Match research endpoint
///
/// GET /api/v1/users/{username}/research
///
/// Query parameters: `minAge`, `maxAge`, `minFame`, `maxFame`, `tags`
/// (comma-separated), `lat`, `lng`, `radius` (km), `sortBy`
/// (`distance|age|fameRate|tags|default`), `offset`, `limit` (1-30).
async fn research(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DiscoveryQuery>,
    http_req: HttpRequest,
) -> impl Responder {
    use actix_web::http::StatusCode;

    let username = path.into_inner();

    let claims = match state.verifier.authorize(&http_req, &username) {
        Ok(claims) => claims,
        Err(e @ AuthError::Forbidden(_)) => {
            tracing::info!("Rejected research for {}: {}", username, e);
            return error_response(StatusCode::FORBIDDEN, "Forbidden", e.to_string());
        }
        Err(e) => {
            tracing::info!("Unauthenticated research for {}: {}", username, e);
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized", e.to_string());
        }
    };

    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for research request: field_errors={:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let request_id = uuid::Uuid::new_v4();
    let origin = match resolve_origin(&state, &query, claims.id, &http_req).await {
        Ok(origin) => origin,
        Err(e) => {
            tracing::error!(%request_id, "Origin lookup failed for user {}: {}", claims.id, e);
            return error_response(StatusCode::SERVICE_UNAVAILABLE, "Data unavailable", e.to_string());
        }
    };

    let request = query.into_inner().into_request(
        claims.id,
        origin,
        state.settings.default_radius_km,
        state.settings.default_limit,
    );

    tracing::info!(
        %request_id,
        "Research for user {} (sort: {:?}, offset: {}, limit: {}, origin: {})",
        claims.id,
        request.sort_by,
        request.offset,
        request.limit,
        origin.is_some()
    );

    match state.discovery.discover(&request).await {
        Ok(result) => {
            tracing::info!(
                %request_id,
                "Returning {} of {} candidates ({} malformed skipped)",
                result.items.len(),
                result.total,
                result.stats.malformed_skipped
            );
            HttpResponse::Ok().json(DiscoveryResponse::from(result))
        }
        Err(DiscoveryError::Validation(message)) => {
            error_response(StatusCode::BAD_REQUEST, "Validation failed", message)
        }
        Err(DiscoveryError::DataUnavailable(message)) => {
            tracing::error!(%request_id, "Discovery failed for user {}: {}", claims.id, message);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Data unavailable", message)
        }
    }
}

/// Pick the origin of the radius filter
///
/// Explicit query coordinates win, then the requester's stored location,
/// then the client's IP location when geolocation is enabled. A failing
/// profile store is an error; a failing IP lookup only means "no origin".
async fn resolve_origin(
    state: &AppState,
    query: &DiscoveryQuery,
    requester_id: i64,
    http_req: &HttpRequest,
) -> Result<Option<GeoPoint>, DiscoveryError> {
    if let Some(origin) = query.explicit_origin() {
        return Ok(Some(origin));
    }

    if let Some(origin) = state.profiles.stored_location(requester_id).await? {
        return Ok(Some(origin));
    }

    let (Some(geolocation), Some(ip)) = (state.geolocation.as_ref(), client_ip(http_req)) else {
        return Ok(None);
    };

    match geolocation.locate(ip).await {
        Ok(origin) => Ok(origin),
        Err(e) => {
            tracing::warn!("IP geolocation failed for {}: {}", requester_id, e);
            Ok(None)
        }
    }
}

fn client_ip(http_req: &HttpRequest) -> Option<IpAddr> {
    let info = http_req.connection_info();
    let addr = info.realip_remote_addr()?;
    addr.parse::<IpAddr>()
        .ok()
        .or_else(|| addr.parse::<SocketAddr>().ok().map(|socket| socket.ip()))
}
