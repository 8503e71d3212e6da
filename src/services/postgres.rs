use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::core::discovery::{CandidateSource, RelationSource};
use crate::core::error::DiscoveryError;
use crate::models::{CandidateRecord, GeoPoint};
use crate::services::ProfileStore;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

impl From<PostgresError> for DiscoveryError {
    fn from(value: PostgresError) -> Self {
        DiscoveryError::DataUnavailable(value.to_string())
    }
}

/// PostgreSQL client over the Matcha user store
///
/// Read-only: profiles with their tags, block relations, and stored
/// locations. Schema changes are owned by the main application.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Every user with their tag names
    ///
    /// The requester is part of the pool; the candidate filter drops it.
    pub async fn candidate_pool(&self) -> Result<Vec<CandidateRecord>, PostgresError> {
        let query = r#"
            SELECT
                u.id::int8 AS id,
                u.first_name::text AS first_name,
                u.gender::text AS gender,
                u.fame_rate::int4 AS fame_rate,
                u.born_at::date AS born_at,
                u.latitude::float8 AS latitude,
                u.longitude::float8 AS longitude,
                u.profile_picture::text AS profile_picture,
                COALESCE(
                    array_agg(t.name::text) FILTER (WHERE t.name IS NOT NULL),
                    '{}'::text[]
                ) AS tags
            FROM users u
            LEFT JOIN user_tags ut ON ut.user_id = u.id
            LEFT JOIN tags t ON t.id = ut.tag_id
            GROUP BY u.id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let records: Result<Vec<CandidateRecord>, sqlx::Error> = rows
            .iter()
            .map(|row| {
                Ok(CandidateRecord {
                    id: row.try_get("id")?,
                    first_name: row.try_get("first_name")?,
                    gender: row.try_get("gender")?,
                    tags: row.try_get("tags")?,
                    fame_rate: row.try_get("fame_rate")?,
                    born_at: row.try_get("born_at")?,
                    latitude: row.try_get("latitude")?,
                    longitude: row.try_get("longitude")?,
                    profile_picture: row.try_get("profile_picture")?,
                })
            })
            .collect();

        let records = records?;
        tracing::debug!("Loaded {} candidate rows", records.len());

        Ok(records)
    }

    /// Ids the user blocked, plus ids that blocked the user
    pub async fn blocked_ids(&self, user_id: i64) -> Result<Vec<i64>, PostgresError> {
        let query = r#"
            SELECT blocked_id::int8 AS other_id FROM blocks WHERE blocker_id = $1
            UNION
            SELECT blocker_id::int8 AS other_id FROM blocks WHERE blocked_id = $1
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| row.try_get("other_id").map_err(PostgresError::from))
            .collect()
    }

    /// Coordinates stored on the user's profile, if both are set
    pub async fn find_location(&self, user_id: i64) -> Result<Option<GeoPoint>, PostgresError> {
        let row = sqlx::query("SELECT latitude::float8 AS latitude, longitude::float8 AS longitude FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lat: Option<f64> = row.try_get("latitude")?;
        let lng: Option<f64> = row.try_get("longitude")?;

        Ok(match (lat, lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)).filter(GeoPoint::is_valid),
            _ => None,
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl CandidateSource for PostgresClient {
    async fn fetch_candidate_pool(&self, requester_id: i64) -> Result<Vec<CandidateRecord>, DiscoveryError> {
        self.candidate_pool().await.map_err(|e| {
            tracing::error!("Failed to load candidate pool for {}: {}", requester_id, e);
            e.into()
        })
    }
}

#[async_trait]
impl RelationSource for PostgresClient {
    async fn blocked_relations(&self, requester_id: i64) -> Result<Vec<i64>, DiscoveryError> {
        self.blocked_ids(requester_id).await.map_err(|e| {
            tracing::error!("Failed to load block relations for {}: {}", requester_id, e);
            e.into()
        })
    }
}

#[async_trait]
impl ProfileStore for PostgresClient {
    async fn stored_location(&self, user_id: i64) -> Result<Option<GeoPoint>, DiscoveryError> {
        self.find_location(user_id).await.map_err(Into::into)
    }

    async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}
