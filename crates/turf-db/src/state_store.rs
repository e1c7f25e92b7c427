//! Region and region-state persistence.
//!
//! Region records are written once at world setup; region state rows
//! are upserted after every aggregation or decay run so the database
//! always holds the latest committed snapshot per region.

use sqlx::PgPool;
use turf_types::{Region, RegionId, RegionState};
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `regions` and `region_states` tables.
pub struct StateStore<'a> {
    pool: &'a PgPool,
}

impl<'a> StateStore<'a> {
    /// Create a new state store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a region record, ignoring re-inserts of the same ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn upsert_region(&self, region: &Region) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO regions (id, name, base_police, base_economy, created_at)
              VALUES ($1, $2, $3, $4, $5)
              ON CONFLICT (id) DO NOTHING",
        )
        .bind(region.id.into_inner())
        .bind(&region.name)
        .bind(region.base_police)
        .bind(region.base_economy)
        .bind(region.created_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Upsert the latest state snapshot for a region (idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert_state(&self, state: &RegionState) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO region_states
              (region_id, crime_index, police_presence, property_values, business_health, street_activity, heat_level, crew_tension, status, events_today, conflicts_today, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::district_status, $10, $11, $12)
              ON CONFLICT (region_id) DO UPDATE SET
                crime_index = EXCLUDED.crime_index,
                police_presence = EXCLUDED.police_presence,
                property_values = EXCLUDED.property_values,
                business_health = EXCLUDED.business_health,
                street_activity = EXCLUDED.street_activity,
                heat_level = EXCLUDED.heat_level,
                crew_tension = EXCLUDED.crew_tension,
                status = EXCLUDED.status,
                events_today = EXCLUDED.events_today,
                conflicts_today = EXCLUDED.conflicts_today,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(state.region_id.into_inner())
        .bind(state.metrics.crime_index)
        .bind(state.metrics.police_presence)
        .bind(state.metrics.property_values)
        .bind(state.metrics.business_health)
        .bind(state.metrics.street_activity)
        .bind(state.heat_level)
        .bind(state.crew_tension)
        .bind(state.status.as_str())
        .bind(i64::from(state.events_today))
        .bind(i64::from(state.conflicts_today))
        .bind(state.updated_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Fetch the persisted state snapshot for a region, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_state(&self, region_id: RegionId) -> Result<Option<RegionStateRow>, DbError> {
        let row = sqlx::query_as::<_, RegionStateRow>(
            r"SELECT region_id, crime_index, police_presence, property_values, business_health, street_activity, heat_level, crew_tension, status::TEXT as status, events_today, conflicts_today, updated_at
              FROM region_states
              WHERE region_id = $1",
        )
        .bind(region_id.into_inner())
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch every persisted region record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_regions(&self) -> Result<Vec<RegionRow>, DbError> {
        let rows = sqlx::query_as::<_, RegionRow>(
            r"SELECT id, name, base_police, base_economy, created_at
              FROM regions
              ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}

/// A row from the `regions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegionRow {
    /// Region ID.
    pub id: Uuid,
    /// District name.
    pub name: String,
    /// Default policing level.
    pub base_police: i64,
    /// Default economic strength.
    pub base_economy: i64,
    /// When the region was created.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A row from the `region_states` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegionStateRow {
    /// The region this state belongs to.
    pub region_id: Uuid,
    /// Crime index, 0-100.
    pub crime_index: i64,
    /// Police presence, 0-100.
    pub police_presence: i64,
    /// Property values, 0-100.
    pub property_values: i64,
    /// Business health, 0-100.
    pub business_health: i64,
    /// Street activity, 0-100.
    pub street_activity: i64,
    /// Heat level, 0-100.
    pub heat_level: i64,
    /// Crew tension, 0-100.
    pub crew_tension: i64,
    /// Derived status as a string (cast from the `PostgreSQL` enum).
    pub status: String,
    /// Events folded in since the last decay interval.
    pub events_today: i64,
    /// Conflict events folded in since the last decay interval.
    pub conflicts_today: i64,
    /// When this state was last written.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
