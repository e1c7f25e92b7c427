//! Active-effect persistence.
//!
//! Every triggered effect instance is mirrored here, and the expiry
//! sweep's end stamps follow. A partial unique index on
//! `(region_id, effect_type) WHERE ended_at IS NULL` backs the
//! at-most-one-live invariant at the database level.

use sqlx::PgPool;
use turf_types::{ActiveEffect, EffectId, EffectType, RegionId};
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `active_effects` table.
pub struct EffectStore<'a> {
    pool: &'a PgPool,
}

impl<'a> EffectStore<'a> {
    /// Create a new effect store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a triggered effect instance.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails, including
    /// unique violations from the live-instance partial index, or
    /// [`DbError::Serialization`] if the modifiers cannot be encoded.
    pub async fn insert_effect(&self, effect: &ActiveEffect) -> Result<(), DbError> {
        let modifiers =
            serde_json::to_value(&effect.modifiers).map_err(DbError::Serialization)?;
        sqlx::query(
            r"INSERT INTO active_effects (id, region_id, effect_type, modifiers, started_at, expires_at, ended_at)
              VALUES ($1, $2, $3::effect_type, $4, $5, $6, $7)
              ON CONFLICT (id) DO NOTHING",
        )
        .bind(effect.id.into_inner())
        .bind(effect.region_id.into_inner())
        .bind(effect.effect_type.as_str())
        .bind(modifiers)
        .bind(effect.started_at)
        .bind(effect.expires_at)
        .bind(effect.ended_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Stamp an effect instance as ended.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn end_effect(
        &self,
        effect_id: EffectId,
        ended_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"UPDATE active_effects
              SET ended_at = $2
              WHERE id = $1 AND ended_at IS NULL",
        )
        .bind(effect_id.into_inner())
        .bind(ended_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Stamp every lapsed, not-yet-ended instance as ended at its
    /// expiry time. Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn end_expired(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"UPDATE active_effects
              SET ended_at = expires_at
              WHERE ended_at IS NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Live effect instances for a region.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_live_by_region(
        &self,
        region_id: RegionId,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<EffectRow>, DbError> {
        let rows = sqlx::query_as::<_, EffectRow>(
            r"SELECT id, region_id, effect_type::TEXT as effect_type, modifiers, started_at, expires_at, ended_at
              FROM active_effects
              WHERE region_id = $1 AND ended_at IS NULL AND expires_at > $2
              ORDER BY started_at, id",
        )
        .bind(region_id.into_inner())
        .bind(now)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// The most recent end time of an effect type in a region, for
    /// cooldown bookkeeping over restarts.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_last_end(
        &self,
        region_id: RegionId,
        effect_type: EffectType,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, DbError> {
        let row: Option<(Option<chrono::DateTime<chrono::Utc>>,)> = sqlx::query_as(
            r"SELECT MAX(ended_at)
              FROM active_effects
              WHERE region_id = $1 AND effect_type = $2::effect_type AND ended_at IS NOT NULL",
        )
        .bind(region_id.into_inner())
        .bind(effect_type.as_str())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.and_then(|(max,)| max))
    }
}

/// A row from the `active_effects` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EffectRow {
    /// Effect instance ID.
    pub id: Uuid,
    /// The region the effect applies to.
    pub region_id: Uuid,
    /// Effect type as a string (cast from the `PostgreSQL` enum).
    pub effect_type: String,
    /// Modifier snapshot, keyed by modifier name with decimal strings.
    pub modifiers: serde_json::Value,
    /// When the effect started.
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When the effect is due to expire.
    pub expires_at: chrono::DateTime<chrono::Utc>,
    /// When the effect actually ended, if it has.
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
}
