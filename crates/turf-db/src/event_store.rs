//! Event store operations for the durable event history.
//!
//! Every gameplay event appended to the in-memory log is mirrored here.
//! The `processed` flag follows the aggregator: events are inserted
//! unprocessed and flipped once their batch has been folded into region
//! state. Archival of old processed rows is an operational concern
//! outside the engine.

use sqlx::PgPool;
use turf_types::{ActorId, EventId, RegionId, TerritoryEvent};
use uuid::Uuid;

use crate::error::DbError;

/// Default batch size for event inserts.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Operations on the `territory_events` table.
pub struct EventStore<'a> {
    pool: &'a PgPool,
    batch_size: usize,
}

impl<'a> EventStore<'a> {
    /// Create a new event store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size for inserts.
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Batch-insert events into the `territory_events` table.
    ///
    /// Each batch uses a single multi-row INSERT via UNNEST, wrapped in
    /// a transaction, so a batch commits fully or not at all. Re-inserts
    /// of an already-persisted event ID are ignored (`ON CONFLICT DO
    /// NOTHING`), making the mirror idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails, or
    /// [`DbError::Serialization`] if a delta cannot be encoded.
    pub async fn batch_insert(&self, events: &[TerritoryEvent]) -> Result<(), DbError> {
        if events.is_empty() {
            return Ok(());
        }

        for chunk in events.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;

            let len = chunk.len();
            let mut ids = Vec::with_capacity(len);
            let mut region_ids = Vec::with_capacity(len);
            let mut event_types = Vec::with_capacity(len);
            let mut severities: Vec<i16> = Vec::with_capacity(len);
            let mut actor_ids: Vec<Option<Uuid>> = Vec::with_capacity(len);
            let mut target_ids: Vec<Option<Uuid>> = Vec::with_capacity(len);
            let mut details_arr = Vec::with_capacity(len);
            let mut deltas = Vec::with_capacity(len);
            let mut processed_flags = Vec::with_capacity(len);
            let mut processed_ats = Vec::with_capacity(len);
            let mut timestamps = Vec::with_capacity(len);

            for event in chunk {
                ids.push(event.id.into_inner());
                region_ids.push(event.region_id.into_inner());
                event_types.push(event.event_type.as_str().to_owned());
                severities.push(i16::from(event.severity));
                actor_ids.push(event.actor_id.map(ActorId::into_inner));
                target_ids.push(event.target_id.map(ActorId::into_inner));
                details_arr.push(event.details.clone());
                deltas.push(serde_json::to_value(event.delta).map_err(DbError::Serialization)?);
                processed_flags.push(event.processed);
                processed_ats.push(event.processed_at);
                timestamps.push(event.created_at);
            }

            sqlx::query(
                r"INSERT INTO territory_events (id, region_id, event_type, severity, actor_id, target_id, details, delta, processed, processed_at, created_at)
                  SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::territory_event_type[], $4::SMALLINT[], $5::UUID[], $6::UUID[], $7::JSONB[], $8::JSONB[], $9::BOOLEAN[], $10::TIMESTAMPTZ[], $11::TIMESTAMPTZ[])
                  ON CONFLICT (id) DO NOTHING",
            )
            .bind(&ids)
            .bind(&region_ids)
            .bind(&event_types)
            .bind(&severities)
            .bind(&actor_ids)
            .bind(&target_ids)
            .bind(&details_arr)
            .bind(&deltas)
            .bind(&processed_flags)
            .bind(&processed_ats)
            .bind(&timestamps)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
        }

        tracing::debug!(count = events.len(), "Inserted territory events (batch UNNEST)");
        Ok(())
    }

    /// Flip the `processed` flag for a folded batch.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn mark_processed(
        &self,
        batch: &[EventId],
        processed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), DbError> {
        if batch.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = batch.iter().copied().map(EventId::into_inner).collect();
        sqlx::query(
            r"UPDATE territory_events
              SET processed = TRUE, processed_at = $2
              WHERE id = ANY($1) AND NOT processed",
        )
        .bind(&ids)
        .bind(processed_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Query recent events for a region, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_events_by_region(
        &self,
        region_id: RegionId,
        limit: i64,
    ) -> Result<Vec<EventRow>, DbError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT id, region_id, event_type::TEXT as event_type, severity, actor_id, target_id, details, delta, processed, processed_at, created_at
              FROM territory_events
              WHERE region_id = $1
              ORDER BY created_at DESC, id DESC
              LIMIT $2",
        )
        .bind(region_id.into_inner())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Count unprocessed events for a region.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count_unprocessed(&self, region_id: RegionId) -> Result<i64, DbError> {
        let row: (i64,) = sqlx::query_as(
            r"SELECT COUNT(*) FROM territory_events WHERE region_id = $1 AND NOT processed",
        )
        .bind(region_id.into_inner())
        .fetch_one(self.pool)
        .await?;
        Ok(row.0)
    }
}

/// A row from the `territory_events` table.
///
/// Uses runtime types rather than compile-time checked types to avoid
/// requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Event ID.
    pub id: Uuid,
    /// The region the event occurred in.
    pub region_id: Uuid,
    /// Event type as a string (cast from the `PostgreSQL` enum).
    pub event_type: String,
    /// Severity, 1-10.
    pub severity: i16,
    /// Primary actor involved, if any.
    pub actor_id: Option<Uuid>,
    /// Secondary actor involved, if any.
    pub target_id: Option<Uuid>,
    /// Type-specific payload.
    pub details: serde_json::Value,
    /// The precomputed metric delta vector.
    pub delta: serde_json::Value,
    /// Whether the aggregator has folded this event in.
    pub processed: bool,
    /// When the event was folded in, if it has been.
    pub processed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// When the event was recorded.
    pub created_at: chrono::DateTime<chrono::Utc>,
}
