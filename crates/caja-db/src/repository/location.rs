//! # Location Repository
//!
//! Database operations for selling locations.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use caja_core::Location;

/// Repository for location database operations.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    /// Creates a new LocationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LocationRepository { pool }
    }

    /// Inserts a location.
    pub async fn insert(&self, location: &Location) -> DbResult<()> {
        debug!(id = %location.id, name = %location.name, "Inserting location");

        sqlx::query(
            r#"
            INSERT INTO locations (id, name, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&location.id)
        .bind(&location.name)
        .bind(location.is_active)
        .bind(location.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a location by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, is_active, created_at
            FROM locations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    /// Gets a location by id, only if it is active.
    ///
    /// Returns `None` for both "missing" and "inactive": callers treat the
    /// two identically (`LocationInactive`).
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, is_active, created_at
            FROM locations
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }
}
