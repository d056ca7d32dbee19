//! # Location Repository
//!
//! Stores and branches. Creating one is an owner-only operation; codes are
//! unique across the chain.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use vorca_core::validation::{validate_location_code, validate_name};
use vorca_core::{Location, NewLocation, Principal};

const SELECT_LOCATION: &str = "SELECT id, name, code, active, created_at FROM locations";

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

    /// Creates a location.
    ///
    /// ## Errors
    /// - `Forbidden` unless the principal is an owner
    /// - `ValidationError` for a blank name or malformed code
    /// - `Conflict` if the code is already taken
    pub async fn create(&self, principal: &Principal, input: &NewLocation) -> DbResult<Location> {
        principal.require_owner("create location")?;
        validate_name("name", &input.name)?;
        validate_location_code(&input.code)?;

        let location = Location {
            id: new_id(),
            name: input.name.trim().to_string(),
            code: input.code.clone(),
            active: true,
            created_at: now(),
        };

        debug!(code = %location.code, "Creating location");

        sqlx::query(
            r#"
            INSERT INTO locations (id, name, code, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&location.id)
        .bind(&location.name)
        .bind(&location.code)
        .bind(location.active)
        .bind(location.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("location code", &location.code),
            other => other,
        })?;

        info!(id = %location.id, code = %location.code, actor = %principal.id, "Location created");
        Ok(location)
    }

    /// Gets a location by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(&format!("{} WHERE id = ?1", SELECT_LOCATION))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(location)
    }

    /// Lists all locations by name.
    pub async fn list(&self) -> DbResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(&format!("{} ORDER BY name", SELECT_LOCATION))
            .fetch_all(&self.pool)
            .await?;

        Ok(locations)
    }
}
