use crate::error::ApiError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Check if a service with the given name already exists within a tenancy
pub async fn check_duplicate_service(
    pool: &PgPool,
    tenancy_id: Uuid,
    name: &str,
) -> Result<bool, ApiError> {
    tracing::debug!("Checking for duplicate service: {}", name);

    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM services WHERE tenancy_id = $1 AND name = $2)",
    )
    .bind(tenancy_id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(exists.unwrap_or(false))
}

/// Check for a duplicate service name within a tenancy, excluding one ID
/// Used by updates so a service can keep its own name
pub async fn check_duplicate_service_excluding_id(
    pool: &PgPool,
    tenancy_id: Uuid,
    name: &str,
    exclude_id: i32,
) -> Result<bool, ApiError> {
    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM services WHERE tenancy_id = $1 AND name = $2 AND id != $3)",
    )
    .bind(tenancy_id)
    .bind(name)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;

    Ok(exists.unwrap_or(false))
}
