//! PostgreSQL persistence and the storage seam for the inventory.
//!
//! Repositories are zero-sized structs with async methods taking `&PgPool`.
//! [`store::CatalogStore`] is the trait the rest of the system talks to; it
//! has a PostgreSQL implementation and an in-memory one.

use sqlx::postgres::PgPoolOptions;

pub mod inventory;
pub mod models;
pub mod repositories;
pub mod sql;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
