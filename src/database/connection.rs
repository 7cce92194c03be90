use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

pub fn create_pool(database_path: &str) -> Result<DbPool> {
    let manager = build_manager(SqliteConnectionManager::file(database_path));
    build_pool(manager)
}

fn build_manager(manager: SqliteConnectionManager) -> SqliteConnectionManager {
    // Foreign keys are off by default in SQLite; game membership rows rely
    // on them for cascading deletes.
    manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    r2d2::Pool::builder()
        .build(manager)
        .context("Failed to create database connection pool")
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}

/// Pool over a private in-memory database with the schema applied.
/// Capped at one connection: each in-memory connection would otherwise
/// open a separate empty database.
#[cfg(test)]
pub fn memory_pool() -> DbPool {
    let manager = build_manager(SqliteConnectionManager::memory());
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to build in-memory pool");
    let conn = pool.get().expect("Failed to open in-memory connection");
    super::setup::init_database(&conn).expect("Failed to apply schema");
    pool
}
