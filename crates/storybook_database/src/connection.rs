//! Connection pool and migrations.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use storybook_error::{DatabaseError, DatabaseErrorKind, StorybookResult};
use tracing::{debug, info};

/// Pooled PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Read `DATABASE_URL` from the environment.
///
/// # Errors
///
/// Returns a connection error if the variable is not set.
pub fn database_url_from_env() -> DatabaseResult<String> {
    std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })
}

/// Build a connection pool for `database_url`.
///
/// One connection is checked out immediately so a bad URL fails here
/// rather than on the first request.
///
/// # Errors
///
/// Returns a connection error if the pool cannot be built or warmed up.
pub fn establish_pool(database_url: &str, max_size: u32) -> DatabaseResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection(format!(
                "Failed to create connection pool: {}",
                e
            )))
        })?;

    {
        let _conn = pool.get()?;
    }

    debug!(max_size, "Database pool ready");
    Ok(pool)
}

/// Apply pending embedded migrations.
///
/// # Errors
///
/// Returns a migration error if any migration fails.
pub fn run_migrations(conn: &mut PgConnection) -> DatabaseResult<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
    info!(count = applied.len(), "Applied database migrations");
    Ok(())
}

/// Apply pending migrations using a pooled connection.
///
/// # Errors
///
/// Returns an error if no connection is available or a migration fails.
pub fn run_pool_migrations(pool: &PgPool) -> DatabaseResult<()> {
    let mut conn = pool.get()?;
    run_migrations(&mut conn)
}

/// Run `op` with a pooled connection on the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(pool: &PgPool, op: F) -> StorybookResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
{
    let pool = pool.clone();
    let result = tokio::task::spawn_blocking(move || -> DatabaseResult<T> {
        let mut conn = pool.get()?;
        op(&mut *conn)
    })
    .await
    .map_err(|e| {
        DatabaseError::new(DatabaseErrorKind::Query(format!(
            "Database task failed: {}",
            e
        )))
    })?;
    Ok(result?)
}
