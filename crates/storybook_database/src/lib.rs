//! PostgreSQL persistence for Storybook.
//!
//! This crate provides the diesel schema, row models, embedded migrations and
//! the repository implementations behind the `BookRepository` and
//! `SettingsRepository` traits.
//!
//! # Features
//!
//! - Pooled PostgreSQL access (r2d2), blocking work off the async runtime
//! - Transactional book writes (book row and page rows together)
//! - In-memory repositories with identical semantics
//!
//! # Example
//!
//! ```rust,ignore
//! use storybook_database::{establish_pool, run_pool_migrations, PostgresBookRepository};
//!
//! let pool = establish_pool(&database_url, 10)?;
//! run_pool_migrations(&pool)?;
//! let repo = PostgresBookRepository::new(pool);
//! ```

#![forbid(unsafe_code)]

mod book_repository;
mod connection;
mod memory;
mod models;
mod settings_repository;

pub mod schema;

pub use book_repository::PostgresBookRepository;
pub use connection::{
    DEFAULT_POOL_SIZE, PgPool, database_url_from_env, establish_pool, run_migrations,
    run_pool_migrations,
};
pub use memory::{InMemoryBookRepository, InMemorySettingsRepository};
pub use models::{
    BookChangeset, BookRow, NewBookRow, NewPageRow, PageRow, SettingsRow, page_row_id,
};
pub use settings_repository::{GLOBAL_SETTINGS_ID, PostgresSettingsRepository};

pub use storybook_error::{DatabaseError, DatabaseErrorKind};

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
