//! Storage layer - SQLite with automatic migrations
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//!
//! # Usage
//!
//! ```ignore
//! use trendlens_core::storage::Database;
//!
//! // Create an in-memory database for testing
//! let db = Database::in_memory().await?;
//! ```

pub mod database;
pub mod migrations;

// Re-export commonly used types
pub use database::{default_database_path, Database, DatabaseConfig};
pub use migrations::{migration_status, needs_migration, run_migrations, MigrationStatus, CURRENT_VERSION};
