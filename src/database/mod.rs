pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::student::{Student, StudentFields, StudentId};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for student records.
///
/// Each method is a single read or a single write; there is no cross-call
/// isolation, so two writers addressing the same id race and the last one wins.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Fetch one record. Ok(None) when the id is unknown.
    async fn get(&self, id: StudentId) -> Result<Option<Student>, DatabaseError>;

    /// All records ordered by id
    async fn list(&self) -> Result<Vec<Student>, DatabaseError>;

    /// Insert a record under a freshly assigned id
    async fn create(&self, fields: StudentFields) -> Result<Student, DatabaseError>;

    /// Replace the fields of an existing record. Ok(None) when the id is unknown.
    async fn update(&self, id: StudentId, fields: StudentFields) -> Result<Option<Student>, DatabaseError>;

    /// Remove a record. Ok(false) when the id is unknown.
    async fn delete(&self, id: StudentId) -> Result<bool, DatabaseError>;

    /// Cheap connectivity probe for the health endpoint
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Build the store selected by configuration: Postgres when a URL is set, memory otherwise
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn StudentStore>, DatabaseError> {
    match config.url.as_deref() {
        Some(url) => {
            let store = PostgresStore::connect(url, config).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory student store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
