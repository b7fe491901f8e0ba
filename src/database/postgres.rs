use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::{DatabaseError, StudentStore};
use crate::config::DatabaseConfig;
use crate::student::{Student, StudentFields, StudentId};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        roll BIGINT NOT NULL,
        city VARCHAR(100) NOT NULL
    )
"#;

/// Student store backed by a Postgres `students` table
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(database_url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Create the students table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StudentStore for PostgresStore {
    async fn get(&self, id: StudentId) -> Result<Option<Student>, DatabaseError> {
        let row = sqlx::query_as::<_, Student>("SELECT id, name, roll, city FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<Student>, DatabaseError> {
        let rows = sqlx::query_as::<_, Student>("SELECT id, name, roll, city FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, fields: StudentFields) -> Result<Student, DatabaseError> {
        let row = sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, roll, city) VALUES ($1, $2, $3) RETURNING id, name, roll, city",
        )
        .bind(&fields.name)
        .bind(fields.roll)
        .bind(&fields.city)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: StudentId, fields: StudentFields) -> Result<Option<Student>, DatabaseError> {
        let row = sqlx::query_as::<_, Student>(
            "UPDATE students SET name = $2, roll = $3, city = $4 WHERE id = $1 RETURNING id, name, roll, city",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.roll)
        .bind(&fields.city)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: StudentId) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
