//! PostgreSQL document store.
//!
//! Documents live in a single `documents` table as JSONB, addressed by
//! `(collection, id)`. Partial updates use JSONB concatenation, so a patch
//! replaces top-level fields and leaves the rest of the document as is.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::common::{ProcessorError, Result};
use crate::kernel::{BaseDocumentStore, Document};

/// PostgreSQL-backed document store.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Connect to `database_url` and make sure the schema exists.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Self::from_pool(pool).await
    }

    /// Build a store from an existing connection pool.
    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Document store schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseDocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Ok(None),
            Some((Value::Object(map),)) => Ok(Some(map)),
            Some((other,)) => Err(ProcessorError::Persistence(format!(
                "{}/{} is not a JSON object: {}",
                collection, id, other
            ))),
        }
    }

    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(doc))
        .execute(&self.pool)
        .await?;

        debug!(collection = collection, id = id, "Document set");
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = body || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(patch))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ProcessorError::NotFound(format!("{}/{}", collection, id)));
        }

        debug!(collection = collection, id = id, "Document updated");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}
