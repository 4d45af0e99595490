//! Repository layer: one JSON document per record, keyed by collection and id.

use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::Row;
use tracing::{debug, info, warn};

use crate::domain::{RecordId, TimeMs};
use crate::store::{Collection, Document, Ledger};

/// Repository for database operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

fn encode_body<T: Document>(doc: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(doc).map_err(|e| sqlx::Error::Protocol(format!("cannot encode document: {}", e)))
}

async fn insert_document<T: Document>(
    conn: &mut SqliteConnection,
    doc: &T,
    updated_ms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO documents (collection, id, body, updated_ms)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(collection, id) DO UPDATE SET
            body = excluded.body,
            updated_ms = excluded.updated_ms
        "#,
    )
    .bind(T::COLLECTION.as_str())
    .bind(doc.id().as_str())
    .bind(encode_body(doc)?)
    .bind(updated_ms)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_all<T: Document>(
    conn: &mut SqliteConnection,
    docs: &[T],
    updated_ms: i64,
) -> Result<(), sqlx::Error> {
    for doc in docs {
        insert_document(conn, doc, updated_ms).await?;
    }
    Ok(())
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Cheap liveness query used by the readiness probe.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert or overwrite a document. An overwrite keeps the original
    /// insertion position.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub async fn put_document<T: Document>(&self, doc: &T) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        insert_document(&mut conn, doc, TimeMs::now().as_ms()).await?;
        debug!(collection = %T::COLLECTION, id = %doc.id(), "document stored");
        Ok(())
    }

    /// Delete a document. Returns whether a row was removed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete_document<T: Document>(&self, id: &RecordId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(T::COLLECTION.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of stored documents in one collection.
    pub async fn count(&self, collection: Collection) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE collection = ?")
            .bind(collection.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Load a collection in insertion order.
    ///
    /// Documents that no longer parse are skipped with a warning rather than
    /// failing the whole load.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn load_collection<T: Document>(&self) -> Result<Vec<T>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, body FROM documents
            WHERE collection = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(T::COLLECTION.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let body: String = row.get("body");
            match serde_json::from_str::<T>(&body) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    warn!(collection = %T::COLLECTION, %id, error = %e, "skipping unreadable document")
                }
            }
        }
        Ok(docs)
    }

    /// Load every collection into a fresh ledger.
    ///
    /// # Errors
    /// Returns an error if any query fails.
    pub async fn load_ledger(&self) -> Result<Ledger, sqlx::Error> {
        let ledger = Ledger {
            futures_trades: self.load_collection().await?,
            spot_trades: self.load_collection().await?,
            tasks: self.load_collection().await?,
            project_costs: self.load_collection().await?,
            fixed_expenses: self.load_collection().await?,
            statuses: self.load_collection().await?,
            project_names: self.load_collection().await?,
        };
        info!(documents = ledger.len(), "ledger loaded");
        Ok(ledger)
    }

    /// Atomically replace all stored documents with the ledger's contents.
    ///
    /// # Errors
    /// Returns an error if any write fails; nothing is changed in that case.
    pub async fn replace_all(&self, ledger: &Ledger) -> Result<(), sqlx::Error> {
        let now = TimeMs::now().as_ms();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM documents").execute(&mut *tx).await?;
        insert_all(&mut tx, &ledger.futures_trades, now).await?;
        insert_all(&mut tx, &ledger.spot_trades, now).await?;
        insert_all(&mut tx, &ledger.tasks, now).await?;
        insert_all(&mut tx, &ledger.project_costs, now).await?;
        insert_all(&mut tx, &ledger.fixed_expenses, now).await?;
        insert_all(&mut tx, &ledger.statuses, now).await?;
        insert_all(&mut tx, &ledger.project_names, now).await?;

        tx.commit().await?;
        info!(documents = ledger.len(), "ledger replaced");
        Ok(())
    }
}
