// SQLite-backed document store: one row per document, JSON in a TEXT column.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use super::{
    merge_fields, new_document_id, require_object, Collection, Document, DocumentStore,
    StoreError, WriteOp,
};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        debug!("opened document store at {}", path.display());
        Self::init(conn)
    }

    /// Ephemeral database, for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        // `seq` keeps insertion order; an upsert keeps the original seq.
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id         TEXT NOT NULL,
                data       TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                UNIQUE(collection, id)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq);
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database mutex poisoned".to_string()))
    }
}

const UPSERT: &str = "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)
     ON CONFLICT(collection, id) DO UPDATE SET
        data       = excluded.data,
        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

fn read_documents(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Document>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, json)| {
            Ok(Document {
                id,
                data: serde_json::from_str(&json)?,
            })
        })
        .collect()
}

/// Path expression for a top-level key, quoted so any key is accepted.
fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let conn = self.conn()?;
        read_documents(
            &conn,
            "SELECT id, data FROM documents WHERE collection = ?1 ORDER BY seq",
            params![collection.name()],
        )
    }

    async fn fetch_where_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let conn = self.conn()?;
        let path = json_path(field);

        // Scalars compare inside SQLite; structured values are matched here.
        let scalar = match value {
            Value::String(s) => Some(rusqlite::types::Value::Text(s.clone())),
            Value::Bool(b) => Some(rusqlite::types::Value::Integer(i64::from(*b))),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(rusqlite::types::Value::Integer(i)),
                None => n.as_f64().map(rusqlite::types::Value::Real),
            },
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        };

        match scalar {
            Some(scalar) => {
                let docs = read_documents(
                    &conn,
                    "SELECT id, data FROM documents
                     WHERE collection = ?1 AND json_extract(data, ?2) = ?3
                     ORDER BY seq",
                    params![collection.name(), path, scalar],
                )?;
                // json_extract maps booleans to 0/1, so confirm the JSON type
                Ok(docs
                    .into_iter()
                    .filter(|d| d.data.get(field) == Some(value))
                    .collect())
            }
            None => {
                let docs = read_documents(
                    &conn,
                    "SELECT id, data FROM documents WHERE collection = ?1 ORDER BY seq",
                    params![collection.name()],
                )?;
                Ok(docs
                    .into_iter()
                    .filter(|d| d.data.get(field) == Some(value))
                    .collect())
            }
        }
    }

    async fn insert(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        require_object(collection, &data)?;
        let id = new_document_id();
        let json = serde_json::to_string(&data)?;
        let conn = self.conn()?;
        conn.execute(UPSERT, params![collection.name(), id, json])?;
        Ok(id)
    }

    async fn update_merge(
        &self,
        collection: Collection,
        id: &str,
        partial: Value,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.name(), id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        };

        let mut data: Value = serde_json::from_str(&current)?;
        merge_fields(collection, &mut data, partial)?;
        tx.execute(UPSERT, params![collection.name(), id, serde_json::to_string(&data)?])?;
        tx.commit()?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.name(), id],
        )?;
        Ok(())
    }

    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for op in &ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    data,
                } => {
                    require_object(*collection, data)?;
                    tx.execute(
                        UPSERT,
                        params![collection.name(), id, serde_json::to_string(data)?],
                    )?;
                }
                WriteOp::Delete { collection, id } => {
                    tx.execute(
                        "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                        params![collection.name(), id],
                    )?;
                }
            }
        }

        // Dropping `tx` on an early return above rolls everything back.
        tx.commit()?;
        debug!("applied batch of {} ops", ops.len());
        Ok(())
    }
}
