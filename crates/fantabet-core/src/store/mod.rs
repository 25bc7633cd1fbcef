// Document store: collection-scoped CRUD over JSON documents.
//
// The league keeps all of its data in named collections of JSON objects
// with string ids. `DocumentStore` is the seam; `MemoryStore` and
// `SqliteStore` implement it.

pub mod memory;
pub mod sqlite;

use std::fmt;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::config::{StoreBackend, StoreConfig};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Squads,
    Players,
    PlayerStats,
    Results,
    Schedules,
    Bets,
    Formations,
    CupDraws,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "fantabet_users",
            Collection::Squads => "fantabet_squads",
            Collection::Players => "fantabet_players",
            Collection::PlayerStats => "fantabet_player_stats",
            Collection::Results => "fantabet_results",
            Collection::Schedules => "fantabet_schedules",
            Collection::Bets => "fantabet_bets",
            Collection::Formations => "fantabet_formations",
            Collection::CupDraws => "fantabet_cup_draws",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    /// Always a JSON object.
    pub data: Value,
}

/// One operation of an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set {
        collection: Collection,
        id: String,
        data: Value,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document '{id}' not found in {collection}")]
    NotFound { collection: Collection, id: String },

    #[error("documents in {collection} must be JSON objects")]
    NotAnObject { collection: Collection },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed document: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in insertion order.
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Documents whose top-level `field` equals `value`, in insertion order.
    async fn fetch_where_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Store a new document under a generated id and return the id.
    async fn insert(&self, collection: Collection, data: Value) -> Result<String, StoreError>;

    /// Shallow-merge `partial` into an existing document.
    async fn update_merge(
        &self,
        collection: Collection,
        id: &str,
        partial: Value,
    ) -> Result<(), StoreError>;

    /// Remove a document; missing ids are not an error.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    /// Apply every op or none of them.
    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Box<T> {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        (**self).fetch_all(collection).await
    }

    async fn fetch_where_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).fetch_where_eq(collection, field, value).await
    }

    async fn insert(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        (**self).insert(collection, data).await
    }

    async fn update_merge(
        &self,
        collection: Collection,
        id: &str,
        partial: Value,
    ) -> Result<(), StoreError> {
        (**self).update_merge(collection, id, partial).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        (**self).delete(collection, id).await
    }

    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        (**self).batch(ops).await
    }
}

/// Open the backend named in the `[store]` config section.
pub fn open(config: &StoreConfig) -> Result<Box<dyn DocumentStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
        StoreBackend::Sqlite => {
            let path = config
                .resolved_path()
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
            Ok(Box::new(SqliteStore::open(&path)?))
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Random 20-character alphanumeric document id.
pub fn new_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect()
}

pub(crate) fn require_object(collection: Collection, data: &Value) -> Result<(), StoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::NotAnObject { collection })
    }
}

/// Overwrite `target`'s top-level keys with those of `partial`.
pub(crate) fn merge_fields(
    collection: Collection,
    target: &mut Value,
    partial: Value,
) -> Result<(), StoreError> {
    let Value::Object(fields) = partial else {
        return Err(StoreError::NotAnObject { collection });
    };
    let target: &mut Map<String, Value> = target
        .as_object_mut()
        .ok_or(StoreError::NotAnObject { collection })?;
    target.extend(fields);
    Ok(())
}

/// Every document in `collection` decoded as `T`. Documents that do not
/// decode are logged and left out.
pub async fn fetch_typed<T, S>(store: &S, collection: Collection) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    let docs = store.fetch_all(collection).await?;
    let mut records = Vec::with_capacity(docs.len());
    for doc in docs {
        match serde_json::from_value(doc.data) {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping malformed document {} in {collection}: {e}", doc.id),
        }
    }
    Ok(records)
}

/// Delete every document in `collection` in one batch; returns the count.
pub async fn clear_collection<S>(store: &S, collection: Collection) -> Result<usize, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let ops: Vec<WriteOp> = store
        .fetch_all(collection)
        .await?
        .into_iter()
        .map(|doc| WriteOp::Delete {
            collection,
            id: doc.id,
        })
        .collect();
    let deleted = ops.len();
    if deleted > 0 {
        store.batch(ops).await?;
    }
    info!("deleted {deleted} documents from {collection}");
    Ok(deleted)
}

/// Replace the contents of `collection` with `records`: one batch deleting
/// everything, then one batch inserting everything. A failure between the
/// two leaves the collection empty.
pub async fn replace_collection<T, S>(
    store: &S,
    collection: Collection,
    records: &[T],
) -> Result<usize, StoreError>
where
    T: Serialize,
    S: DocumentStore + ?Sized,
{
    clear_collection(store, collection).await?;

    let ops = records
        .iter()
        .map(|record| {
            Ok(WriteOp::Set {
                collection,
                id: new_document_id(),
                data: serde_json::to_value(record)?,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;
    let inserted = ops.len();
    if inserted > 0 {
        store.batch(ops).await?;
    }
    info!("inserted {inserted} documents into {collection}");
    Ok(inserted)
}
