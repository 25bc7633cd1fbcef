// In-process document store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    merge_fields, new_document_id, require_object, Collection, Document, DocumentStore,
    StoreError, WriteOp,
};

type Collections = HashMap<Collection, Vec<Document>>;

/// Documents held in memory, per collection in insertion order. Used by
/// tests and by the `memory` backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn set(collections: &mut Collections, collection: Collection, id: String, data: Value) {
    let docs = collections.entry(collection).or_default();
    match docs.iter_mut().find(|d| d.id == id) {
        Some(existing) => existing.data = data,
        None => docs.push(Document { id, data }),
    }
}

fn remove(collections: &mut Collections, collection: Collection, id: &str) {
    if let Some(docs) = collections.get_mut(&collection) {
        docs.retain(|d| d.id != id);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock()?;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn fetch_where_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock()?;
        let matches = collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.data.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(matches)
    }

    async fn insert(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        require_object(collection, &data)?;
        let id = new_document_id();
        let mut collections = self.lock()?;
        set(&mut collections, collection, id.clone(), data);
        Ok(id)
    }

    async fn update_merge(
        &self,
        collection: Collection,
        id: &str,
        partial: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;
        merge_fields(collection, &mut doc.data, partial)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        remove(&mut collections, collection, id);
        Ok(())
    }

    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        // Validate everything first so a bad op leaves the store untouched.
        for op in &ops {
            if let WriteOp::Set {
                collection, data, ..
            } = op
            {
                require_object(*collection, data)?;
            }
        }

        let mut collections = self.lock()?;
        for op in ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    data,
                } => set(&mut collections, collection, id, data),
                WriteOp::Delete { collection, id } => remove(&mut collections, collection, &id),
            }
        }
        Ok(())
    }
}
