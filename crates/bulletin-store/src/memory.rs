//! In-memory document store
//!
//! Suitable for single-process deployments and testing. Documents are kept
//! in their JSON form, so the store exercises the same serde contract a
//! real document database would.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{Collection, Document};
use crate::filter::Filter;
use crate::patch::Patch;
use crate::store::{DocumentStore, StoreError, StoreResult};

type Table = BTreeMap<Uuid, Value>;

/// In-memory [`DocumentStore`] implementation.
///
/// Ids are UUID v7, so the `BTreeMap` ordering doubles as creation order.
/// Cloning the store shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<Collection, Table>>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: Collection) -> usize {
        self.tables
            .read()
            .await
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }
}

fn to_json<D: Document>(doc: &D) -> StoreResult<Value> {
    serde_json::to_value(doc).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_json<D: Document>(value: Value) -> StoreResult<D> {
    serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get<D: Document>(&self, id: Uuid) -> StoreResult<Option<D>> {
        let tables = self.tables.read().await;
        tables
            .get(&D::COLLECTION)
            .and_then(|table| table.get(&id))
            .cloned()
            .map(from_json)
            .transpose()
    }

    async fn find<D: Document>(&self, filter: &Filter) -> StoreResult<Vec<D>> {
        let matching: Vec<Value> = {
            let tables = self.tables.read().await;
            match tables.get(&D::COLLECTION) {
                Some(table) => table.values().filter(|doc| filter.matches(doc)).cloned().collect(),
                None => Vec::new(),
            }
        };
        matching.into_iter().map(from_json).collect()
    }

    async fn insert<D: Document>(&self, doc: &D) -> StoreResult<()> {
        let id = doc.id();
        let value = to_json(doc)?;

        let mut tables = self.tables.write().await;
        let table = tables.entry(D::COLLECTION).or_default();
        if table.contains_key(&id) {
            return Err(StoreError::Duplicate {
                collection: D::COLLECTION,
                id,
            });
        }
        table.insert(id, value);

        tracing::debug!(collection = %D::COLLECTION, %id, "Document inserted");
        Ok(())
    }

    async fn update<D: Document>(&self, id: Uuid, patch: &Patch) -> StoreResult<D> {
        let mut tables = self.tables.write().await;
        let current = tables
            .get_mut(&D::COLLECTION)
            .and_then(|table| table.get_mut(&id))
            .ok_or(StoreError::NotFound {
                collection: D::COLLECTION,
                id,
            })?;

        let mut next = current.clone();
        patch.apply(D::COLLECTION, id, &mut next)?;

        // Reject patches that would leave an undecodable document behind.
        let updated = from_json::<D>(next.clone())?;
        *current = next;

        tracing::debug!(
            collection = %D::COLLECTION,
            %id,
            fields = patch.sets().len(),
            "Document updated"
        );
        Ok(updated)
    }

    async fn delete<D: Document>(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(&D::COLLECTION)
            .and_then(|table| table.remove(&id));
        match removed {
            Some(_) => {
                tracing::debug!(collection = %D::COLLECTION, %id, "Document deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound {
                collection: D::COLLECTION,
                id,
            }),
        }
    }
}
