use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::store::{CREATED_AT_FIELD, NotFoundSnafu, OrderDirection, RemoteStore, StoreError};
use crate::{CodeFields, CodeId, CodePatch, Document};

/// A [`RemoteStore`] keeping all collections in memory.
///
/// Useful as a development backend and as a base for fakes. Cloning is cheap and clones share
/// their data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `document` into `collection` as is, keeping its id. Replaces a document with the
    /// same id.
    pub fn insert(&self, collection: &str, document: Document) {
        let mut collections = self.lock();
        let documents = collections.entry(collection.to_owned()).or_default();
        match documents.iter_mut().find(|it| it.id == document.id) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }

    /// Snapshot of all documents in `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// 15 random bytes, url-safe base64 encoded into a 20 character id.
fn generate_id() -> CodeId {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use rand::Rng;

    let bytes: [u8; 15] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

impl RemoteStore for MemoryStore {
    async fn fetch_all(
        &self,
        collection: &str,
        order_by: &str,
        direction: OrderDirection,
    ) -> Result<Vec<Document>, StoreError> {
        let mut documents = self.documents(collection);
        if order_by == CREATED_AT_FIELD {
            // Documents without a creation time go last in both directions.
            documents.sort_by(|a, b| match (a.fields.created_at, b.fields.created_at) {
                (Some(a), Some(b)) => match direction {
                    OrderDirection::Ascending => a.cmp(&b),
                    OrderDirection::Descending => b.cmp(&a),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        } else {
            tracing::warn!(order_by, "Unknown order field. Returning insertion order.");
        }
        Ok(documents)
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: &CodeFields,
    ) -> Result<CodeId, StoreError> {
        let mut collections = self.lock();
        let documents = collections.entry(collection.to_owned()).or_default();
        let id = loop {
            let candidate = generate_id();
            if !documents.iter().any(|it| it.id == candidate) {
                break candidate;
            }
        };
        documents.push(Document {
            id: id.clone(),
            fields: fields.clone(),
        });
        Ok(id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: &CodePatch,
    ) -> Result<(), StoreError> {
        let mut collections = self.lock();
        let document = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|it| it.id == id));
        match document {
            Some(document) => {
                document.fields.apply(patch);
                Ok(())
            }
            None => NotFoundSnafu { id }.fail(),
        }
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.lock();
        let documents = collections.entry(collection.to_owned()).or_default();
        match documents.iter().position(|it| it.id == id) {
            Some(index) => {
                documents.remove(index);
                Ok(())
            }
            None => NotFoundSnafu { id }.fail(),
        }
    }

    async fn batch_delete(&self, collection: &str, ids: &[CodeId]) -> Result<(), StoreError> {
        // Holding the lock for the whole batch makes it atomic. Unknown ids count as deleted.
        let mut collections = self.lock();
        if let Some(documents) = collections.get_mut(collection) {
            documents.retain(|it| !ids.contains(&it.id));
        }
        Ok(())
    }
}
