use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::document::RequestDocument;
use crate::store::DocumentStore;

#[derive(Default)]
pub struct MemoryStore {
    documents: DashMap<Uuid, RequestDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn put(&self, id: Uuid, document: RequestDocument) -> Result<(), AppError> {
        self.documents.insert(id, document);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<RequestDocument>, AppError> {
        Ok(self.documents.get(&id).map(|entry| entry.value().clone()))
    }

    fn scan(&self) -> Result<Vec<(Uuid, RequestDocument)>, AppError> {
        Ok(self
            .documents
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect())
    }
}
