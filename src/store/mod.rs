pub mod memory;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::document::RequestDocument;

/// Generic document store the registry persists through.
///
/// Implementations only need per-document atomicity; the registry serializes
/// its own read-check-write sequences.
pub trait DocumentStore: Send + Sync {
    fn put(&self, id: Uuid, document: RequestDocument) -> Result<(), AppError>;

    fn get(&self, id: Uuid) -> Result<Option<RequestDocument>, AppError>;

    fn scan(&self) -> Result<Vec<(Uuid, RequestDocument)>, AppError>;
}
