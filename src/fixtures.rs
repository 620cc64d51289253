//! Sample delivery requests for manual testing.

use chrono::{Duration, Utc};
use tracing::info;

use crate::error::AppError;
use crate::models::document::RequestDocument;
use crate::models::request::DeliveryRequest;
use crate::registry::RequestRegistry;

const SAMPLE_REQUESTS: &str = include_str!("../fixtures/sample_requests.json");

pub fn sample_documents() -> Result<Vec<RequestDocument>, AppError> {
    serde_json::from_str(SAMPLE_REQUESTS)
        .map_err(|err| AppError::Internal(format!("invalid sample fixtures: {err}")))
}

pub fn seed(registry: &RequestRegistry) -> Result<Vec<DeliveryRequest>, AppError> {
    seed_documents(registry, sample_documents()?)
}

/// Imports documents in order, offsetting each placeholder timestamp by the
/// record's index so input order survives as creation order. Every document
/// is checked before the first import, so a bad record leaves nothing behind.
pub fn seed_documents(
    registry: &RequestRegistry,
    documents: Vec<RequestDocument>,
) -> Result<Vec<DeliveryRequest>, AppError> {
    let base = Utc::now();
    let stamp = |index: usize| base + Duration::milliseconds(index as i64);

    for (index, document) in documents.iter().enumerate() {
        document
            .check_importable(stamp(index))
            .map_err(|err| AppError::Validation(format!("sample record {index}: {err}")))?;
    }

    let seeded = documents
        .into_iter()
        .enumerate()
        .map(|(index, document)| registry.import_at(document, stamp(index)))
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = seeded.len(), "sample requests seeded");
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use super::{sample_documents, seed, seed_documents};
    use crate::error::AppError;
    use crate::models::request::{Priority, RequestStatus};
    use crate::observability::metrics::Metrics;
    use crate::registry::RequestRegistry;
    use crate::store::memory::MemoryStore;

    #[test]
    fn samples_parse() {
        let documents = sample_documents().unwrap();
        assert_eq!(documents.len(), 5);
        assert!(documents[2].phone.is_none());
    }

    fn registry() -> RequestRegistry {
        let (events_tx, _rx) = broadcast::channel(16);
        RequestRegistry::new(Arc::new(MemoryStore::new()), events_tx, Metrics::new())
    }

    #[test]
    fn bad_record_leaves_registry_untouched() {
        let registry = registry();
        let mut documents = sample_documents().unwrap();
        documents[4].delivery_person_id = None;

        assert!(matches!(
            seed_documents(&registry, documents),
            Err(AppError::Validation(_))
        ));
        assert_eq!(registry.counts().unwrap().total(), 0);
    }

    #[test]
    fn seeded_waiting_requests_follow_priority() {
        let registry = registry();
        seed(&registry).unwrap();

        let waiting = registry.list_by_status(RequestStatus::Waiting).unwrap();
        let names: Vec<_> = waiting.iter().map(|r| r.requester_name.as_str()).collect();
        assert_eq!(names, vec!["佐藤花子", "山田次郎", "鈴木三郎"]);
        assert_eq!(waiting[0].priority, Priority::High);

        let delivering = registry.list_by_status(RequestStatus::Delivering).unwrap();
        assert_eq!(delivering.len(), 1);
        assert_eq!(
            delivering[0].delivery_person_id.as_deref(),
            Some("delivery_test123")
        );

        let completed = registry.list_by_status(RequestStatus::Completed).unwrap();
        assert_eq!(completed[0].requester_name, "伊藤美子");
    }
}
