use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::document::RequestDocument;
use crate::models::event::{EventKind, RequestEvent};
use crate::models::request::{
    dispatch_order, validate_deliverer, validate_details, DeliveryRequest, GeoPoint, Priority,
    RequestStatus,
};
use crate::observability::metrics::Metrics;
use crate::store::DocumentStore;

#[derive(Debug, Clone)]
pub struct NewRequest {
    pub item: String,
    pub requester_name: String,
    pub location: GeoPoint,
    pub priority: Priority,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub waiting: usize,
    pub delivering: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.waiting + self.delivering + self.completed
    }
}

/// Owns every delivery request and the only legal ways to change one.
///
/// Writes go through a single transition lock so that a read-check-write
/// (claim, complete) observes committed state and concurrent claims on the
/// same request cannot both succeed. Reads go straight to the store.
pub struct RequestRegistry {
    store: Arc<dyn DocumentStore>,
    transitions: Mutex<()>,
    events_tx: broadcast::Sender<RequestEvent>,
    metrics: Metrics,
}

impl RequestRegistry {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        events_tx: broadcast::Sender<RequestEvent>,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            transitions: Mutex::new(()),
            events_tx,
            metrics,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.events_tx.subscribe()
    }

    pub fn create(&self, new: NewRequest) -> Result<DeliveryRequest, AppError> {
        validate_details(&new.item, &new.requester_name, &new.location)?;

        let _guard = self.lock()?;
        let request = DeliveryRequest {
            id: self.fresh_id()?,
            item: new.item,
            requester_name: new.requester_name,
            location: new.location,
            created_at: Utc::now(),
            status: RequestStatus::Waiting,
            priority: new.priority,
            delivery_person_id: None,
            phone: new.phone,
        };

        self.persist(&request)?;
        self.metrics.record_created(request.priority, request.status);

        info!(
            request_id = %request.id,
            priority = request.priority.as_str(),
            "request created"
        );
        self.publish(EventKind::Created, &request);

        Ok(request)
    }

    pub fn import(&self, document: RequestDocument) -> Result<DeliveryRequest, AppError> {
        self.import_at(document, Utc::now())
    }

    /// Inserts a persisted-form record in whatever status it carries. A
    /// server-time placeholder in `timestamp` resolves to `now`.
    pub fn import_at(
        &self,
        document: RequestDocument,
        now: DateTime<Utc>,
    ) -> Result<DeliveryRequest, AppError> {
        let created_at = document.timestamp.resolve(now)?;

        let _guard = self.lock()?;
        let request = document.into_request_at(self.fresh_id()?, created_at);
        request.validate()?;

        self.persist(&request)?;
        self.metrics.record_created(request.priority, request.status);

        info!(
            request_id = %request.id,
            status = %request.status,
            priority = request.priority.as_str(),
            "request imported"
        );
        self.publish(EventKind::Imported, &request);

        Ok(request)
    }

    pub fn get(&self, id: Uuid) -> Result<DeliveryRequest, AppError> {
        self.store
            .get(id)?
            .ok_or_else(|| AppError::NotFound(format!("request {id} not found")))?
            .into_request(id)
    }

    pub fn claim(&self, id: Uuid, delivery_person_id: &str) -> Result<DeliveryRequest, AppError> {
        validate_deliverer(delivery_person_id)?;

        let _guard = self.lock()?;
        let request = self.get(id)?;
        self.claim_locked(request, delivery_person_id)
    }

    /// Claims the waiting request at the head of dispatch order.
    pub fn claim_next(&self, delivery_person_id: &str) -> Result<DeliveryRequest, AppError> {
        validate_deliverer(delivery_person_id)?;

        let _guard = self.lock()?;
        let next = self
            .list_by_status(RequestStatus::Waiting)?
            .into_iter()
            .next()
            .ok_or(AppError::NoWaitingRequests)?;

        self.claim_locked(next, delivery_person_id)
    }

    pub fn complete(&self, id: Uuid, delivery_person_id: &str) -> Result<DeliveryRequest, AppError> {
        let _guard = self.lock()?;
        let mut request = self.get(id)?;

        if request.status != RequestStatus::Delivering {
            return Err(self.reject("complete", &request, RequestStatus::Completed));
        }

        if request.delivery_person_id.as_deref() != Some(delivery_person_id) {
            self.metrics.record_rejected("complete");
            warn!(
                request_id = %id,
                delivery_person_id,
                "complete rejected: deliverer mismatch"
            );
            return Err(AppError::Unauthorized(format!(
                "request {id} is assigned to a different delivery person"
            )));
        }

        request.status = RequestStatus::Completed;
        self.persist(&request)?;
        self.metrics.record_transition(
            "complete",
            RequestStatus::Delivering,
            RequestStatus::Completed,
        );

        info!(request_id = %id, delivery_person_id, "request completed");
        self.publish(EventKind::Completed, &request);

        Ok(request)
    }

    pub fn list_by_status(&self, status: RequestStatus) -> Result<Vec<DeliveryRequest>, AppError> {
        let mut requests: Vec<DeliveryRequest> = self
            .all()?
            .into_iter()
            .filter(|request| request.status == status)
            .collect();

        requests.sort_by(dispatch_order);
        Ok(requests)
    }

    pub fn counts(&self) -> Result<StatusCounts, AppError> {
        let mut counts = StatusCounts::default();
        for request in self.all()? {
            match request.status {
                RequestStatus::Waiting => counts.waiting += 1,
                RequestStatus::Delivering => counts.delivering += 1,
                RequestStatus::Completed => counts.completed += 1,
            }
        }
        Ok(counts)
    }

    fn claim_locked(
        &self,
        mut request: DeliveryRequest,
        delivery_person_id: &str,
    ) -> Result<DeliveryRequest, AppError> {
        if request.status != RequestStatus::Waiting {
            return Err(self.reject("claim", &request, RequestStatus::Delivering));
        }

        request.status = RequestStatus::Delivering;
        request.delivery_person_id = Some(delivery_person_id.to_string());
        self.persist(&request)?;
        self.metrics.record_transition(
            "claim",
            RequestStatus::Waiting,
            RequestStatus::Delivering,
        );

        info!(
            request_id = %request.id,
            delivery_person_id,
            priority = request.priority.as_str(),
            "request claimed"
        );
        self.publish(EventKind::Claimed, &request);

        Ok(request)
    }

    fn reject(&self, transition: &str, request: &DeliveryRequest, to: RequestStatus) -> AppError {
        self.metrics.record_rejected(transition);
        warn!(
            request_id = %request.id,
            status = %request.status,
            transition,
            "transition rejected"
        );

        AppError::InvalidTransition {
            id: request.id,
            from: request.status,
            to,
        }
    }

    fn all(&self) -> Result<Vec<DeliveryRequest>, AppError> {
        self.store
            .scan()?
            .into_iter()
            .map(|(id, document)| document.into_request(id))
            .collect()
    }

    fn persist(&self, request: &DeliveryRequest) -> Result<(), AppError> {
        self.store.put(request.id, RequestDocument::from(request))
    }

    fn fresh_id(&self) -> Result<Uuid, AppError> {
        loop {
            let id = Uuid::new_v4();
            if self.store.get(id)?.is_none() {
                return Ok(id);
            }
        }
    }

    fn publish(&self, kind: EventKind, request: &DeliveryRequest) {
        let _ = self.events_tx.send(RequestEvent {
            kind,
            request: request.clone(),
            at: Utc::now(),
        });
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.transitions
            .lock()
            .map_err(|_| AppError::Internal("transition lock poisoned".to_string()))
    }
}
