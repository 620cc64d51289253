//! Persisted form of a delivery request.
//!
//! Documents are flat key-value records in the shape the document store
//! keeps them: `{ item, name, location, timestamp, status, priority,
//! deliveryPersonId, phone }`. The id lives outside the document, as the
//! store key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::request::{DeliveryRequest, GeoPoint, Priority, RequestStatus};

/// Placeholder that asks the writer to stamp the current server time.
pub const SERVER_TIMESTAMP: &str = "現在時刻";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentTimestamp {
    At(DateTime<Utc>),
    Placeholder(String),
}

impl DocumentTimestamp {
    /// Resolves the server-time placeholder to `now`. Any other text is rejected.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        match self {
            DocumentTimestamp::At(at) => Ok(*at),
            DocumentTimestamp::Placeholder(raw) if raw == SERVER_TIMESTAMP => Ok(now),
            DocumentTimestamp::Placeholder(raw) => {
                Err(AppError::Validation(format!("invalid timestamp: {raw}")))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDocument {
    pub item: String,
    pub name: String,
    pub location: GeoPoint,
    pub timestamp: DocumentTimestamp,
    pub status: RequestStatus,
    pub priority: Priority,
    #[serde(default)]
    pub delivery_person_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<&DeliveryRequest> for RequestDocument {
    fn from(request: &DeliveryRequest) -> Self {
        Self {
            item: request.item.clone(),
            name: request.requester_name.clone(),
            location: request.location,
            timestamp: DocumentTimestamp::At(request.created_at),
            status: request.status,
            priority: request.priority,
            delivery_person_id: request.delivery_person_id.clone(),
            phone: request.phone.clone(),
        }
    }
}

impl RequestDocument {
    /// Decodes a stored document. Stored documents always carry a resolved
    /// timestamp, so a placeholder here means the store holds a bad record.
    pub fn into_request(self, id: Uuid) -> Result<DeliveryRequest, AppError> {
        let created_at = match self.timestamp {
            DocumentTimestamp::At(at) => at,
            DocumentTimestamp::Placeholder(raw) => {
                return Err(AppError::Internal(format!(
                    "stored request {id} has unresolved timestamp {raw:?}"
                )));
            }
        };

        let request = self.into_request_at(id, created_at);
        request
            .validate()
            .map_err(|err| AppError::Internal(format!("stored request {id} is invalid: {err}")))?;

        Ok(request)
    }

    /// Checks that the document would import cleanly at `now`.
    pub fn check_importable(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        let created_at = self.timestamp.resolve(now)?;
        self.clone().into_request_at(Uuid::nil(), created_at).validate()
    }

    pub(crate) fn into_request_at(self, id: Uuid, created_at: DateTime<Utc>) -> DeliveryRequest {
        DeliveryRequest {
            id,
            item: self.item,
            requester_name: self.name,
            location: self.location,
            created_at,
            status: self.status,
            priority: self.priority,
            delivery_person_id: self.delivery_person_id,
            phone: self.phone,
        }
    }
}
