use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::request::DeliveryRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Created,
    Imported,
    Claimed,
    Completed,
}

/// Published on the registry's broadcast channel after every committed write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEvent {
    pub kind: EventKind,
    pub request: DeliveryRequest,
    pub at: DateTime<Utc>,
}
