use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::Validation(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::Validation(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }

        Ok(())
    }
}

/// Declared low to high so the derived `Ord` matches dispatch urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Waiting,
    Delivering,
    Completed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::Waiting,
        RequestStatus::Delivering,
        RequestStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Waiting => "waiting",
            RequestStatus::Delivering => "delivering",
            RequestStatus::Completed => "completed",
        }
    }

    /// The deliverer is recorded on every status past `waiting`.
    pub fn requires_deliverer(&self) -> bool {
        !matches!(self, RequestStatus::Waiting)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequest {
    pub id: Uuid,
    pub item: String,
    pub requester_name: String,
    pub location: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub priority: Priority,
    pub delivery_person_id: Option<String>,
    pub phone: Option<String>,
}

impl DeliveryRequest {
    /// Checks field constraints and the status/deliverer invariant.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_details(&self.item, &self.requester_name, &self.location)?;

        match (&self.status, &self.delivery_person_id) {
            (RequestStatus::Waiting, Some(_)) => Err(AppError::Validation(
                "waiting request cannot have a delivery person".to_string(),
            )),
            (status, None) if status.requires_deliverer() => Err(AppError::Validation(format!(
                "{status} request must have a delivery person"
            ))),
            (_, Some(deliverer)) => validate_deliverer(deliverer),
            _ => Ok(()),
        }
    }
}

pub fn validate_details(item: &str, requester_name: &str, location: &GeoPoint) -> Result<(), AppError> {
    if item.trim().is_empty() {
        return Err(AppError::Validation("item cannot be empty".to_string()));
    }

    if requester_name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    location.validate()
}

pub fn validate_deliverer(delivery_person_id: &str) -> Result<(), AppError> {
    if delivery_person_id.trim().is_empty() {
        return Err(AppError::Validation(
            "deliveryPersonId cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// High priority first, then oldest first. The id keeps the order total.
pub fn dispatch_order(a: &DeliveryRequest, b: &DeliveryRequest) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn request(priority: Priority, age_secs: i64) -> DeliveryRequest {
        DeliveryRequest {
            id: Uuid::new_v4(),
            item: "お米 5kg".to_string(),
            requester_name: "田中一郎".to_string(),
            location: GeoPoint {
                latitude: 35.6581,
                longitude: 139.7414,
            },
            created_at: Utc::now() - Duration::seconds(age_secs),
            status: RequestStatus::Waiting,
            priority,
            delivery_person_id: None,
            phone: None,
        }
    }

    #[test]
    fn priority_orders_low_to_high() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn dispatch_order_prefers_priority_then_age() {
        let old_low = request(Priority::Low, 300);
        let new_high = request(Priority::High, 10);
        let old_high = request(Priority::High, 60);

        let mut queue = vec![old_low.clone(), new_high.clone(), old_high.clone()];
        queue.sort_by(dispatch_order);

        let ids: Vec<_> = queue.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![old_high.id, new_high.id, old_low.id]);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let north = GeoPoint {
            latitude: 90.5,
            longitude: 0.0,
        };
        let east = GeoPoint {
            latitude: 0.0,
            longitude: 180.01,
        };
        let nan = GeoPoint {
            latitude: f64::NAN,
            longitude: 0.0,
        };

        assert!(matches!(north.validate(), Err(AppError::Validation(_))));
        assert!(matches!(east.validate(), Err(AppError::Validation(_))));
        assert!(matches!(nan.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn boundary_coordinates_are_accepted() {
        let corner = GeoPoint {
            latitude: -90.0,
            longitude: 180.0,
        };
        assert!(corner.validate().is_ok());
    }

    #[test]
    fn blank_item_is_rejected() {
        let mut blank = request(Priority::Low, 0);
        blank.item = "   ".to_string();
        assert!(matches!(blank.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn deliverer_must_match_status() {
        let mut waiting_with_deliverer = request(Priority::Medium, 0);
        waiting_with_deliverer.delivery_person_id = Some("delivery_test123".to_string());
        assert!(waiting_with_deliverer.validate().is_err());

        let mut delivering_without = request(Priority::Medium, 0);
        delivering_without.status = RequestStatus::Delivering;
        assert!(delivering_without.validate().is_err());

        let mut completed = request(Priority::Medium, 0);
        completed.status = RequestStatus::Completed;
        completed.delivery_person_id = Some("delivery_test456".to_string());
        assert!(completed.validate().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_and_lowercase_enums() {
        let value = serde_json::to_value(request(Priority::High, 0)).unwrap();
        assert_eq!(value["requesterName"], "田中一郎");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["status"], "waiting");
        assert!(value["deliveryPersonId"].is_null());
    }
}
