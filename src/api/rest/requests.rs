use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::request::{DeliveryRequest, GeoPoint, Priority, RequestStatus};
use crate::registry::NewRequest;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/:id", get(get_request))
        .route("/requests/:id/claim", post(claim_request))
        .route("/requests/:id/complete", post(complete_request))
        .route("/dispatch/next", post(claim_next_request))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    pub item: String,
    #[serde(alias = "name")]
    pub requester_name: String,
    pub location: GeoPoint,
    pub priority: Priority,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelivererPayload {
    pub delivery_person_id: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: RequestStatus,
}

async fn create_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRequestPayload>, JsonRejection>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let Json(payload) = payload?;
    let request = state.registry.create(NewRequest {
        item: payload.item,
        requester_name: payload.requester_name,
        location: payload.location,
        priority: payload.priority,
        phone: payload.phone,
    })?;

    Ok(Json(request))
}

async fn list_requests(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<DeliveryRequest>>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.registry.list_by_status(query.status)?))
}

async fn get_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryRequest>, AppError> {
    Ok(Json(state.registry.get(id)?))
}

async fn claim_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DelivererPayload>, JsonRejection>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let Json(payload) = payload?;
    Ok(Json(state.registry.claim(id, &payload.delivery_person_id)?))
}

async fn complete_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DelivererPayload>, JsonRejection>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let Json(payload) = payload?;
    Ok(Json(
        state.registry.complete(id, &payload.delivery_person_id)?,
    ))
}

async fn claim_next_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DelivererPayload>, JsonRejection>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let Json(payload) = payload?;
    Ok(Json(state.registry.claim_next(&payload.delivery_person_id)?))
}
