//! Routes for service-request intake and triage.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    client::Client,
    service_request::{CreateServiceRequest, RequestStatus, ServiceRequest},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::{response::ApiResponse, validation::validate_email};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateStatusRequest {
    pub status: RequestStatus,
    pub resolution_note: Option<String>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ServiceRequest>>>, ApiError> {
    let requests = ServiceRequest::find_all(&state.db.pool, query.status).await?;
    Ok(ResponseJson(ApiResponse::success(requests)))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ServiceRequest>>, ApiError> {
    let request = ServiceRequest::find_by_id(&state.db.pool, request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("request {} not found", request_id)))?;
    Ok(ResponseJson(ApiResponse::success(request)))
}

pub async fn create_request(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateServiceRequest>,
) -> Result<ResponseJson<ApiResponse<ServiceRequest>>, ApiError> {
    if payload.description.trim().is_empty() || payload.requested_by.trim().is_empty() {
        return Err(ApiError::Validation(
            "requested_by and description are required".into(),
        ));
    }
    if let Some(email) = payload.contact_email.as_deref()
        && !validate_email(email)
    {
        return Err(ApiError::Validation(format!("invalid email: {}", email)));
    }
    if Client::find_by_id(&state.db.pool, payload.client_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "client {} not found",
            payload.client_id
        )));
    }

    let request = ServiceRequest::create(&state.db.pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(request)))
}

/// Triage transition. Terminal states are frozen and resolving requires a
/// resolution note.
pub async fn update_status(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateStatusRequest>,
) -> Result<ResponseJson<ApiResponse<ServiceRequest>>, ApiError> {
    let request = ServiceRequest::find_by_id(&state.db.pool, request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("request {} not found", request_id)))?;

    if request.status.is_terminal() {
        return Err(ApiError::Conflict(format!(
            "request {} is already {}",
            request_id, request.status
        )));
    }
    if payload.status == RequestStatus::Resolved
        && payload
            .resolution_note
            .as_deref()
            .is_none_or(|n| n.trim().is_empty())
    {
        return Err(ApiError::Validation(
            "resolution_note is required when resolving".into(),
        ));
    }

    let request = ServiceRequest::update_status(
        &state.db.pool,
        request_id,
        payload.status,
        payload.resolution_note.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("request {} not found", request_id)))?;
    Ok(ResponseJson(ApiResponse::success(request)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/service-requests", get(list_requests).post(create_request))
        .route("/service-requests/{request_id}", get(get_request))
        .route("/service-requests/{request_id}/status", post(update_status))
}
