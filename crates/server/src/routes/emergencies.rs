//! Routes for emergency-visit incident reporting.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    elevator::Elevator,
    emergency::{CreateEmergencyVisit, EmergencyStatus, EmergencyVisit, UpdateEmergencyVisit},
};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListEmergenciesQuery {
    pub status: Option<EmergencyStatus>,
}

pub async fn list_emergencies(
    State(state): State<AppState>,
    Query(query): Query<ListEmergenciesQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<EmergencyVisit>>>, ApiError> {
    let visits = EmergencyVisit::find_all(&state.db.pool, query.status).await?;
    Ok(ResponseJson(ApiResponse::success(visits)))
}

pub async fn get_emergency(
    State(state): State<AppState>,
    Path(emergency_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<EmergencyVisit>>, ApiError> {
    let visit = EmergencyVisit::find_by_id(&state.db.pool, emergency_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("emergency {} not found", emergency_id)))?;
    Ok(ResponseJson(ApiResponse::success(visit)))
}

pub async fn create_emergency(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateEmergencyVisit>,
) -> Result<ResponseJson<ApiResponse<EmergencyVisit>>, ApiError> {
    if payload.fault_description.trim().is_empty() {
        return Err(ApiError::Validation("fault_description is required".into()));
    }
    if Elevator::find_by_id(&state.db.pool, payload.elevator_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "elevator {} not found",
            payload.elevator_id
        )));
    }

    let visit = EmergencyVisit::create(&state.db.pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(visit)))
}

pub async fn update_emergency(
    State(state): State<AppState>,
    Path(emergency_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateEmergencyVisit>,
) -> Result<ResponseJson<ApiResponse<EmergencyVisit>>, ApiError> {
    let visit = EmergencyVisit::update(&state.db.pool, emergency_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("emergency {} not found", emergency_id)))?;
    Ok(ResponseJson(ApiResponse::success(visit)))
}

pub async fn resolve_emergency(
    State(state): State<AppState>,
    Path(emergency_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<EmergencyVisit>>, ApiError> {
    let visit = EmergencyVisit::find_by_id(&state.db.pool, emergency_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("emergency {} not found", emergency_id)))?;
    if visit.actions_taken.as_deref().is_none_or(|a| a.trim().is_empty()) {
        return Err(ApiError::Validation(
            "actions_taken must be recorded before resolving".into(),
        ));
    }

    let visit = EmergencyVisit::resolve(&state.db.pool, emergency_id)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!("emergency {} is not open", emergency_id))
        })?;
    Ok(ResponseJson(ApiResponse::success(visit)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/emergencies", get(list_emergencies).post(create_emergency))
        .route(
            "/emergencies/{emergency_id}",
            get(get_emergency).put(update_emergency),
        )
        .route("/emergencies/{emergency_id}/resolve", post(resolve_emergency))
}
