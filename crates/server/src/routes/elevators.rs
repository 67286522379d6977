//! Routes for the elevator registry.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    building::Building,
    elevator::{CreateElevator, Elevator, ElevatorWithLocation, UpdateElevator},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn list_elevators(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<ElevatorWithLocation>>>, ApiError> {
    let elevators = Elevator::find_all_with_location(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(elevators)))
}

pub async fn get_elevator(
    State(state): State<AppState>,
    Path(elevator_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Elevator>>, ApiError> {
    let elevator = Elevator::find_by_id(&state.db.pool, elevator_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("elevator {} not found", elevator_id)))?;
    Ok(ResponseJson(ApiResponse::success(elevator)))
}

pub async fn list_building_elevators(
    State(state): State<AppState>,
    Path(building_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Elevator>>>, ApiError> {
    let elevators = Elevator::find_by_building_id(&state.db.pool, building_id).await?;
    Ok(ResponseJson(ApiResponse::success(elevators)))
}

pub async fn create_elevator(
    State(state): State<AppState>,
    Path(building_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateElevator>,
) -> Result<ResponseJson<ApiResponse<Elevator>>, ApiError> {
    if payload.code.trim().is_empty() {
        return Err(ApiError::Validation("code is required".into()));
    }
    if Building::find_by_id(&state.db.pool, building_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "building {} not found",
            building_id
        )));
    }

    let elevator =
        Elevator::create(&state.db.pool, building_id, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(elevator)))
}

pub async fn update_elevator(
    State(state): State<AppState>,
    Path(elevator_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateElevator>,
) -> Result<ResponseJson<ApiResponse<Elevator>>, ApiError> {
    let elevator = Elevator::update(&state.db.pool, elevator_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("elevator {} not found", elevator_id)))?;
    Ok(ResponseJson(ApiResponse::success(elevator)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/elevators", get(list_elevators))
        .route(
            "/elevators/{elevator_id}",
            get(get_elevator).put(update_elevator),
        )
        .route(
            "/buildings/{building_id}/elevators",
            get(list_building_elevators).post(create_elevator),
        )
}
