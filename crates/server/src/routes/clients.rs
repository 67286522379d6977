//! Routes for the client registry and its nested buildings.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::models::{
    building::{Building, CreateBuilding, UpdateBuilding},
    client::{Client, CreateClient, UpdateClient},
};
use serde::Deserialize;
use utils::{
    response::ApiResponse,
    validation::{normalize_rut, validate_email, validate_rut},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

fn check_client_fields(rut: Option<&str>, email: Option<&str>) -> Result<(), ApiError> {
    if let Some(rut) = rut
        && !validate_rut(rut)
    {
        return Err(ApiError::Validation(format!("invalid RUT: {}", rut)));
    }
    if let Some(email) = email
        && !validate_email(email)
    {
        return Err(ApiError::Validation(format!("invalid email: {}", email)));
    }
    Ok(())
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = Client::find_all(&state.db.pool, query.include_inactive).await?;
    Ok(ResponseJson(ApiResponse::success(clients)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let client = Client::find_by_id(&state.db.pool, client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("client {} not found", client_id)))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

pub async fn create_client(
    State(state): State<AppState>,
    axum::Json(mut payload): axum::Json<CreateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    check_client_fields(Some(&payload.rut), payload.email.as_deref())?;
    payload.rut = normalize_rut(&payload.rut);

    if Client::find_by_rut(&state.db.pool, &payload.rut).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "client with RUT {} already exists",
            payload.rut
        )));
    }

    let client = Client::create(&state.db.pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    axum::Json(mut payload): axum::Json<UpdateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    check_client_fields(payload.rut.as_deref(), payload.email.as_deref())?;
    if let Some(rut) = payload.rut.take() {
        payload.rut = Some(normalize_rut(&rut));
    }

    let client = Client::update(&state.db.pool, client_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("client {} not found", client_id)))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

pub async fn deactivate_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = Client::deactivate(&state.db.pool, client_id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(format!("client {} not found", client_id)));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn list_buildings(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Building>>>, ApiError> {
    let buildings = Building::find_by_client_id(&state.db.pool, client_id).await?;
    Ok(ResponseJson(ApiResponse::success(buildings)))
}

pub async fn create_building(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateBuilding>,
) -> Result<ResponseJson<ApiResponse<Building>>, ApiError> {
    if payload.name.trim().is_empty() || payload.address.trim().is_empty() {
        return Err(ApiError::Validation("name and address are required".into()));
    }
    if Client::find_by_id(&state.db.pool, client_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("client {} not found", client_id)));
    }

    let building = Building::create(&state.db.pool, client_id, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(building)))
}

pub async fn update_building(
    State(state): State<AppState>,
    Path(building_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateBuilding>,
) -> Result<ResponseJson<ApiResponse<Building>>, ApiError> {
    let building = Building::update(&state.db.pool, building_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("building {} not found", building_id)))?;
    Ok(ResponseJson(ApiResponse::success(building)))
}

pub async fn delete_building(
    State(state): State<AppState>,
    Path(building_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = Building::delete(&state.db.pool, building_id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(format!(
            "building {} not found",
            building_id
        )));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{client_id}",
            get(get_client).put(update_client).delete(deactivate_client),
        )
        .route(
            "/clients/{client_id}/buildings",
            get(list_buildings).post(create_building),
        )
        .route(
            "/buildings/{building_id}",
            delete(delete_building).put(update_building),
        )
}
