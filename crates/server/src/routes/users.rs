//! Routes for user provisioning. Guarded operations resolve the caller from
//! the `X-Actor-Id` header; role rules live in the provisioning service.

use axum::{
    Router,
    extract::{Path, State},
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::{UserAuditLog, UserProfile, UserRole};
use serde::{Deserialize, Serialize};
use services::services::provisioning::{CreateUserRequest, ProvisioningService};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

fn actor_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(|| ApiError::Forbidden("missing or malformed X-Actor-Id header".into()))
}

pub async fn provision_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<CreateUserRequest>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, ApiError> {
    let actor = actor_id(&headers)?;
    let user = ProvisioningService::new(state.db.pool.clone())
        .create_user(actor, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ResponseJson<ApiResponse<Vec<UserProfile>>>, ApiError> {
    actor_id(&headers)?;
    let users = UserProfile::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let actor = actor_id(&headers)?;
    ProvisioningService::new(state.db.pool.clone())
        .deactivate_user(actor, user_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn change_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
    axum::Json(payload): axum::Json<ChangeRoleRequest>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, ApiError> {
    let actor = actor_id(&headers)?;
    let user = ProvisioningService::new(state.db.pool.clone())
        .change_role(actor, user_id, payload.role)
        .await?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn audit_log(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ResponseJson<ApiResponse<Vec<UserAuditLog>>>, ApiError> {
    actor_id(&headers)?;
    let entries = UserAuditLog::find_recent(&state.db.pool, 100).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(provision_user))
        .route("/users/{user_id}/deactivate", post(deactivate_user))
        .route("/users/{user_id}/role", post(change_role))
        .route("/users/audit", get(audit_log))
}
