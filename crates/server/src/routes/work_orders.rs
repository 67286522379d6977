//! Routes for work orders: quotation, approval workflow and execution.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::{Datelike, NaiveDate, Utc};
use db::models::{
    client::Client,
    work_order::{CreateWorkOrder, UpdateWorkOrder, WorkOrder, WorkOrderKind, WorkOrderStatus},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Chilean VAT applied to quoted net amounts.
const IVA_PERCENT: i64 = 19;

#[derive(Debug, Deserialize)]
pub struct ListWorkOrdersQuery {
    pub status: Option<WorkOrderStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct QuotationRequest {
    pub net: i64,
    pub valid_until: Option<NaiveDate>,
    pub terms: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApproveRequest {
    pub approved_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CompleteRequest {
    pub warranty_months: Option<i64>,
}

pub async fn list_work_orders(
    State(state): State<AppState>,
    Query(query): Query<ListWorkOrdersQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<WorkOrder>>>, ApiError> {
    let orders = WorkOrder::find_all(&state.db.pool, query.status).await?;
    Ok(ResponseJson(ApiResponse::success(orders)))
}

pub async fn get_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    let order = WorkOrder::find_by_id(&state.db.pool, order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("work order {} not found", order_id)))?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub async fn create_work_order(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateWorkOrder>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    if Client::find_by_id(&state.db.pool, payload.client_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "client {} not found",
            payload.client_id
        )));
    }

    let order =
        WorkOrder::create(&state.db.pool, &payload, Utc::now().year(), Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub async fn update_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateWorkOrder>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    let order = WorkOrder::update(&state.db.pool, order_id, &payload)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!("work order {} is not an editable draft", order_id))
        })?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// Set the quotation on a draft. Tax and total are computed here; the
/// payload only carries the net amount.
pub async fn set_quotation(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    axum::Json(payload): axum::Json<QuotationRequest>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    if payload.net <= 0 {
        return Err(ApiError::Validation("net amount must be positive".into()));
    }
    let tax = payload.net * IVA_PERCENT / 100;
    let total = payload.net + tax;

    let order = WorkOrder::set_quotation(
        &state.db.pool,
        order_id,
        payload.net,
        tax,
        total,
        payload.valid_until,
        payload.terms.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        ApiError::Conflict(format!("work order {} is not an editable draft", order_id))
    })?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub async fn submit_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    let order = WorkOrder::find_by_id(&state.db.pool, order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("work order {} not found", order_id)))?;

    // Billable orders cannot go to the client without a quotation.
    if order.kind == WorkOrderKind::Billable && order.quote_total.is_none() {
        return Err(ApiError::Validation(
            "billable work orders require a quotation before submission".into(),
        ));
    }

    let order = WorkOrder::transition(
        &state.db.pool,
        order_id,
        &[WorkOrderStatus::Draft],
        WorkOrderStatus::PendingApproval,
    )
    .await?
    .ok_or_else(|| ApiError::Conflict(format!("work order {} is not a draft", order_id)))?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub async fn approve_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    axum::Json(payload): axum::Json<ApproveRequest>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    if payload.approved_by.trim().is_empty() {
        return Err(ApiError::Validation("approved_by is required".into()));
    }
    let order = WorkOrder::approve(&state.db.pool, order_id, &payload.approved_by)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!("work order {} is not pending approval", order_id))
        })?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub async fn reject_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    axum::Json(payload): axum::Json<RejectRequest>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    if payload.reason.trim().is_empty() {
        return Err(ApiError::Validation("reason is required".into()));
    }
    let order = WorkOrder::reject(&state.db.pool, order_id, &payload.reason)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!("work order {} is not pending approval", order_id))
        })?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub async fn start_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    let order = WorkOrder::transition(
        &state.db.pool,
        order_id,
        &[WorkOrderStatus::Approved],
        WorkOrderStatus::InProgress,
    )
    .await?
    .ok_or_else(|| ApiError::Conflict(format!("work order {} is not approved", order_id)))?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub async fn complete_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CompleteRequest>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    let order = WorkOrder::complete(&state.db.pool, order_id, payload.warranty_months)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!("work order {} is not in progress", order_id))
        })?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub async fn cancel_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<WorkOrder>>, ApiError> {
    let order = WorkOrder::transition(
        &state.db.pool,
        order_id,
        &[
            WorkOrderStatus::Draft,
            WorkOrderStatus::PendingApproval,
            WorkOrderStatus::Approved,
            WorkOrderStatus::Rejected,
            WorkOrderStatus::InProgress,
        ],
        WorkOrderStatus::Cancelled,
    )
    .await?
    .ok_or_else(|| {
        ApiError::Conflict(format!("work order {} is already closed", order_id))
    })?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/work-orders", get(list_work_orders).post(create_work_order))
        .route(
            "/work-orders/{order_id}",
            get(get_work_order).put(update_work_order),
        )
        .route("/work-orders/{order_id}/quotation", post(set_quotation))
        .route("/work-orders/{order_id}/submit", post(submit_work_order))
        .route("/work-orders/{order_id}/approve", post(approve_work_order))
        .route("/work-orders/{order_id}/reject", post(reject_work_order))
        .route("/work-orders/{order_id}/start", post(start_work_order))
        .route("/work-orders/{order_id}/complete", post(complete_work_order))
        .route("/work-orders/{order_id}/cancel", post(cancel_work_order))
}
