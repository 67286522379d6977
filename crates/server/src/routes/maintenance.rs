//! Routes for maintenance visits and their checklist answers.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::maintenance::{
    AnswerResult, AnsweredQuestion, ChecklistAnswer, MaintenanceVisit,
};
use serde::{Deserialize, Serialize};
use services::services::checklist::ChecklistService;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListVisitsQuery {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub elevator_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct VisitDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub visit: MaintenanceVisit,
    pub answers: Vec<AnsweredQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct StartVisitRequest {
    pub technician_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AnswerPayload {
    pub question_id: Uuid,
    pub result: AnswerResult,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CompleteVisitRequest {
    pub signature_name: String,
    pub observations: Option<String>,
}

pub async fn list_visits(
    State(state): State<AppState>,
    Query(query): Query<ListVisitsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<MaintenanceVisit>>>, ApiError> {
    let visits = match (query.elevator_id, query.year, query.month) {
        (Some(elevator_id), _, _) => {
            MaintenanceVisit::find_by_elevator_id(&state.db.pool, elevator_id).await?
        }
        (None, Some(year), Some(month)) => {
            MaintenanceVisit::find_by_period(&state.db.pool, year, month).await?
        }
        _ => {
            return Err(ApiError::Validation(
                "provide elevator_id or year and month".into(),
            ));
        }
    };
    Ok(ResponseJson(ApiResponse::success(visits)))
}

pub async fn get_visit(
    State(state): State<AppState>,
    Path(visit_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<VisitDetail>>, ApiError> {
    let visit = MaintenanceVisit::find_by_id(&state.db.pool, visit_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("visit {} not found", visit_id)))?;
    let answers = ChecklistAnswer::answered_questions(&state.db.pool, visit_id).await?;
    Ok(ResponseJson(ApiResponse::success(VisitDetail {
        visit,
        answers,
    })))
}

pub async fn start_visit(
    State(state): State<AppState>,
    Path(visit_id): Path<Uuid>,
    axum::Json(payload): axum::Json<StartVisitRequest>,
) -> Result<ResponseJson<ApiResponse<MaintenanceVisit>>, ApiError> {
    if payload.technician_name.trim().is_empty() {
        return Err(ApiError::Validation("technician_name is required".into()));
    }
    let visit = MaintenanceVisit::start(&state.db.pool, visit_id, &payload.technician_name)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!("visit {} is not in scheduled state", visit_id))
        })?;
    Ok(ResponseJson(ApiResponse::success(visit)))
}

/// Upsert a batch of answers. Each (visit, question) pair keeps only the
/// latest answer, matching the field client's autosave behavior.
pub async fn save_answers(
    State(state): State<AppState>,
    Path(visit_id): Path<Uuid>,
    axum::Json(payload): axum::Json<Vec<AnswerPayload>>,
) -> Result<ResponseJson<ApiResponse<Vec<ChecklistAnswer>>>, ApiError> {
    if MaintenanceVisit::find_by_id(&state.db.pool, visit_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("visit {} not found", visit_id)));
    }

    let mut saved = Vec::with_capacity(payload.len());
    for answer in &payload {
        saved.push(
            ChecklistAnswer::upsert(
                &state.db.pool,
                visit_id,
                answer.question_id,
                answer.result,
                answer.note.as_deref(),
                Uuid::new_v4(),
            )
            .await?,
        );
    }
    Ok(ResponseJson(ApiResponse::success(saved)))
}

pub async fn complete_visit(
    State(state): State<AppState>,
    Path(visit_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CompleteVisitRequest>,
) -> Result<ResponseJson<ApiResponse<MaintenanceVisit>>, ApiError> {
    if payload.signature_name.trim().is_empty() {
        return Err(ApiError::Validation("signature_name is required".into()));
    }
    let visit = MaintenanceVisit::find_by_id(&state.db.pool, visit_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("visit {} not found", visit_id)))?;

    // Every question due this month must be answered before closing.
    let missing = ChecklistService::new(state.db.pool.clone())
        .unanswered_questions(visit_id, visit.month as u32)
        .await?;
    if !missing.is_empty() {
        return Err(ApiError::Validation(format!(
            "{} checklist questions are still unanswered",
            missing.len()
        )));
    }

    let visit = MaintenanceVisit::complete(
        &state.db.pool,
        visit_id,
        payload.observations.as_deref(),
        &payload.signature_name,
    )
    .await?
    .ok_or_else(|| {
        ApiError::Conflict(format!("visit {} is not in progress", visit_id))
    })?;
    Ok(ResponseJson(ApiResponse::success(visit)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/maintenance/visits", get(list_visits))
        .route("/maintenance/visits/{visit_id}", get(get_visit))
        .route("/maintenance/visits/{visit_id}/start", post(start_visit))
        .route("/maintenance/visits/{visit_id}/answers", post(save_answers))
        .route(
            "/maintenance/visits/{visit_id}/complete",
            post(complete_visit),
        )
}
