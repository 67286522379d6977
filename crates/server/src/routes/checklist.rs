//! Routes for the checklist question catalog.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::checklist::{
    ChecklistQuestion, CreateChecklistQuestion, UpdateChecklistQuestion,
};
use serde::Deserialize;
use services::services::checklist::ChecklistService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListQuestionsQuery {
    /// When set, only questions due in this calendar month are returned.
    pub month: Option<u32>,
}

pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ChecklistQuestion>>>, ApiError> {
    let questions = match query.month {
        Some(month) => {
            ChecklistService::new(state.db.pool.clone())
                .applicable_questions(month)
                .await?
        }
        None => ChecklistQuestion::find_all_active(&state.db.pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(questions)))
}

pub async fn create_question(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateChecklistQuestion>,
) -> Result<ResponseJson<ApiResponse<ChecklistQuestion>>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::Validation("text is required".into()));
    }
    let question = ChecklistQuestion::create(&state.db.pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(question)))
}

pub async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateChecklistQuestion>,
) -> Result<ResponseJson<ApiResponse<ChecklistQuestion>>, ApiError> {
    let question = ChecklistQuestion::update(&state.db.pool, question_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("question {} not found", question_id)))?;
    Ok(ResponseJson(ApiResponse::success(question)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/checklist/questions",
            get(list_questions).post(create_question),
        )
        .route("/checklist/questions/{question_id}", axum::routing::put(update_question))
}
