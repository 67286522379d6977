//! PDF report endpoints. These return raw `application/pdf` bytes rather
//! than the JSON envelope.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use services::services::pdf;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn pdf_response(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

pub async fn maintenance_report(
    State(state): State<AppState>,
    Path(visit_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let bytes = pdf::maintenance::render(&state.db.pool, visit_id).await?;
    Ok(pdf_response(
        &format!("maintenance-{}.pdf", visit_id),
        bytes,
    ))
}

pub async fn emergency_report(
    State(state): State<AppState>,
    Path(emergency_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let bytes = pdf::emergency::render(&state.db.pool, emergency_id).await?;
    Ok(pdf_response(
        &format!("emergency-{}.pdf", emergency_id),
        bytes,
    ))
}

pub async fn work_order_report(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let bytes = pdf::work_order::render(&state.db.pool, order_id).await?;
    Ok(pdf_response(&format!("work-order-{}.pdf", order_id), bytes))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/maintenance/{visit_id}", get(maintenance_report))
        .route("/reports/emergency/{emergency_id}", get(emergency_report))
        .route("/reports/work-order/{order_id}", get(work_order_report))
}
