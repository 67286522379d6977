use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "request_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    InReview,
    Scheduled,
    Resolved,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub elevator_id: Option<Uuid>,
    pub requested_by: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub description: String,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub escalated: bool,
    pub resolution_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateServiceRequest {
    pub client_id: Uuid,
    pub elevator_id: Option<Uuid>,
    pub requested_by: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub description: String,
    pub priority: Option<RequestPriority>,
}

impl ServiceRequest {
    pub async fn find_all(
        pool: &SqlitePool,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM service_requests WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM service_requests ORDER BY created_at DESC",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM service_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateServiceRequest,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let priority = data.priority.unwrap_or_default();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO service_requests
                 (id, client_id, elevator_id, requested_by, contact_email, contact_phone, description, priority)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.client_id)
        .bind(data.elevator_id)
        .bind(&data.requested_by)
        .bind(&data.contact_email)
        .bind(&data.contact_phone)
        .bind(&data.description)
        .bind(priority)
        .fetch_one(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: RequestStatus,
        resolution_note: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE service_requests SET
                 status = $2,
                 resolution_note = COALESCE($3, resolution_note),
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(status)
        .bind(resolution_note)
        .fetch_optional(pool)
        .await
    }

    /// Pending requests created before `cutoff` that have not been flagged yet.
    /// Both sides go through `datetime()` so the stored text and the bound
    /// value compare as instants rather than raw strings.
    pub async fn find_stale_pending(
        pool: &SqlitePool,
        priority: RequestPriority,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT * FROM service_requests
               WHERE status = 'pending'
                 AND priority = $1
                 AND escalated = FALSE
                 AND datetime(created_at) < datetime($2)
               ORDER BY created_at ASC"#,
        )
        .bind(priority)
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_escalated(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_requests SET escalated = TRUE, updated_at = datetime('now', 'subsec') WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
