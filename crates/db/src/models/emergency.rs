use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "emergency_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmergencyStatus {
    #[default]
    Open,
    Resolved,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct EmergencyVisit {
    pub id: Uuid,
    pub elevator_id: Uuid,
    pub reported_at: DateTime<Utc>,
    pub attended_at: Option<DateTime<Utc>>,
    pub technician_name: Option<String>,
    pub fault_description: String,
    pub actions_taken: Option<String>,
    pub parts_used: Option<String>,
    pub status: EmergencyStatus,
    pub signature_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateEmergencyVisit {
    pub elevator_id: Uuid,
    pub reported_at: Option<DateTime<Utc>>,
    pub technician_name: Option<String>,
    pub fault_description: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateEmergencyVisit {
    pub technician_name: Option<String>,
    pub fault_description: Option<String>,
    pub actions_taken: Option<String>,
    pub parts_used: Option<String>,
    pub signature_name: Option<String>,
}

impl EmergencyVisit {
    pub async fn find_all(
        pool: &SqlitePool,
        status: Option<EmergencyStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM emergency_visits WHERE status = $1 ORDER BY reported_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM emergency_visits ORDER BY reported_at DESC",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM emergency_visits WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateEmergencyVisit,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let reported_at = data.reported_at.unwrap_or_else(Utc::now);
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO emergency_visits (id, elevator_id, reported_at, technician_name, fault_description)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.elevator_id)
        .bind(reported_at)
        .bind(&data.technician_name)
        .bind(&data.fault_description)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateEmergencyVisit,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE emergency_visits SET
                 technician_name = COALESCE($2, technician_name),
                 fault_description = COALESCE($3, fault_description),
                 actions_taken = COALESCE($4, actions_taken),
                 parts_used = COALESCE($5, parts_used),
                 signature_name = COALESCE($6, signature_name),
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.technician_name)
        .bind(&data.fault_description)
        .bind(&data.actions_taken)
        .bind(&data.parts_used)
        .bind(&data.signature_name)
        .fetch_optional(pool)
        .await
    }

    /// Close the incident. `attended_at` is stamped only if it was never set.
    pub async fn resolve(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE emergency_visits SET
                 status = 'resolved',
                 attended_at = COALESCE(attended_at, datetime('now', 'subsec')),
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'open'
               RETURNING *"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
