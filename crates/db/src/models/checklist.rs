use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Recurrence tag on a maintenance-inspection question.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "question_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuestionFrequency {
    #[default]
    Monthly,
    Quarterly,
    Semestral,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ChecklistQuestion {
    pub id: Uuid,
    pub sort_order: i64,
    pub category: String,
    pub text: String,
    pub frequency: QuestionFrequency,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateChecklistQuestion {
    pub sort_order: i64,
    pub category: String,
    pub text: String,
    pub frequency: QuestionFrequency,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateChecklistQuestion {
    pub sort_order: Option<i64>,
    pub category: Option<String>,
    pub text: Option<String>,
    pub frequency: Option<QuestionFrequency>,
    pub active: Option<bool>,
}

impl ChecklistQuestion {
    pub async fn find_all_active(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM checklist_questions WHERE active = TRUE ORDER BY sort_order ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM checklist_questions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateChecklistQuestion,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO checklist_questions (id, sort_order, category, text, frequency)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.sort_order)
        .bind(&data.category)
        .bind(&data.text)
        .bind(data.frequency)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateChecklistQuestion,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE checklist_questions SET
                 sort_order = COALESCE($2, sort_order),
                 category = COALESCE($3, category),
                 text = COALESCE($4, text),
                 frequency = COALESCE($5, frequency),
                 active = COALESCE($6, active)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.sort_order)
        .bind(&data.category)
        .bind(&data.text)
        .bind(data.frequency)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }
}
