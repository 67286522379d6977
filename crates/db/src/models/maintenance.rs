use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::checklist::QuestionFrequency;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "visit_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisitStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Missed,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display,
)]
#[sqlx(type_name = "answer_result", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnswerResult {
    Ok,
    Fail,
    NotApplicable,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct MaintenanceVisit {
    pub id: Uuid,
    pub elevator_id: Uuid,
    pub year: i64,
    pub month: i64,
    pub scheduled_date: NaiveDate,
    pub status: VisitStatus,
    pub technician_name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub observations: Option<String>,
    pub signature_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ChecklistAnswer {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub question_id: Uuid,
    pub result: AnswerResult,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Answer joined with its question, for report rendering and detail views.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct AnsweredQuestion {
    pub question_id: Uuid,
    pub sort_order: i64,
    pub category: String,
    pub text: String,
    pub frequency: QuestionFrequency,
    pub result: AnswerResult,
    pub note: Option<String>,
}

/// One row per active elevator for a period, with the visit state if one is
/// scheduled. Replaces the hosted backend's monthly calendar view.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct MonthOverviewRow {
    pub elevator_id: Uuid,
    pub elevator_code: String,
    pub building_name: String,
    pub client_name: String,
    pub visit_id: Option<Uuid>,
    pub scheduled_date: Option<NaiveDate>,
    pub status: Option<VisitStatus>,
    pub technician_name: Option<String>,
}

impl MaintenanceVisit {
    pub async fn month_overview(
        pool: &SqlitePool,
        year: i64,
        month: i64,
    ) -> Result<Vec<MonthOverviewRow>, sqlx::Error> {
        sqlx::query_as::<_, MonthOverviewRow>(
            r#"SELECT e.id AS elevator_id, e.code AS elevator_code,
                      b.name AS building_name, c.name AS client_name,
                      v.id AS visit_id, v.scheduled_date, v.status, v.technician_name
               FROM elevators e
               JOIN buildings b ON b.id = e.building_id
               JOIN clients c ON c.id = b.client_id
               LEFT JOIN maintenance_visits v
                 ON v.elevator_id = e.id AND v.year = $1 AND v.month = $2
               WHERE e.status = 'active'
               ORDER BY c.name, b.name, e.code"#,
        )
        .bind(year)
        .bind(month)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_period(
        pool: &SqlitePool,
        year: i64,
        month: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM maintenance_visits WHERE year = $1 AND month = $2 ORDER BY scheduled_date ASC",
        )
        .bind(year)
        .bind(month)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_elevator_id(
        pool: &SqlitePool,
        elevator_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM maintenance_visits WHERE elevator_id = $1 ORDER BY year DESC, month DESC",
        )
        .bind(elevator_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM maintenance_visits WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_elevator_period(
        pool: &SqlitePool,
        elevator_id: Uuid,
        year: i64,
        month: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM maintenance_visits WHERE elevator_id = $1 AND year = $2 AND month = $3",
        )
        .bind(elevator_id)
        .bind(year)
        .bind(month)
        .fetch_optional(pool)
        .await
    }

    pub async fn create_scheduled(
        pool: &SqlitePool,
        elevator_id: Uuid,
        year: i64,
        month: i64,
        scheduled_date: NaiveDate,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO maintenance_visits (id, elevator_id, year, month, scheduled_date)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(elevator_id)
        .bind(year)
        .bind(month)
        .bind(scheduled_date)
        .fetch_one(pool)
        .await
    }

    pub async fn start(
        pool: &SqlitePool,
        id: Uuid,
        technician_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE maintenance_visits SET
                 status = 'in_progress',
                 technician_name = $2,
                 started_at = datetime('now', 'subsec'),
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'scheduled'
               RETURNING *"#,
        )
        .bind(id)
        .bind(technician_name)
        .fetch_optional(pool)
        .await
    }

    pub async fn complete(
        pool: &SqlitePool,
        id: Uuid,
        observations: Option<&str>,
        signature_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE maintenance_visits SET
                 status = 'completed',
                 completed_at = datetime('now', 'subsec'),
                 observations = $2,
                 signature_name = $3,
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'in_progress'
               RETURNING *"#,
        )
        .bind(id)
        .bind(observations)
        .bind(signature_name)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_missed_before(
        pool: &SqlitePool,
        cutoff: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE maintenance_visits SET
                 status = 'missed',
                 updated_at = datetime('now', 'subsec')
               WHERE status = 'scheduled' AND scheduled_date < $1"#,
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

impl ChecklistAnswer {
    /// Upsert one answer per (visit, question). Last write wins, matching
    /// the autosave behavior of the field client.
    pub async fn upsert(
        pool: &SqlitePool,
        visit_id: Uuid,
        question_id: Uuid,
        result: AnswerResult,
        note: Option<&str>,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO checklist_answers (id, visit_id, question_id, result, note)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT(visit_id, question_id) DO UPDATE SET
                 result = excluded.result,
                 note = excluded.note,
                 updated_at = datetime('now', 'subsec')
               RETURNING *"#,
        )
        .bind(id)
        .bind(visit_id)
        .bind(question_id)
        .bind(result)
        .bind(note)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_visit_id(pool: &SqlitePool, visit_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM checklist_answers WHERE visit_id = $1")
            .bind(visit_id)
            .fetch_all(pool)
            .await
    }

    pub async fn answered_questions(
        pool: &SqlitePool,
        visit_id: Uuid,
    ) -> Result<Vec<AnsweredQuestion>, sqlx::Error> {
        sqlx::query_as::<_, AnsweredQuestion>(
            r#"SELECT q.id AS question_id, q.sort_order, q.category, q.text, q.frequency,
                      a.result, a.note
               FROM checklist_answers a
               JOIN checklist_questions q ON q.id = a.question_id
               WHERE a.visit_id = $1
               ORDER BY q.sort_order ASC"#,
        )
        .bind(visit_id)
        .fetch_all(pool)
        .await
    }
}
