use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "work_order_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkOrderKind {
    #[default]
    Billable,
    Internal,
    Warranty,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "work_order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkOrderStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct WorkOrder {
    pub id: Uuid,
    pub client_id: Uuid,
    pub elevator_id: Option<Uuid>,
    pub folio: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: WorkOrderKind,
    pub status: WorkOrderStatus,
    pub quote_net: Option<i64>,
    pub quote_tax: Option<i64>,
    pub quote_total: Option<i64>,
    pub quote_valid_until: Option<NaiveDate>,
    pub quote_terms: Option<String>,
    pub warranty_months: Option<i64>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateWorkOrder {
    pub client_id: Uuid,
    pub elevator_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub kind: Option<WorkOrderKind>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateWorkOrder {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<WorkOrderKind>,
}

impl WorkOrder {
    /// Next folio for the given year, `OT-<year>-<seq>` with a zero-padded
    /// sequence starting at 1. The sequence is one past the highest already
    /// allocated, so gaps from deleted or imported rows never cause reuse.
    pub async fn next_folio(pool: &SqlitePool, year: i32) -> Result<String, sqlx::Error> {
        let prefix = format!("OT-{}-", year);
        let max_seq: i64 = sqlx::query_scalar(
            r#"SELECT COALESCE(MAX(CAST(substr(folio, length($1) + 1) AS INTEGER)), 0)
               FROM work_orders WHERE folio LIKE $1 || '%'"#,
        )
        .bind(&prefix)
        .fetch_one(pool)
        .await?;
        Ok(format!("{}{:04}", prefix, max_seq + 1))
    }

    pub async fn find_all(
        pool: &SqlitePool,
        status: Option<WorkOrderStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM work_orders WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>("SELECT * FROM work_orders ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM work_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Inserts the order with a freshly allocated folio. Two concurrent
    /// creates can pick the same sequence number, in which case the folio's
    /// UNIQUE constraint trips and the insert retries with the next one.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateWorkOrder,
        year: i32,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let kind = data.kind.unwrap_or_default();
        let mut attempts = 0;
        loop {
            let folio = Self::next_folio(pool, year).await?;
            let inserted = sqlx::query_as::<_, Self>(
                r#"INSERT INTO work_orders (id, client_id, elevator_id, folio, title, description, kind)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)
                   RETURNING *"#,
            )
            .bind(id)
            .bind(data.client_id)
            .bind(data.elevator_id)
            .bind(&folio)
            .bind(&data.title)
            .bind(&data.description)
            .bind(kind)
            .fetch_one(pool)
            .await;
            match inserted {
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() && attempts < 3 => {
                    attempts += 1;
                }
                other => return other,
            }
        }
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateWorkOrder,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE work_orders SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 kind = COALESCE($4, kind),
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'draft'
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.kind)
        .fetch_optional(pool)
        .await
    }

    /// Quotation fields are only writable while the order is a draft.
    pub async fn set_quotation(
        pool: &SqlitePool,
        id: Uuid,
        net: i64,
        tax: i64,
        total: i64,
        valid_until: Option<NaiveDate>,
        terms: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE work_orders SET
                 quote_net = $2,
                 quote_tax = $3,
                 quote_total = $4,
                 quote_valid_until = $5,
                 quote_terms = $6,
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'draft'
               RETURNING *"#,
        )
        .bind(id)
        .bind(net)
        .bind(tax)
        .bind(total)
        .bind(valid_until)
        .bind(terms)
        .fetch_optional(pool)
        .await
    }

    pub async fn transition(
        pool: &SqlitePool,
        id: Uuid,
        from: &[WorkOrderStatus],
        to: WorkOrderStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let from_list: Vec<String> = from.iter().map(|s| s.to_string()).collect();
        let placeholders: Vec<String> =
            (0..from_list.len()).map(|i| format!("${}", i + 3)).collect();
        let sql = format!(
            r#"UPDATE work_orders SET
                 status = $2,
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status IN ({})
               RETURNING *"#,
            placeholders.join(", ")
        );
        let mut query = sqlx::query_as::<_, Self>(&sql).bind(id).bind(to);
        for status in &from_list {
            query = query.bind(status);
        }
        query.fetch_optional(pool).await
    }

    pub async fn approve(
        pool: &SqlitePool,
        id: Uuid,
        approved_by: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE work_orders SET
                 status = 'approved',
                 approved_by = $2,
                 approved_at = datetime('now', 'subsec'),
                 rejection_reason = NULL,
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'pending_approval'
               RETURNING *"#,
        )
        .bind(id)
        .bind(approved_by)
        .fetch_optional(pool)
        .await
    }

    /// Rejection sends the order back to draft so the quotation can be reworked.
    pub async fn reject(
        pool: &SqlitePool,
        id: Uuid,
        reason: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE work_orders SET
                 status = 'draft',
                 rejection_reason = $2,
                 approved_by = NULL,
                 approved_at = NULL,
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'pending_approval'
               RETURNING *"#,
        )
        .bind(id)
        .bind(reason)
        .fetch_optional(pool)
        .await
    }

    pub async fn complete(
        pool: &SqlitePool,
        id: Uuid,
        warranty_months: Option<i64>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE work_orders SET
                 status = 'completed',
                 warranty_months = COALESCE($2, warranty_months),
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'in_progress'
               RETURNING *"#,
        )
        .bind(id)
        .bind(warranty_months)
        .fetch_optional(pool)
        .await
    }
}
