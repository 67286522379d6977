use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "elevator_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ElevatorStatus {
    #[default]
    Active,
    OutOfService,
    Decommissioned,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Elevator {
    pub id: Uuid,
    pub building_id: Uuid,
    pub code: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub capacity_kg: Option<i64>,
    pub floors: Option<i64>,
    pub status: ElevatorStatus,
    pub installed_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Elevator row joined with its building and client names, for list views.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ElevatorWithLocation {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub elevator: Elevator,
    pub building_name: String,
    pub client_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateElevator {
    pub code: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub capacity_kg: Option<i64>,
    pub floors: Option<i64>,
    pub installed_at: Option<NaiveDate>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateElevator {
    pub code: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub capacity_kg: Option<i64>,
    pub floors: Option<i64>,
    pub status: Option<ElevatorStatus>,
    pub installed_at: Option<NaiveDate>,
}

impl Elevator {
    pub async fn find_all_with_location(pool: &SqlitePool) -> Result<Vec<ElevatorWithLocation>, sqlx::Error> {
        sqlx::query_as::<_, ElevatorWithLocation>(
            r#"SELECT e.*, b.name AS building_name, c.name AS client_name
               FROM elevators e
               JOIN buildings b ON b.id = e.building_id
               JOIN clients c ON c.id = b.client_id
               ORDER BY c.name, b.name, e.code"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_building_id(pool: &SqlitePool, building_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM elevators WHERE building_id = $1 ORDER BY code ASC",
        )
        .bind(building_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM elevators WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_active_ids(pool: &SqlitePool) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM elevators WHERE status = 'active'")
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn create(
        pool: &SqlitePool,
        building_id: Uuid,
        data: &CreateElevator,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO elevators (id, building_id, code, brand, model, serial_number, capacity_kg, floors, installed_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(id)
        .bind(building_id)
        .bind(&data.code)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(data.capacity_kg)
        .bind(data.floors)
        .bind(data.installed_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateElevator) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE elevators SET
                 code = COALESCE($2, code),
                 brand = COALESCE($3, brand),
                 model = COALESCE($4, model),
                 serial_number = COALESCE($5, serial_number),
                 capacity_kg = COALESCE($6, capacity_kg),
                 floors = COALESCE($7, floors),
                 status = COALESCE($8, status),
                 installed_at = COALESCE($9, installed_at),
                 updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.code)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(data.capacity_kg)
        .bind(data.floors)
        .bind(&data.status)
        .bind(data.installed_at)
        .fetch_optional(pool)
        .await
    }
}
