//! Monthly maintenance calendar: grid construction, month publishing and
//! the per-elevator overview.

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use db::models::{
    elevator::Elevator,
    maintenance::{MaintenanceVisit, MonthOverviewRow, VisitStatus},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid period {year}-{month}")]
    InvalidPeriod { year: i32, month: u32 },
}

/// A visit pinned to a grid cell.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CellVisit {
    pub visit_id: Uuid,
    pub elevator_id: Uuid,
    pub status: VisitStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub visits: Vec<CellVisit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Leading cells borrowed from the previous month (Monday-first).
    pub adjusted_start_day: u32,
    pub cells: Vec<CalendarCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PublishResult {
    pub created: usize,
    pub skipped: usize,
}

/// Build the 6x7 Monday-first grid for a month. Always exactly 42 cells;
/// the first `adjusted_start_day` cells fall in the previous month.
pub fn build_month_grid(year: i32, month: u32, today: NaiveDate) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let adjusted_start_day = first.weekday().num_days_from_monday();
    let grid_start = first - Duration::days(adjusted_start_day as i64);

    let cells = (0..42)
        .map(|offset| {
            let date = grid_start + Duration::days(offset);
            let in_month = date.year() == year && date.month() == month;
            CalendarCell {
                date,
                in_month,
                // Borrowed cells never carry the today marker, even when the
                // date matches.
                is_today: in_month && date == today,
                visits: Vec::new(),
            }
        })
        .collect();

    Some(MonthGrid {
        year,
        month,
        adjusted_start_day,
        cells,
    })
}

/// Weekdays (Mon-Fri) of the month starting at `first`, in order. Used to
/// spread published visits across the month instead of piling them on day one.
fn working_days(first: NaiveDate) -> Vec<NaiveDate> {
    let month = first.month();
    let mut days = Vec::new();
    let mut d = first;
    while d.month() == month {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(d);
        }
        d += Duration::days(1);
    }
    days
}

pub struct CalendarService {
    pool: SqlitePool,
}

impl CalendarService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn check_period(year: i32, month: u32) -> Result<(), CalendarError> {
        if !(1..=12).contains(&month) || !(2000..=2100).contains(&year) {
            return Err(CalendarError::InvalidPeriod { year, month });
        }
        Ok(())
    }

    /// The month grid with each scheduled visit attached to its cell.
    pub async fn month_grid(&self, year: i32, month: u32) -> Result<MonthGrid, CalendarError> {
        Self::check_period(year, month)?;
        let today = Utc::now().date_naive();
        let mut grid = build_month_grid(year, month, today)
            .ok_or(CalendarError::InvalidPeriod { year, month })?;

        let visits = MaintenanceVisit::find_by_period(&self.pool, year as i64, month as i64).await?;
        for visit in visits {
            if let Some(cell) = grid.cells.iter_mut().find(|c| c.date == visit.scheduled_date) {
                cell.visits.push(CellVisit {
                    visit_id: visit.id,
                    elevator_id: visit.elevator_id,
                    status: visit.status,
                });
            }
        }

        Ok(grid)
    }

    /// Create a scheduled visit for every active elevator that does not have
    /// one in the period yet. Existing visits are left untouched, so
    /// republishing a month is safe.
    pub async fn publish_month(&self, year: i32, month: u32) -> Result<PublishResult, CalendarError> {
        Self::check_period(year, month)?;
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(CalendarError::InvalidPeriod { year, month })?;
        let elevator_ids = Elevator::find_active_ids(&self.pool).await?;
        let days = working_days(first);

        let mut created = 0;
        let mut skipped = 0;
        for (i, elevator_id) in elevator_ids.iter().enumerate() {
            let existing = MaintenanceVisit::find_by_elevator_period(
                &self.pool,
                *elevator_id,
                year as i64,
                month as i64,
            )
            .await?;
            if existing.is_some() {
                skipped += 1;
                continue;
            }
            let scheduled_date = days[i % days.len()];
            MaintenanceVisit::create_scheduled(
                &self.pool,
                *elevator_id,
                year as i64,
                month as i64,
                scheduled_date,
                Uuid::new_v4(),
            )
            .await?;
            created += 1;
        }

        info!(year, month, created, skipped, "calendar month published");
        Ok(PublishResult { created, skipped })
    }

    /// Per-elevator rows for the period, with visit state where one exists.
    pub async fn month_overview(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthOverviewRow>, CalendarError> {
        Self::check_period(year, month)?;
        Ok(MaintenanceVisit::month_overview(&self.pool, year as i64, month as i64).await?)
    }
}
