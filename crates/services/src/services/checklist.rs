//! Checklist question selection by recurrence and completion checks.

use db::models::{
    checklist::{ChecklistQuestion, QuestionFrequency},
    maintenance::ChecklistAnswer,
};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("month out of range: {0}")]
    InvalidMonth(u32),
}

/// Whether a question with the given recurrence is due in calendar month `m`.
/// Monthly questions are always due, quarterly ones in Mar/Jun/Sep/Dec,
/// semestral ones in Jun/Dec.
pub fn applies_in_month(frequency: QuestionFrequency, month: u32) -> bool {
    match frequency {
        QuestionFrequency::Monthly => true,
        QuestionFrequency::Quarterly => month % 3 == 0,
        QuestionFrequency::Semestral => month % 6 == 0,
    }
}

pub struct ChecklistService {
    pool: SqlitePool,
}

impl ChecklistService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active questions due in the given month, in checklist order.
    pub async fn applicable_questions(
        &self,
        month: u32,
    ) -> Result<Vec<ChecklistQuestion>, ChecklistError> {
        if !(1..=12).contains(&month) {
            return Err(ChecklistError::InvalidMonth(month));
        }
        let questions = ChecklistQuestion::find_all_active(&self.pool).await?;
        Ok(questions
            .into_iter()
            .filter(|q| applies_in_month(q.frequency, month))
            .collect())
    }

    /// Ids of questions due for the visit's month that have no answer yet.
    pub async fn unanswered_questions(
        &self,
        visit_id: Uuid,
        month: u32,
    ) -> Result<Vec<Uuid>, ChecklistError> {
        let applicable = self.applicable_questions(month).await?;
        let answers = ChecklistAnswer::find_by_visit_id(&self.pool, visit_id).await?;
        let answered: std::collections::HashSet<Uuid> =
            answers.into_iter().map(|a| a.question_id).collect();
        Ok(applicable
            .into_iter()
            .filter(|q| !answered.contains(&q.id))
            .map(|q| q.id)
            .collect())
    }
}
