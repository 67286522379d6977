//! Monthly maintenance report: general info, the answered checklist grid,
//! signature block and, when present, an observations page.

use db::models::{
    building::Building,
    client::Client,
    elevator::Elevator,
    maintenance::{AnsweredQuestion, AnswerResult, ChecklistAnswer, MaintenanceVisit},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{Fonts, PageWriter, PdfError, margin, wrap_text};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn month_name(month: i64) -> &'static str {
    MONTH_NAMES
        .get((month - 1).clamp(0, 11) as usize)
        .unwrap_or(&"?")
}

fn result_label(result: AnswerResult) -> &'static str {
    match result {
        AnswerResult::Ok => "OK",
        AnswerResult::Fail => "FAIL",
        AnswerResult::NotApplicable => "N/A",
    }
}

pub async fn render(pool: &SqlitePool, visit_id: Uuid) -> Result<Vec<u8>, PdfError> {
    let visit = MaintenanceVisit::find_by_id(pool, visit_id)
        .await?
        .ok_or(PdfError::NotFound)?;
    let elevator = Elevator::find_by_id(pool, visit.elevator_id)
        .await?
        .ok_or(PdfError::NotFound)?;
    let building = Building::find_by_id(pool, elevator.building_id)
        .await?
        .ok_or(PdfError::NotFound)?;
    let client = Client::find_by_id(pool, building.client_id)
        .await?
        .ok_or(PdfError::NotFound)?;
    let answers = ChecklistAnswer::answered_questions(pool, visit_id).await?;

    render_report(&visit, &elevator, &building, &client, &answers)
}

fn render_report(
    visit: &MaintenanceVisit,
    elevator: &Elevator,
    building: &Building,
    client: &Client,
    answers: &[AnsweredQuestion],
) -> Result<Vec<u8>, PdfError> {
    let (mut page, fonts) = PageWriter::new_a4("Maintenance Report")?;
    let period = format!("{} {}", month_name(visit.month), visit.year);

    page.heading(
        "Preventive Maintenance Report",
        &format!("Period: {}", period),
        &fonts,
    );

    page.info_row("Client", &format!("{} ({})", client.name, client.rut), &fonts);
    page.info_row(
        "Building",
        &format!("{} - {}", building.name, building.address),
        &fonts,
    );
    page.info_row(
        "Elevator",
        &format!(
            "{} {} {}",
            elevator.code,
            elevator.brand.as_deref().unwrap_or(""),
            elevator.model.as_deref().unwrap_or("")
        ),
        &fonts,
    );
    page.info_row(
        "Technician",
        visit.technician_name.as_deref().unwrap_or("-"),
        &fonts,
    );
    page.info_row("Scheduled", &visit.scheduled_date.to_string(), &fonts);
    if let Some(completed_at) = visit.completed_at {
        page.info_row(
            "Completed",
            &completed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            &fonts,
        );
    }

    page.section("Checklist", &fonts);
    checklist_grid(&mut page, answers, &fonts);

    if let Some(signature) = visit.signature_name.as_deref() {
        page.signature_block(signature, "Technician signature", &fonts);
    }

    // Observations get their own page, after the checklist and signature.
    if let Some(observations) = visit.observations.as_deref().filter(|o| !o.trim().is_empty()) {
        page.new_page();
        page.heading("Observations", &period, &fonts);
        page.paragraph(observations, &fonts);
    }

    page.finish()
}

/// Three-column grid: question, result, note. Long questions wrap within
/// their column; rows are separated by a light rule.
fn checklist_grid(page: &mut PageWriter, answers: &[AnsweredQuestion], fonts: &Fonts) {
    let x_question = margin();
    let x_result = margin() + 128.0;
    let x_note = margin() + 145.0;

    page.ensure_room(6.0);
    page.text("Item", 9.0, x_question, &fonts.bold);
    page.text("Result", 9.0, x_result, &fonts.bold);
    page.text("Note", 9.0, x_note, &fonts.bold);
    page.advance(2.0);
    page.rule(0.6);
    page.advance(5.0);

    let mut category = "";
    for answer in answers {
        if answer.category != category {
            category = &answer.category;
            page.ensure_room(7.0);
            page.advance(2.0);
            page.text(category, 9.0, x_question, &fonts.bold);
            page.advance(5.0);
        }

        let question_lines = wrap_text(&answer.text, 72);
        let note_lines = answer
            .note
            .as_deref()
            .map(|n| wrap_text(n, 18))
            .unwrap_or_default();
        let rows = question_lines.len().max(note_lines.len().max(1));

        page.ensure_room(5.0 * rows as f64 + 2.0);
        for i in 0..rows {
            if let Some(line) = question_lines.get(i) {
                page.text(line, 8.0, x_question, &fonts.regular);
            }
            if i == 0 {
                page.text(result_label(answer.result), 8.0, x_result, &fonts.regular);
            }
            if let Some(line) = note_lines.get(i) {
                page.text(line, 8.0, x_note, &fonts.regular);
            }
            page.advance(5.0);
        }
        page.rule(0.2);
        page.advance(3.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use db::models::{
        checklist::QuestionFrequency,
        elevator::ElevatorStatus,
        maintenance::VisitStatus,
    };

    fn sample() -> (MaintenanceVisit, Elevator, Building, Client, Vec<AnsweredQuestion>) {
        let now = Utc::now();
        let visit = MaintenanceVisit {
            id: Uuid::new_v4(),
            elevator_id: Uuid::new_v4(),
            year: 2026,
            month: 6,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
            status: VisitStatus::Completed,
            technician_name: Some("P. Rojas".into()),
            started_at: Some(now),
            completed_at: Some(now),
            observations: Some("Brake pads at 40%, replacement suggested next visit.".into()),
            signature_name: Some("P. Rojas".into()),
            created_at: now,
            updated_at: now,
        };
        let elevator = Elevator {
            id: visit.elevator_id,
            building_id: Uuid::new_v4(),
            code: "A1".into(),
            brand: Some("Otis".into()),
            model: Some("Gen2".into()),
            serial_number: None,
            capacity_kg: Some(630),
            floors: Some(12),
            status: ElevatorStatus::Active,
            installed_at: None,
            created_at: now,
            updated_at: now,
        };
        let building = Building {
            id: elevator.building_id,
            client_id: Uuid::new_v4(),
            name: "Torre Central".into(),
            address: "Av. Providencia 1234".into(),
            commune: Some("Providencia".into()),
            created_at: now,
            updated_at: now,
        };
        let client = Client {
            id: building.client_id,
            name: "Inmobiliaria Andes".into(),
            rut: "76123456-0".into(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let answers = vec![AnsweredQuestion {
            question_id: Uuid::new_v4(),
            sort_order: 10,
            category: "machine_room".into(),
            text: "Motor and gearbox free of abnormal noise or vibration".into(),
            frequency: QuestionFrequency::Monthly,
            result: AnswerResult::Ok,
            note: None,
        }];
        (visit, elevator, building, client, answers)
    }

    #[test]
    fn renders_nonempty_pdf() {
        let (visit, elevator, building, client, answers) = sample();
        let bytes = render_report(&visit, &elevator, &building, &client, &answers).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn month_names_cover_range() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
    }
}
