//! Emergency visit report: incident table plus fault/actions/parts sections.

use db::models::{
    building::Building, client::Client, elevator::Elevator, emergency::EmergencyVisit,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{PageWriter, PdfError};

pub async fn render(pool: &SqlitePool, emergency_id: Uuid) -> Result<Vec<u8>, PdfError> {
    let visit = EmergencyVisit::find_by_id(pool, emergency_id)
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

    render_report(&visit, &elevator, &building, &client)
}

fn render_report(
    visit: &EmergencyVisit,
    elevator: &Elevator,
    building: &Building,
    client: &Client,
) -> Result<Vec<u8>, PdfError> {
    let (mut page, fonts) = PageWriter::new_a4("Emergency Visit Report")?;

    page.heading(
        "Emergency Visit Report",
        &format!("Reported {}", visit.reported_at.format("%Y-%m-%d %H:%M UTC")),
        &fonts,
    );

    page.info_row("Client", &format!("{} ({})", client.name, client.rut), &fonts);
    page.info_row(
        "Building",
        &format!("{} - {}", building.name, building.address),
        &fonts,
    );
    page.info_row("Elevator", &elevator.code, &fonts);
    page.info_row(
        "Technician",
        visit.technician_name.as_deref().unwrap_or("-"),
        &fonts,
    );
    if let Some(attended_at) = visit.attended_at {
        page.info_row(
            "Attended",
            &attended_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            &fonts,
        );
    }
    page.info_row("Status", &visit.status.to_string(), &fonts);

    page.section("Reported fault", &fonts);
    page.paragraph(&visit.fault_description, &fonts);

    if let Some(actions) = visit.actions_taken.as_deref() {
        page.section("Actions taken", &fonts);
        page.paragraph(actions, &fonts);
    }

    if let Some(parts) = visit.parts_used.as_deref() {
        page.section("Parts used", &fonts);
        page.paragraph(parts, &fonts);
    }

    if let Some(signature) = visit.signature_name.as_deref() {
        page.signature_block(signature, "Technician signature", &fonts);
    }

    page.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use db::models::{elevator::ElevatorStatus, emergency::EmergencyStatus};

    #[test]
    fn renders_nonempty_pdf() {
        let now = Utc::now();
        let visit = EmergencyVisit {
            id: Uuid::new_v4(),
            elevator_id: Uuid::new_v4(),
            reported_at: now,
            attended_at: Some(now),
            technician_name: Some("M. Soto".into()),
            fault_description: "Cabin stopped between floors 4 and 5 with passengers inside."
                .into(),
            actions_taken: Some("Manual brake release, cabin leveled to floor 5.".into()),
            parts_used: Some("None".into()),
            status: EmergencyStatus::Resolved,
            signature_name: Some("M. Soto".into()),
            created_at: now,
            updated_at: now,
        };
        let elevator = Elevator {
            id: visit.elevator_id,
            building_id: Uuid::new_v4(),
            code: "B2".into(),
            brand: None,
            model: None,
            serial_number: None,
            capacity_kg: None,
            floors: None,
            status: ElevatorStatus::Active,
            installed_at: None,
            created_at: now,
            updated_at: now,
        };
        let building = Building {
            id: elevator.building_id,
            client_id: Uuid::new_v4(),
            name: "Edificio Mirador".into(),
            address: "Los Leones 55".into(),
            commune: None,
            created_at: now,
            updated_at: now,
        };
        let client = Client {
            id: building.client_id,
            name: "Comunidad Mirador".into(),
            rut: "65432100-K".into(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let bytes = render_report(&visit, &elevator, &building, &client).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
