//! Work-order quotation document: folio header, client block, amounts table,
//! terms and warranty.

use db::models::{client::Client, work_order::WorkOrder};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{Fonts, PageWriter, PdfError, format_clp, margin};

pub async fn render(pool: &SqlitePool, work_order_id: Uuid) -> Result<Vec<u8>, PdfError> {
    let order = WorkOrder::find_by_id(pool, work_order_id)
        .await?
        .ok_or(PdfError::NotFound)?;
    let client = Client::find_by_id(pool, order.client_id)
        .await?
        .ok_or(PdfError::NotFound)?;
    render_report(&order, &client)
}

fn render_report(order: &WorkOrder, client: &Client) -> Result<Vec<u8>, PdfError> {
    let (mut page, fonts) = PageWriter::new_a4("Work Order")?;

    page.heading(
        &format!("Work Order {}", order.folio),
        &format!("Issued {}", order.created_at.format("%Y-%m-%d")),
        &fonts,
    );

    page.info_row("Client", &format!("{} ({})", client.name, client.rut), &fonts);
    if let Some(contact) = client.contact_name.as_deref() {
        page.info_row("Contact", contact, &fonts);
    }
    page.info_row("Kind", &order.kind.to_string(), &fonts);
    page.info_row("Status", &order.status.to_string(), &fonts);

    page.section(&order.title, &fonts);
    if let Some(description) = order.description.as_deref() {
        page.paragraph(description, &fonts);
    }

    if let (Some(net), Some(tax), Some(total)) =
        (order.quote_net, order.quote_tax, order.quote_total)
    {
        page.section("Quotation", &fonts);
        amounts_table(&mut page, net, tax, total, &fonts);

        if let Some(valid_until) = order.quote_valid_until {
            page.info_row("Valid until", &valid_until.to_string(), &fonts);
        }
        if let Some(terms) = order.quote_terms.as_deref() {
            page.advance(2.0);
            page.paragraph(terms, &fonts);
        }
    }

    if let Some(months) = order.warranty_months {
        page.section("Warranty", &fonts);
        page.paragraph(
            &format!("This work is covered by a {} month warranty on parts and labor.", months),
            &fonts,
        );
    }

    if let Some(approved_by) = order.approved_by.as_deref() {
        page.signature_block(approved_by, "Client approval", &fonts);
    }

    page.finish()
}

fn amounts_table(page: &mut PageWriter, net: i64, tax: i64, total: i64, fonts: &Fonts) {
    let x_label = margin() + 90.0;
    let x_amount = margin() + 135.0;

    for (label, amount, bold) in [
        ("Net", net, false),
        ("IVA (19%)", tax, false),
        ("Total", total, true),
    ] {
        page.ensure_room(6.0);
        let font = if bold { &fonts.bold } else { &fonts.regular };
        page.text(label, 9.0, x_label, font);
        page.text(&format_clp(amount), 9.0, x_amount, font);
        page.advance(6.0);
    }
    page.rule(0.4);
    page.advance(4.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use db::models::work_order::{WorkOrderKind, WorkOrderStatus};

    #[test]
    fn renders_quotation_pdf() {
        let now = Utc::now();
        let order = WorkOrder {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            elevator_id: None,
            folio: "OT-2026-0001".into(),
            title: "Door operator replacement".into(),
            description: Some("Replace worn door operator on elevator A1.".into()),
            kind: WorkOrderKind::Billable,
            status: WorkOrderStatus::PendingApproval,
            quote_net: Some(850000),
            quote_tax: Some(161500),
            quote_total: Some(1011500),
            quote_valid_until: NaiveDate::from_ymd_opt(2026, 10, 1),
            quote_terms: Some("50% advance, balance on completion.".into()),
            warranty_months: Some(6),
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        let client = Client {
            id: order.client_id,
            name: "Inmobiliaria Andes".into(),
            rut: "76123456-0".into(),
            contact_name: Some("C. Fuentes".into()),
            email: None,
            phone: None,
            address: None,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let bytes = render_report(&order, &client).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
