//! Model CRUD and workflow tests against an in-memory database.

use chrono::NaiveDate;
use db::DBService;
use db::models::{
    building::{Building, CreateBuilding},
    checklist::ChecklistQuestion,
    client::{Client, CreateClient, UpdateClient},
    elevator::{CreateElevator, Elevator},
    maintenance::{AnswerResult, ChecklistAnswer, MaintenanceVisit, VisitStatus},
    service_request::{CreateServiceRequest, RequestPriority, RequestStatus, ServiceRequest},
    user::{AuditAction, UserAuditLog, UserProfile, UserRole},
    work_order::{CreateWorkOrder, WorkOrder, WorkOrderStatus},
};
use uuid::Uuid;

async fn setup() -> DBService {
    DBService::new_in_memory().await.expect("in-memory db")
}

async fn seed_client(db: &DBService, rut: &str) -> Client {
    Client::create(
        &db.pool,
        &CreateClient {
            name: "Inmobiliaria Andes".into(),
            rut: rut.into(),
            contact_name: Some("C. Fuentes".into()),
            email: Some("contacto@andes.cl".into()),
            phone: None,
            address: None,
        },
        Uuid::new_v4(),
    )
    .await
    .expect("client")
}

async fn seed_elevator(db: &DBService) -> Elevator {
    let client = seed_client(db, "76123456-0").await;
    let building = Building::create(
        &db.pool,
        client.id,
        &CreateBuilding {
            name: "Torre Central".into(),
            address: "Av. Providencia 1234".into(),
            commune: None,
        },
        Uuid::new_v4(),
    )
    .await
    .expect("building");
    Elevator::create(
        &db.pool,
        building.id,
        &CreateElevator {
            code: "A1".into(),
            brand: Some("Otis".into()),
            model: None,
            serial_number: None,
            capacity_kg: Some(630),
            floors: Some(12),
            installed_at: None,
        },
        Uuid::new_v4(),
    )
    .await
    .expect("elevator")
}

#[tokio::test]
async fn client_roundtrip_and_soft_delete() {
    let db = setup().await;
    let client = seed_client(&db, "12345678-5").await;

    let found = Client::find_by_rut(&db.pool, "12345678-5")
        .await
        .unwrap()
        .expect("found by rut");
    assert_eq!(found.id, client.id);
    assert!(found.active);

    let updated = Client::update(
        &db.pool,
        client.id,
        &UpdateClient {
            phone: Some("+56 9 1234 5678".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("updated");
    assert_eq!(updated.phone.as_deref(), Some("+56 9 1234 5678"));
    assert_eq!(updated.name, client.name);

    assert_eq!(Client::deactivate(&db.pool, client.id).await.unwrap(), 1);
    let active = Client::find_all(&db.pool, false).await.unwrap();
    assert!(active.is_empty());
    let all = Client::find_all(&db.pool, true).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn duplicate_rut_is_rejected() {
    let db = setup().await;
    seed_client(&db, "12345678-5").await;

    let err = Client::create(
        &db.pool,
        &CreateClient {
            name: "Other".into(),
            rut: "12345678-5".into(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
        },
        Uuid::new_v4(),
    )
    .await
    .expect_err("duplicate rut");
    let sqlx::Error::Database(db_err) = err else {
        panic!("expected database error");
    };
    assert!(db_err.is_unique_violation());
}

#[tokio::test]
async fn elevator_listing_joins_location() {
    let db = setup().await;
    let elevator = seed_elevator(&db).await;

    let rows = Elevator::find_all_with_location(&db.pool).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].elevator.id, elevator.id);
    assert_eq!(rows[0].building_name, "Torre Central");
    assert_eq!(rows[0].client_name, "Inmobiliaria Andes");
}

#[tokio::test]
async fn visit_lifecycle_and_answer_upsert() {
    let db = setup().await;
    let elevator = seed_elevator(&db).await;
    let date = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();

    let visit = MaintenanceVisit::create_scheduled(
        &db.pool,
        elevator.id,
        2026,
        6,
        date,
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    assert_eq!(visit.status, VisitStatus::Scheduled);

    // Completing before starting is a no-op.
    assert!(
        MaintenanceVisit::complete(&db.pool, visit.id, None, "P. Rojas")
            .await
            .unwrap()
            .is_none()
    );

    let started = MaintenanceVisit::start(&db.pool, visit.id, "P. Rojas")
        .await
        .unwrap()
        .expect("started");
    assert_eq!(started.status, VisitStatus::InProgress);
    assert!(started.started_at.is_some());

    // Starting twice fails the status guard.
    assert!(
        MaintenanceVisit::start(&db.pool, visit.id, "P. Rojas")
            .await
            .unwrap()
            .is_none()
    );

    let question = &ChecklistQuestion::find_all_active(&db.pool).await.unwrap()[0];
    let first = ChecklistAnswer::upsert(
        &db.pool,
        visit.id,
        question.id,
        AnswerResult::Fail,
        Some("noisy bearing"),
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let second = ChecklistAnswer::upsert(
        &db.pool,
        visit.id,
        question.id,
        AnswerResult::Ok,
        None,
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    // Last write wins without creating a second row.
    assert_eq!(first.id, second.id);
    assert_eq!(second.result, AnswerResult::Ok);
    assert_eq!(
        ChecklistAnswer::find_by_visit_id(&db.pool, visit.id)
            .await
            .unwrap()
            .len(),
        1
    );

    let completed = MaintenanceVisit::complete(&db.pool, visit.id, Some("all good"), "P. Rojas")
        .await
        .unwrap()
        .expect("completed");
    assert_eq!(completed.status, VisitStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert_eq!(completed.signature_name.as_deref(), Some("P. Rojas"));
}

#[tokio::test]
async fn visit_period_is_unique_per_elevator() {
    let db = setup().await;
    let elevator = seed_elevator(&db).await;
    let date = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();

    MaintenanceVisit::create_scheduled(&db.pool, elevator.id, 2026, 6, date, Uuid::new_v4())
        .await
        .unwrap();
    let err = MaintenanceVisit::create_scheduled(
        &db.pool,
        elevator.id,
        2026,
        6,
        date,
        Uuid::new_v4(),
    )
    .await
    .expect_err("duplicate period");
    assert!(matches!(err, sqlx::Error::Database(e) if e.is_unique_violation()));
}

#[tokio::test]
async fn lapsed_scheduled_visits_become_missed() {
    let db = setup().await;
    let elevator = seed_elevator(&db).await;
    let date = NaiveDate::from_ymd_opt(2026, 5, 20).unwrap();

    let visit =
        MaintenanceVisit::create_scheduled(&db.pool, elevator.id, 2026, 5, date, Uuid::new_v4())
            .await
            .unwrap();

    let cutoff = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    assert_eq!(
        MaintenanceVisit::mark_missed_before(&db.pool, cutoff).await.unwrap(),
        1
    );
    let visit = MaintenanceVisit::find_by_id(&db.pool, visit.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(visit.status, VisitStatus::Missed);

    // Already-missed visits are not touched again.
    assert_eq!(
        MaintenanceVisit::mark_missed_before(&db.pool, cutoff).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn work_order_folio_and_workflow() {
    let db = setup().await;
    let client = seed_client(&db, "76123456-0").await;

    assert_eq!(
        WorkOrder::next_folio(&db.pool, 2026).await.unwrap(),
        "OT-2026-0001"
    );

    let create = CreateWorkOrder {
        client_id: client.id,
        elevator_id: None,
        title: "Door operator replacement".into(),
        description: None,
        kind: None,
    };
    let order = WorkOrder::create(&db.pool, &create, 2026, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(order.status, WorkOrderStatus::Draft);
    assert_eq!(order.folio, "OT-2026-0001");
    assert_eq!(
        WorkOrder::next_folio(&db.pool, 2026).await.unwrap(),
        "OT-2026-0002"
    );

    let quoted = WorkOrder::set_quotation(&db.pool, order.id, 850000, 161500, 1011500, None, None)
        .await
        .unwrap()
        .expect("quoted");
    assert_eq!(quoted.quote_total, Some(1011500));

    let pending = WorkOrder::transition(
        &db.pool,
        order.id,
        &[WorkOrderStatus::Draft],
        WorkOrderStatus::PendingApproval,
    )
    .await
    .unwrap()
    .expect("submitted");
    assert_eq!(pending.status, WorkOrderStatus::PendingApproval);

    // Quotation is frozen once out of draft.
    assert!(
        WorkOrder::set_quotation(&db.pool, order.id, 1, 0, 1, None, None)
            .await
            .unwrap()
            .is_none()
    );

    let rejected = WorkOrder::reject(&db.pool, order.id, "too expensive")
        .await
        .unwrap()
        .expect("rejected");
    assert_eq!(rejected.status, WorkOrderStatus::Draft);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("too expensive"));

    WorkOrder::transition(
        &db.pool,
        order.id,
        &[WorkOrderStatus::Draft],
        WorkOrderStatus::PendingApproval,
    )
    .await
    .unwrap()
    .unwrap();
    let approved = WorkOrder::approve(&db.pool, order.id, "C. Fuentes")
        .await
        .unwrap()
        .expect("approved");
    assert_eq!(approved.status, WorkOrderStatus::Approved);
    assert!(approved.approved_at.is_some());
    assert!(approved.rejection_reason.is_none());

    WorkOrder::transition(
        &db.pool,
        order.id,
        &[WorkOrderStatus::Approved],
        WorkOrderStatus::InProgress,
    )
    .await
    .unwrap()
    .unwrap();
    let done = WorkOrder::complete(&db.pool, order.id, Some(6))
        .await
        .unwrap()
        .expect("completed");
    assert_eq!(done.status, WorkOrderStatus::Completed);
    assert_eq!(done.warranty_months, Some(6));
}

#[tokio::test]
async fn folio_sequence_advances_past_highest_allocated() {
    let db = setup().await;
    let client = seed_client(&db, "76123456-0").await;

    let create = CreateWorkOrder {
        client_id: client.id,
        elevator_id: None,
        title: "Cable inspection".into(),
        description: None,
        kind: None,
    };
    let order = WorkOrder::create(&db.pool, &create, 2026, Uuid::new_v4())
        .await
        .unwrap();

    // Sequencing must follow the highest folio on file, not the row count,
    // so a duplicate is never handed out when the numbering has gaps.
    sqlx::query("UPDATE work_orders SET folio = 'OT-2026-0005' WHERE id = $1")
        .bind(order.id)
        .execute(&db.pool)
        .await
        .unwrap();
    assert_eq!(
        WorkOrder::next_folio(&db.pool, 2026).await.unwrap(),
        "OT-2026-0006"
    );
    let second = WorkOrder::create(&db.pool, &create, 2026, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(second.folio, "OT-2026-0006");

    // Other years keep their own sequence.
    assert_eq!(
        WorkOrder::next_folio(&db.pool, 2027).await.unwrap(),
        "OT-2027-0001"
    );
}

#[tokio::test]
async fn stale_pending_requests_are_found_and_flagged() {
    let db = setup().await;
    let client = seed_client(&db, "76123456-0").await;

    let request = ServiceRequest::create(
        &db.pool,
        &CreateServiceRequest {
            client_id: client.id,
            elevator_id: None,
            requested_by: "Conserje".into(),
            contact_email: None,
            contact_phone: None,
            description: "Strange noise on floor 3".into(),
            priority: Some(RequestPriority::High),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert!(!request.escalated);

    // A just-created request is not stale for a same-day cutoff in the past.
    let past_cutoff = chrono::Utc::now() - chrono::Duration::hours(1);
    let stale = ServiceRequest::find_stale_pending(&db.pool, RequestPriority::High, past_cutoff)
        .await
        .unwrap();
    assert!(stale.is_empty(), "fresh request wrongly considered stale");

    // Backdate it past the cutoff and it turns up.
    sqlx::query("UPDATE service_requests SET created_at = datetime('now', '-2 hours') WHERE id = $1")
        .bind(request.id)
        .execute(&db.pool)
        .await
        .unwrap();
    let cutoff = chrono::Utc::now() - chrono::Duration::hours(1);
    let stale = ServiceRequest::find_stale_pending(&db.pool, RequestPriority::High, cutoff)
        .await
        .unwrap();
    assert_eq!(stale.len(), 1);

    ServiceRequest::mark_escalated(&db.pool, request.id).await.unwrap();
    let flagged = ServiceRequest::find_by_id(&db.pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert!(flagged.escalated);

    // Already-flagged requests are not returned again.
    let stale = ServiceRequest::find_stale_pending(&db.pool, RequestPriority::High, cutoff)
        .await
        .unwrap();
    assert!(stale.is_empty());
}

#[tokio::test]
async fn user_profile_hides_secrets_and_audits() {
    let db = setup().await;
    let user = UserProfile::create(
        &db.pool,
        Uuid::new_v4(),
        "admin@liftops.cl",
        "digest",
        "salt",
        "Admin",
        None,
        UserRole::Admin,
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password_digest").is_none());
    assert!(json.get("salt").is_none());
    assert_eq!(json["role"], "admin");

    UserAuditLog::create(
        &db.pool,
        user.id,
        AuditAction::Created,
        user.id,
        Some("bootstrap".into()),
    )
    .await
    .unwrap();
    let entries = UserAuditLog::find_recent(&db.pool, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Created);
}
