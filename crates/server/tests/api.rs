//! End-to-end tests over the assembled router against an in-memory database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Datelike, NaiveDate};
use db::{
    DBService,
    models::{
        building::{Building, CreateBuilding},
        checklist::ChecklistQuestion,
        client::{Client, CreateClient},
        elevator::{CreateElevator, Elevator},
        maintenance::MaintenanceVisit,
        user::{UserProfile, UserRole},
    },
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{AppState, app};
use tower::ServiceExt;
use uuid::Uuid;

async fn test_app() -> (Router, DBService) {
    let db = DBService::new_in_memory().await.expect("in-memory db");
    (app(AppState::new(db.clone())), db)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn seed_elevator(db: &DBService) -> Elevator {
    let client = Client::create(
        &db.pool,
        &CreateClient {
            name: "Inmobiliaria Andes".into(),
            rut: "76123456-0".into(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
        },
        Uuid::new_v4(),
    )
    .await
    .expect("client");
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
            brand: None,
            model: None,
            serial_number: None,
            capacity_kg: None,
            floors: None,
            installed_at: None,
        },
        Uuid::new_v4(),
    )
    .await
    .expect("elevator")
}

async fn seed_started_visit(router: &Router, db: &DBService) -> MaintenanceVisit {
    let elevator = seed_elevator(db).await;
    let date = NaiveDate::from_ymd_opt(2026, 1, 15).expect("date");
    let visit =
        MaintenanceVisit::create_scheduled(&db.pool, elevator.id, 2026, 1, date, Uuid::new_v4())
            .await
            .expect("visit");
    let (status, _) = send(
        router,
        post_json(
            &format!("/api/maintenance/visits/{}/start", visit.id),
            json!({"technician_name": "P. Rojas"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    visit
}

#[tokio::test]
async fn health_check_reports_ok() {
    let (router, _db) = test_app().await;
    let (status, body) = send(&router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn client_creation_validates_and_normalizes_rut() {
    let (router, _db) = test_app().await;

    let (status, body) = send(
        &router,
        post_json("/api/clients", json!({"name": "Andes", "rut": "12345678-6"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &router,
        post_json("/api/clients", json!({"name": "Andes", "rut": "12.345.678-5"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rut"], "12345678-5");

    // Same RUT with different formatting is still a duplicate.
    let (status, _) = send(
        &router,
        post_json("/api/clients", json!({"name": "Other", "rut": "12345678-5"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_client_is_not_found() {
    let (router, _db) = test_app().await;
    let uri = format!("/api/clients/{}", Uuid::new_v4());
    let (status, body) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn calendar_grid_has_42_cells() {
    let (router, _db) = test_app().await;
    let (status, body) = send(&router, get("/api/calendar/2026/6")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cells"].as_array().map(Vec::len), Some(42));
    assert_eq!(body["data"]["adjusted_start_day"], 0);

    let (status, _) = send(&router, get("/api/calendar/2026/13")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provisioning_requires_actor_and_role() {
    let (router, db) = test_app().await;
    let admin = UserProfile::create(
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
    .expect("admin");

    let payload = json!({
        "email": "tech@liftops.cl",
        "password": "hunter2hunter2",
        "full_name": "Tech",
        "phone": null,
        "role": "technician",
    });

    // No actor header at all.
    let (status, _) = send(&router, post_json("/api/users", payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut request = post_json("/api/users", payload);
    request
        .headers_mut()
        .insert("x-actor-id", admin.id.to_string().parse().expect("header"));
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "technician");
    assert!(body["data"].get("password_digest").is_none());

    // Admins cannot mint developers.
    let mut request = post_json(
        "/api/users",
        json!({
            "email": "dev@liftops.cl",
            "password": "hunter2hunter2",
            "full_name": "Dev",
            "phone": null,
            "role": "developer",
        }),
    );
    request
        .headers_mut()
        .insert("x-actor-id", admin.id.to_string().parse().expect("header"));
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn completing_a_visit_requires_a_full_checklist() {
    let (router, db) = test_app().await;
    let visit = seed_started_visit(&router, &db).await;
    let complete_uri = format!("/api/maintenance/visits/{}/complete", visit.id);
    let signature = json!({"signature_name": "P. Rojas", "observations": null});

    // Closing with the checklist untouched is rejected.
    let (status, body) = send(&router, post_json(&complete_uri, signature.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(
        body["message"].as_str().expect("message").contains("unanswered"),
        "unexpected message: {}",
        body["message"]
    );

    let questions = ChecklistQuestion::find_all_active(&db.pool).await.expect("questions");
    let answers: Vec<Value> = questions
        .iter()
        .map(|q| json!({"question_id": q.id, "result": "ok", "note": null}))
        .collect();
    let (status, _) = send(
        &router,
        post_json(
            &format!("/api/maintenance/visits/{}/answers", visit.id),
            Value::Array(answers),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, post_json(&complete_uri, signature)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
}

#[tokio::test]
async fn answers_for_unknown_questions_are_rejected() {
    let (router, db) = test_app().await;
    let visit = seed_started_visit(&router, &db).await;

    let (status, body) = send(
        &router,
        post_json(
            &format!("/api/maintenance/visits/{}/answers", visit.id),
            json!([{"question_id": Uuid::new_v4(), "result": "ok", "note": null}]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn resolving_a_request_needs_a_note_and_freezes_it() {
    let (router, _db) = test_app().await;

    let (_, client) = send(
        &router,
        post_json("/api/clients", json!({"name": "Andes", "rut": "12345678-5"})),
    )
    .await;
    let client_id = client["data"]["id"].as_str().expect("id").to_string();

    let (status, request) = send(
        &router,
        post_json(
            "/api/service-requests",
            json!({
                "client_id": client_id,
                "elevator_id": null,
                "requested_by": "Conserje",
                "contact_email": null,
                "contact_phone": null,
                "description": "Strange noise on floor 3",
                "priority": "high",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let status_uri = format!(
        "/api/service-requests/{}/status",
        request["data"]["id"].as_str().expect("id")
    );

    // Resolving without a note is rejected.
    let (status, body) = send(
        &router,
        post_json(&status_uri, json!({"status": "resolved", "resolution_note": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &router,
        post_json(
            &status_uri,
            json!({"status": "resolved", "resolution_note": "tightened guide shoes"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["resolution_note"], "tightened guide shoes");

    // Terminal states do not move again.
    let (status, _) = send(
        &router,
        post_json(&status_uri, json!({"status": "in_review", "resolution_note": null})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn resolving_an_emergency_requires_actions_taken() {
    let (router, db) = test_app().await;
    let elevator = seed_elevator(&db).await;

    let (status, emergency) = send(
        &router,
        post_json(
            "/api/emergencies",
            json!({
                "elevator_id": elevator.id,
                "reported_at": null,
                "technician_name": "P. Rojas",
                "fault_description": "Car stuck between floors",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let emergency_id = emergency["data"]["id"].as_str().expect("id").to_string();
    let emergency_uri = format!("/api/emergencies/{}", emergency_id);

    // No actions recorded yet.
    let (status, body) = send(
        &router,
        post_json(&format!("{}/resolve", emergency_uri), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &router,
        put_json(&emergency_uri, json!({"actions_taken": "Reset drive and freed the car"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &router,
        post_json(&format!("{}/resolve", emergency_uri), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "resolved");

    // A resolved emergency cannot be resolved twice.
    let (status, _) = send(
        &router,
        post_json(&format!("{}/resolve", emergency_uri), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn work_order_quotation_computes_iva() {
    let (router, _db) = test_app().await;

    let (_, client) = send(
        &router,
        post_json("/api/clients", json!({"name": "Andes", "rut": "12345678-5"})),
    )
    .await;
    let client_id = client["data"]["id"].as_str().expect("id").to_string();

    let (status, order) = send(
        &router,
        post_json(
            "/api/work-orders",
            json!({"client_id": client_id, "elevator_id": null, "title": "Door repair", "description": null, "kind": "billable"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let expected_folio = format!("OT-{}-0001", chrono::Utc::now().year());
    assert_eq!(order["data"]["folio"], expected_folio);
    let order_id = order["data"]["id"].as_str().expect("id").to_string();

    let (status, quoted) = send(
        &router,
        post_json(
            &format!("/api/work-orders/{}/quotation", order_id),
            json!({"net": 850000, "valid_until": null, "terms": null}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quoted["data"]["quote_tax"], 161500);
    assert_eq!(quoted["data"]["quote_total"], 1011500);
}
