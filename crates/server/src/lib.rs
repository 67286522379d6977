pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use db::DBService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }
}

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(routes::health::router())
                .merge(routes::clients::router())
                .merge(routes::elevators::router())
                .merge(routes::checklist::router())
                .merge(routes::maintenance::router())
                .merge(routes::calendar::router())
                .merge(routes::emergencies::router())
                .merge(routes::service_requests::router())
                .merge(routes::work_orders::router())
                .merge(routes::users::router())
                .merge(routes::reports::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
