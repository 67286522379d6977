use db::DBService;
use server::{AppState, app, config::ServerConfig};
use services::services::escalation::EscalationService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("liftops server v{}", env!("CARGO_PKG_VERSION"));

    let db = DBService::new(&config.database_path).await?;

    let escalation_handle = EscalationService::spawn(db.clone());

    let state = AppState::new(db);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    escalation_handle.abort();
    Ok(())
}
