use tracing::info;
use tracing_subscriber::EnvFilter;

use dataset_catalog::api::{create_router, AppState};
use dataset_catalog::config::CatalogConfig;
use dataset_catalog::database::DatabaseManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dataset_catalog=info,tower_http=debug".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let config = CatalogConfig::default();
    let db = DatabaseManager::new(&config).await?;
    db.test_connection().await?;

    let state = AppState::new(&db, &config);
    let app = create_router(state);

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    let addr = format!("0.0.0.0:{}", port);
    info!("Starting browse server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
