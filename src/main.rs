use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use degree_planner::api::router;
use degree_planner::config::AppConfig;
use degree_planner::db::{FilePlanStore, PlanStore, SqlitePlanStore};
use degree_planner::services::{CatalogReloader, CatalogStore};
use degree_planner::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "degree_planner=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    info!("Loading catalog from {}", config.data_dir.display());
    let catalog = CatalogStore::load(config.catalog_options()).await?;

    let plans: Arc<dyn PlanStore> = match &config.database_url {
        Some(url) => {
            info!("Storing plans in {}", url);
            Arc::new(SqlitePlanStore::connect(url).await?)
        }
        None => {
            info!("Storing plans under {}", config.plans_dir.display());
            Arc::new(FilePlanStore::new(config.plans_dir.clone()).await?)
        }
    };

    if let Some(secs) = config.reload_interval_secs {
        let reloader = CatalogReloader::new(catalog.clone(), secs);
        tokio::spawn(async move {
            reloader.start().await;
        });
    }

    let app = router(AppState::new(catalog, plans));

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
