use std::time::Duration;

use tracing::{info, warn};

use super::catalog_store::CatalogStore;

/// Periodically rescans the data directory and republishes the catalog.
pub struct CatalogReloader {
    store: CatalogStore,
    interval: Duration,
}

impl CatalogReloader {
    pub fn new(store: CatalogStore, interval_secs: u64) -> Self {
        Self {
            store,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub async fn start(self) {
        info!("Starting catalog reloader (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.store.reload().await {
                Ok(catalog) => {
                    info!(
                        "Auto-reload completed - {} courses from {} files",
                        catalog.courses().len(),
                        catalog.reports.len()
                    );
                }
                Err(e) => {
                    warn!("Auto-reload failed: {:?}", e);
                }
            }
        }
    }
}
