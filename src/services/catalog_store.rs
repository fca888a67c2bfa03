use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::catalog::{self, Catalog, CatalogOptions};
use crate::error::AppError;

/// Holds the current catalog snapshot. Readers get an `Arc` to an immutable
/// catalog; a reload builds a new one off to the side and swaps it in whole.
#[derive(Clone)]
pub struct CatalogStore {
    current: Arc<RwLock<Arc<Catalog>>>,
    options: Arc<CatalogOptions>,
}

impl CatalogStore {
    pub fn new(options: CatalogOptions, initial: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
            options: Arc::new(options),
        }
    }

    /// Parses the data directory once and wraps the result.
    pub async fn load(options: CatalogOptions) -> Result<Self, AppError> {
        let catalog = build(Arc::new(options.clone())).await?;
        Ok(Self::new(options, catalog))
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    pub async fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().await.clone()
    }

    pub async fn reload(&self) -> Result<Arc<Catalog>, AppError> {
        let fresh = Arc::new(build(self.options.clone()).await?);
        *self.current.write().await = fresh.clone();
        info!(
            "Catalog reloaded: {} courses, {} requirements ({:?})",
            fresh.courses().len(),
            fresh.requirements().len(),
            fresh.source
        );
        Ok(fresh)
    }
}

// Parsing is blocking file I/O.
async fn build(options: Arc<CatalogOptions>) -> Result<Catalog, AppError> {
    tokio::task::spawn_blocking(move || catalog::load_catalog(&options))
        .await
        .map_err(|e| {
            error!("catalog load task failed: {}", e);
            AppError::InternalServerError
        })
}
