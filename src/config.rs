use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::catalog::CatalogOptions;
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub plans_dir: PathBuf,
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub reload_interval_secs: Option<u64>,
    pub line_match_fallback: bool,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "./_context".to_string());
        let plans_dir = env::var("PLANS_DIR").unwrap_or_else(|_| "./plans".to_string());
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let reload_interval_secs = match env::var("CATALOG_RELOAD_SECS") {
            Ok(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| AppError::Config(format!("CATALOG_RELOAD_SECS is invalid: {}", e)))?;
                (secs > 0).then_some(secs)
            }
            Err(_) => None,
        };

        let line_match_fallback = env::var("LINE_MATCH_FALLBACK")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            plans_dir: PathBuf::from(plans_dir),
            database_url,
            bind_addr,
            reload_interval_secs,
            line_match_fallback,
        })
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        let mut options = CatalogOptions::new(self.data_dir.clone());
        options.parse.line_match_fallback = self.line_match_fallback;
        options
    }
}
