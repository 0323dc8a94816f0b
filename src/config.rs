//! Process-lifetime configuration.
//!
//! Built once at startup from the environment and immutable afterwards.

use std::path::PathBuf;
use std::time::Duration;

/// Catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    /// Directory whose immediate subdirectories are the browsable policies.
    pub policy_root: PathBuf,
    /// Products returned per page by the granule catalog.
    pub page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost:5432/catalog".to_string()),
            max_connections: std::env::var("DATABASE_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)), // 10 minutes
            max_lifetime: Some(Duration::from_secs(1800)), // 30 minutes
            policy_root: std::env::var("POLICY_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./policy")),
            page_size: std::env::var("CATALOG_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
        }
    }
}
