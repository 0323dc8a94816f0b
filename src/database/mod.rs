//! Database connection management and the product-type store.

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::catalog::GranuleCatalog;
use crate::config::CatalogConfig;
use crate::error::StoreError;
use crate::models::ProductType;
use crate::validation::ParameterValidationSource;

pub mod dataset_repository;

pub use dataset_repository::DatasetRepository;

/// CRUD over the `dataset` table.
///
/// Lookups return `Ok(None)` when no row matches; `Err` is reserved for
/// connectivity and query failures, so callers can tell the two apart.
#[async_trait]
pub trait ProductTypeStore: Send + Sync {
    /// All product types, ordered by id descending.
    async fn list_product_types(&self) -> Result<Vec<ProductType>, StoreError>;

    async fn product_type_by_id(&self, id: &str) -> Result<Option<ProductType>, StoreError>;

    async fn product_type_by_name(&self, name: &str) -> Result<Option<ProductType>, StoreError>;

    /// Inserts a new dataset row. The assigned id stays in the database; it
    /// is not read back into `product_type`.
    async fn add_product_type(&self, product_type: &ProductType) -> Result<(), StoreError>;

    async fn modify_product_type(&self, product_type: &ProductType) -> Result<(), StoreError>;

    async fn remove_product_type(&self, product_type: &ProductType) -> Result<(), StoreError>;
}

/// Owns the connection pool and hands out the data-access services.
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn new(config: &CatalogConfig) -> Result<Self, sqlx::Error> {
        info!(
            "Connecting to database: {}",
            mask_database_url(&config.database_url)
        );

        let mut pool_options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connection_timeout);

        if let Some(idle_timeout) = config.idle_timeout {
            pool_options = pool_options.idle_timeout(idle_timeout);
        }

        if let Some(max_lifetime) = config.max_lifetime {
            pool_options = pool_options.max_lifetime(max_lifetime);
        }

        let pool = pool_options
            .connect(&config.database_url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                e
            })?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn dataset_repository(&self) -> DatasetRepository {
        DatasetRepository::new(self.pool.clone())
    }

    pub fn granule_catalog(&self, page_size: u32) -> GranuleCatalog {
        GranuleCatalog::new(self.pool.clone(), page_size)
    }

    pub fn validation_source(&self) -> ParameterValidationSource {
        ParameterValidationSource::new(self.pool.clone())
    }

    /// Test database connectivity.
    pub async fn test_connection(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.map(|_| ())
    }

    /// Close the database connection pool.
    pub async fn close(self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}

/// Mask sensitive information in database URL for logging.
fn mask_database_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut masked = parsed.clone();
        if parsed.password().is_some() {
            let _ = masked.set_password(Some("***"));
        }
        masked.to_string()
    } else if url.len() > 20 {
        format!("{}***{}", &url[..10], &url[url.len() - 10..])
    } else {
        "***".to_string()
    }
}
