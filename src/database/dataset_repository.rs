//! Postgres-backed product-type store over the `dataset` table.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{DatasetRow, ProductType};

use super::ProductTypeStore;

const DATASET_COLUMNS: &str =
    r#"dataset_id, "shortName", "longName", source, "referenceURL", description"#;

#[derive(Clone, Debug)]
pub struct DatasetRepository {
    pool: PgPool,
}

impl DatasetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a result set to a product type, keeping the *last* row read.
///
/// Duplicate short names are legal in the schema, and callers of the by-name
/// and by-id lookups have always received the final match in cursor order.
fn last_row(rows: Vec<DatasetRow>) -> Option<ProductType> {
    rows.into_iter().last().map(ProductType::from)
}

#[async_trait]
impl ProductTypeStore for DatasetRepository {
    async fn list_product_types(&self) -> Result<Vec<ProductType>, StoreError> {
        let rows = sqlx::query_as::<_, DatasetRow>(&format!(
            "SELECT {DATASET_COLUMNS} FROM dataset ORDER BY dataset_id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ProductType::from).collect())
    }

    async fn product_type_by_id(&self, id: &str) -> Result<Option<ProductType>, StoreError> {
        // A non-numeric id cannot match the integer primary key.
        let Ok(dataset_id) = id.parse::<i32>() else {
            debug!("non-numeric product type id: [{}]", id);
            return Ok(None);
        };
        let rows = sqlx::query_as::<_, DatasetRow>(&format!(
            "SELECT {DATASET_COLUMNS} FROM dataset WHERE dataset_id = $1"
        ))
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(last_row(rows))
    }

    async fn product_type_by_name(&self, name: &str) -> Result<Option<ProductType>, StoreError> {
        let rows = sqlx::query_as::<_, DatasetRow>(&format!(
            r#"SELECT {DATASET_COLUMNS} FROM dataset WHERE "shortName" = $1"#
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(last_row(rows))
    }

    async fn add_product_type(&self, product_type: &ProductType) -> Result<(), StoreError> {
        // The short name doubles as the long name on insert.
        sqlx::query(
            r#"INSERT INTO dataset ("longName", "shortName", description) VALUES ($1, $2, $3)"#,
        )
        .bind(&product_type.name)
        .bind(&product_type.name)
        .bind(&product_type.description)
        .execute(&self.pool)
        .await?;
        info!("Added product type '{}'", product_type.name);
        Ok(())
    }

    async fn modify_product_type(&self, product_type: &ProductType) -> Result<(), StoreError> {
        let Ok(dataset_id) = product_type.id.parse::<i32>() else {
            debug!("non-numeric product type id: [{}]", product_type.id);
            return Ok(());
        };
        let result = sqlx::query(
            r#"UPDATE dataset SET "shortName" = $1, description = $2 WHERE dataset_id = $3"#,
        )
        .bind(&product_type.name)
        .bind(&product_type.description)
        .bind(dataset_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() > 0 {
            info!("Updated product type {}", product_type.id);
        }
        Ok(())
    }

    async fn remove_product_type(&self, product_type: &ProductType) -> Result<(), StoreError> {
        let Ok(dataset_id) = product_type.id.parse::<i32>() else {
            debug!("non-numeric product type id: [{}]", product_type.id);
            return Ok(());
        };
        let result = sqlx::query("DELETE FROM dataset WHERE dataset_id = $1")
            .bind(dataset_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            info!("Deleted product type {}", product_type.id);
        }
        Ok(())
    }
}
