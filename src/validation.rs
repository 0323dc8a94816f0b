//! Descriptive elements declared for a product type.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::StoreError;
use crate::models::{Element, ParameterRow, ProductType};

/// Supplies the metadata elements valid for a product type.
#[async_trait]
pub trait ValidationSource: Send + Sync {
    async fn elements_for_product_type(
        &self,
        product_type: &ProductType,
    ) -> Result<Vec<Element>, StoreError>;
}

/// Postgres validation source over the `parameter` table.
#[derive(Clone, Debug)]
pub struct ParameterValidationSource {
    pool: PgPool,
}

impl ParameterValidationSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ValidationSource for ParameterValidationSource {
    async fn elements_for_product_type(
        &self,
        product_type: &ProductType,
    ) -> Result<Vec<Element>, StoreError> {
        let Ok(dataset_id) = product_type.id.parse::<i32>() else {
            debug!("non-numeric product type id: [{}]", product_type.id);
            return Ok(Vec::new());
        };
        let rows: Vec<ParameterRow> = sqlx::query_as(
            r#"SELECT parameter_id, "shortName", description FROM parameter WHERE dataset_id = $1 ORDER BY parameter_id"#,
        )
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Element::from).collect())
    }
}
