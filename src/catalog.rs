//! The catalog port: product-type lookup plus paged granule queries.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::database::{DatasetRepository, ProductTypeStore};
use crate::error::StoreError;
use crate::models::{GranuleRow, Product, ProductPage, ProductQuery, ProductType};

/// Paginated read access to the product catalog.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    async fn product_type_by_name(&self, name: &str) -> Result<Option<ProductType>, StoreError>;

    /// One page of the products of `product_type`, 1-based `page_num`.
    async fn paged_query(
        &self,
        query: &ProductQuery,
        product_type: &ProductType,
        page_num: u32,
    ) -> Result<ProductPage, StoreError>;
}

/// Postgres catalog over the `granule` table.
#[derive(Clone, Debug)]
pub struct GranuleCatalog {
    pool: PgPool,
    types: DatasetRepository,
    page_size: u32,
}

impl GranuleCatalog {
    pub fn new(pool: PgPool, page_size: u32) -> Self {
        let types = DatasetRepository::new(pool.clone());
        Self {
            pool,
            types,
            page_size,
        }
    }
}

/// The only element the granule table stores a column for.
const FILENAME_ELEMENT: &str = "filename";

fn total_pages(count: i64, page_size: u32) -> u32 {
    if count <= 0 || page_size == 0 {
        return 0;
    }
    (count as u64).div_ceil(page_size as u64) as u32
}

/// Reduces the query criteria to at most one filename equality match.
///
/// Returns `Err(())` when the criteria cannot match any granule: a term on
/// an element with no backing column, or two conflicting filename terms.
fn filename_filter(query: &ProductQuery) -> Result<Option<&str>, ()> {
    let mut filename = None;
    for criterion in &query.criteria {
        if criterion.element != FILENAME_ELEMENT {
            return Err(());
        }
        match filename {
            None => filename = Some(criterion.value.as_str()),
            Some(existing) if existing == criterion.value => {}
            Some(_) => return Err(()),
        }
    }
    Ok(filename)
}

#[async_trait]
impl CatalogAdapter for GranuleCatalog {
    async fn product_type_by_name(&self, name: &str) -> Result<Option<ProductType>, StoreError> {
        self.types.product_type_by_name(name).await
    }

    async fn paged_query(
        &self,
        query: &ProductQuery,
        product_type: &ProductType,
        page_num: u32,
    ) -> Result<ProductPage, StoreError> {
        let page_num = page_num.max(1);

        let Ok(dataset_id) = product_type.id.parse::<i32>() else {
            debug!("non-numeric product type id: [{}]", product_type.id);
            return Ok(ProductPage::empty(page_num));
        };

        let Ok(filename) = filename_filter(query) else {
            debug!("unsatisfiable product query criteria: {:?}", query.criteria);
            return Ok(ProductPage::empty(page_num));
        };

        let count: i64 = match filename {
            Some(filename) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM granule WHERE dataset_id = $1 AND filename = $2",
                )
                .bind(dataset_id)
                .bind(filename)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM granule WHERE dataset_id = $1")
                    .bind(dataset_id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        let offset = (page_num as i64 - 1) * self.page_size as i64;
        let rows: Vec<GranuleRow> = match filename {
            Some(filename) => {
                sqlx::query_as(
                    "SELECT granule_id, filename, dataset_id FROM granule \
                     WHERE dataset_id = $1 AND filename = $2 \
                     ORDER BY granule_id LIMIT $3 OFFSET $4",
                )
                .bind(dataset_id)
                .bind(filename)
                .bind(self.page_size as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT granule_id, filename, dataset_id FROM granule \
                     WHERE dataset_id = $1 ORDER BY granule_id LIMIT $2 OFFSET $3",
                )
                .bind(dataset_id)
                .bind(self.page_size as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(ProductPage {
            page_num,
            total_pages: total_pages(count, self.page_size),
            page_products: rows.into_iter().map(Product::from).collect(),
        })
    }
}
