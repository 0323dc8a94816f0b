//! Domain entities and the row mapper.
//!
//! The `*Row` structs mirror the relational schema column-for-column; the
//! `From` impls are pure conversions into the file-manager entities. A null
//! column never produces an absent field: every string defaults to empty,
//! and the fixed fields (versioning, repository path, product structure,
//! transfer status) are constants because this adapter never relocates or
//! restructures files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Versioning strategy stamped on every product type.
pub const VERSIONING_BASIC: &str = "basic";
/// Repository path stamped on every product type; files are never moved.
pub const REPOSITORY_ROOT: &str = "file:///tmp";
/// Structure stamped on every product.
pub const STRUCTURE_FLAT: &str = "flat";
/// Transfer status stamped on every product.
pub const STATUS_RECEIVED: &str = "received";

/// The six descriptive-metadata keys every product type carries.
pub const METADATA_KEYS: [&str; 6] = [
    "DatasetId",
    "DatasetShortName",
    "DatasetLongName",
    "Description",
    "Source",
    "ReferenceURL",
];

/// A descriptive element declared for a product type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A named category of products, backed by one `dataset` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: String,
    pub name: String,
    pub long_name: String,
    pub description: String,
    pub source: String,
    pub reference_url: String,
    pub versioning: String,
    pub repository_path: String,
    /// Always populated with the six [`METADATA_KEYS`], empty-string valued
    /// where the backing column is null.
    pub metadata: BTreeMap<String, String>,
}

/// One file-like item belonging to a product type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub structure: String,
    pub transfer_status: String,
    pub product_type_id: String,
}

/// One bounded slice of a product listing, 1-based page numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub page_num: u32,
    pub total_pages: u32,
    pub page_products: Vec<Product>,
}

impl ProductPage {
    pub fn empty(page_num: u32) -> Self {
        Self {
            page_num,
            total_pages: 0,
            page_products: Vec::new(),
        }
    }
}

/// Selection criteria for a paged product query.
///
/// The browse service always issues an unconstrained query; criteria exist
/// for callers that filter on a stored element value.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub criteria: Vec<TermCriterion>,
}

/// Equality match on one element of a product's metadata.
#[derive(Debug, Clone)]
pub struct TermCriterion {
    pub element: String,
    pub value: String,
}

/// One row of the `dataset` table.
#[derive(Debug, Clone, FromRow)]
pub struct DatasetRow {
    pub dataset_id: i32,
    #[sqlx(rename = "shortName")]
    pub short_name: Option<String>,
    #[sqlx(rename = "longName")]
    pub long_name: Option<String>,
    pub source: Option<String>,
    #[sqlx(rename = "referenceURL")]
    pub reference_url: Option<String>,
    pub description: Option<String>,
}

/// One row of the `granule` table.
#[derive(Debug, Clone, FromRow)]
pub struct GranuleRow {
    pub granule_id: i32,
    pub filename: Option<String>,
    pub dataset_id: i32,
}

/// One row of the `parameter` table.
#[derive(Debug, Clone, FromRow)]
pub struct ParameterRow {
    pub parameter_id: i32,
    #[sqlx(rename = "shortName")]
    pub short_name: Option<String>,
    pub description: Option<String>,
}

impl From<DatasetRow> for ProductType {
    fn from(row: DatasetRow) -> Self {
        let id = row.dataset_id.to_string();
        let name = row.short_name.unwrap_or_default();
        let long_name = row.long_name.unwrap_or_default();
        let description = row.description.unwrap_or_default();
        let source = row.source.unwrap_or_default();
        let reference_url = row.reference_url.unwrap_or_default();

        let mut metadata = BTreeMap::new();
        metadata.insert("DatasetId".to_string(), id.clone());
        metadata.insert("DatasetShortName".to_string(), name.clone());
        metadata.insert("DatasetLongName".to_string(), long_name.clone());
        metadata.insert("Description".to_string(), description.clone());
        metadata.insert("Source".to_string(), source.clone());
        metadata.insert("ReferenceURL".to_string(), reference_url.clone());

        Self {
            id,
            name,
            long_name,
            description,
            source,
            reference_url,
            versioning: VERSIONING_BASIC.to_string(),
            repository_path: REPOSITORY_ROOT.to_string(),
            metadata,
        }
    }
}

impl From<GranuleRow> for Product {
    fn from(row: GranuleRow) -> Self {
        Self {
            id: row.granule_id.to_string(),
            name: row.filename.unwrap_or_default(),
            structure: STRUCTURE_FLAT.to_string(),
            transfer_status: STATUS_RECEIVED.to_string(),
            product_type_id: row.dataset_id.to_string(),
        }
    }
}

impl From<ParameterRow> for Element {
    fn from(row: ParameterRow) -> Self {
        Self {
            id: row.parameter_id.to_string(),
            name: row.short_name.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
        }
    }
}
