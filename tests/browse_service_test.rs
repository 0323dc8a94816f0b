//! Browse service integration tests.
//!
//! Exercise the full path-resolution → dispatch → encoding pipeline against
//! in-memory implementations of the store and catalog seams, with a real
//! temporary directory standing in for the policy root.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use dataset_catalog::browse::{BrowseService, FORMAT_HTML, FORMAT_JSON, UNKNOWN_OUT_FORMAT};
use dataset_catalog::catalog::CatalogAdapter;
use dataset_catalog::database::ProductTypeStore;
use dataset_catalog::error::StoreError;
use dataset_catalog::models::{
    DatasetRow, GranuleRow, Product, ProductPage, ProductQuery, ProductType, REPOSITORY_ROOT,
    VERSIONING_BASIC,
};

/// In-memory store over dataset rows. Writes follow the relational store's
/// semantics: ids are store-assigned on insert, the short name doubles as
/// the long name, and lookups keep the *last* matching row.
#[derive(Clone, Default)]
struct FixedStore {
    rows: Arc<Mutex<Vec<DatasetRow>>>,
    fail: bool,
}

fn dataset_row(id: i32, name: &str, long_name: &str, description: &str) -> DatasetRow {
    DatasetRow {
        dataset_id: id,
        short_name: Some(name.to_string()),
        long_name: Some(long_name.to_string()),
        source: None,
        reference_url: None,
        description: Some(description.to_string()),
    }
}

impl FixedStore {
    fn with_rows(rows: Vec<DatasetRow>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            Err(StoreError::from(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProductTypeStore for FixedStore {
    async fn list_product_types(&self) -> Result<Vec<ProductType>, StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.dataset_id.cmp(&a.dataset_id));
        Ok(rows.into_iter().map(ProductType::from).collect())
    }

    async fn product_type_by_id(&self, id: &str) -> Result<Option<ProductType>, StoreError> {
        self.check()?;
        let matches: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.dataset_id.to_string() == id)
            .cloned()
            .collect();
        Ok(matches.into_iter().last().map(ProductType::from))
    }

    async fn product_type_by_name(&self, name: &str) -> Result<Option<ProductType>, StoreError> {
        self.check()?;
        let matches: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.short_name.as_deref() == Some(name))
            .cloned()
            .collect();
        Ok(matches.into_iter().last().map(ProductType::from))
    }

    async fn add_product_type(&self, product_type: &ProductType) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let next_id = rows.iter().map(|r| r.dataset_id).max().unwrap_or(0) + 1;
        rows.push(DatasetRow {
            dataset_id: next_id,
            short_name: Some(product_type.name.clone()),
            long_name: Some(product_type.name.clone()),
            source: None,
            reference_url: None,
            description: Some(product_type.description.clone()),
        });
        Ok(())
    }

    async fn modify_product_type(&self, product_type: &ProductType) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        for row in rows
            .iter_mut()
            .filter(|r| r.dataset_id.to_string() == product_type.id)
        {
            row.short_name = Some(product_type.name.clone());
            row.description = Some(product_type.description.clone());
        }
        Ok(())
    }

    async fn remove_product_type(&self, product_type: &ProductType) -> Result<(), StoreError> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|r| r.dataset_id.to_string() != product_type.id);
        Ok(())
    }
}

/// Catalog over a map of dataset id → granule rows, one page per query.
#[derive(Clone, Default)]
struct FixedCatalog {
    types: FixedStore,
    granules: HashMap<i32, Vec<GranuleRow>>,
}

#[async_trait]
impl CatalogAdapter for FixedCatalog {
    async fn product_type_by_name(&self, name: &str) -> Result<Option<ProductType>, StoreError> {
        self.types.product_type_by_name(name).await
    }

    async fn paged_query(
        &self,
        _query: &ProductQuery,
        product_type: &ProductType,
        page_num: u32,
    ) -> Result<ProductPage, StoreError> {
        let rows = product_type
            .id
            .parse::<i32>()
            .ok()
            .and_then(|id| self.granules.get(&id))
            .cloned()
            .unwrap_or_default();
        Ok(ProductPage {
            page_num: page_num.max(1),
            total_pages: u32::from(!rows.is_empty()),
            page_products: rows.into_iter().map(Product::from).collect(),
        })
    }
}

struct Fixture {
    service: BrowseService<FixedStore, FixedCatalog>,
    _policy_root: TempDir,
}

fn fixture_with(store: FixedStore, catalog: FixedCatalog) -> Fixture {
    let policy_root = TempDir::new().expect("policy root");
    for dir in ["policyA", "policyB", ".hidden"] {
        std::fs::create_dir(policy_root.path().join(dir)).expect("policy dir");
    }
    std::fs::write(policy_root.path().join("stray-file"), b"not a policy").expect("stray file");
    Fixture {
        service: BrowseService::new(store, catalog, policy_root.path()),
        _policy_root: policy_root,
    }
}

fn fixture() -> Fixture {
    let store = FixedStore::with_rows(vec![
        dataset_row(42, "SST", "Sea Surface Temp", "sea surface temperature"),
        dataset_row(43, "TAS", "Surface Air Temp", "near-surface air temperature"),
    ]);
    let granules = HashMap::from([(
        42,
        vec![
            GranuleRow {
                granule_id: 7,
                filename: Some("sst_200001.nc".to_string()),
                dataset_id: 42,
            },
            GranuleRow {
                granule_id: 8,
                filename: Some("sst_200002.nc".to_string()),
                dataset_id: 42,
            },
        ],
    )]);
    fixture_with(
        store.clone(),
        FixedCatalog {
            types: store,
            granules,
        },
    )
}

#[tokio::test]
async fn zero_segments_list_policies_without_hidden_entries() {
    let fx = fixture();
    let html = fx.service.dispatch(&[], FORMAT_HTML, 1).await.unwrap();
    assert!(html.contains("rel=\"/policyA/\""));
    assert!(html.contains("rel=\"/policyB/\""));
    assert!(!html.contains(".hidden"));
    assert!(!html.contains("stray-file"));
}

#[tokio::test]
async fn policy_listing_as_json() {
    let fx = fixture();
    let body = fx.service.dispatch(&[], FORMAT_JSON, 1).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["policies"], json!(["policyA", "policyB"]));
    assert_eq!(parsed["succeed"], json!(true));
}

#[tokio::test]
async fn root_path_resolves_as_the_empty_policy() {
    // "/" tokenizes to one empty segment, so the service answers with the
    // product-type listing for policy "" rather than the policy listing.
    let fx = fixture();
    let html = fx.service.browse("/", FORMAT_HTML, 1).await.unwrap();
    assert!(html.contains("productType"));
    assert!(html.contains("rel=\"//SST/\""));
    assert!(!html.contains("policyA"));
}

#[tokio::test]
async fn one_segment_lists_product_types_newest_first() {
    let fx = fixture();
    let html = fx.service.browse("/policyA", FORMAT_HTML, 1).await.unwrap();
    let tas = html.find("TAS").expect("TAS entry");
    let sst = html.find("SST").expect("SST entry");
    assert!(tas < sst, "listing must order by dataset id descending");
    assert!(html.contains("rel=\"/policyA/SST/\""));
}

#[tokio::test]
async fn product_type_listing_ignores_the_policy_value() {
    let fx = fixture();
    let a = fx.service.browse("/policyA", FORMAT_JSON, 1).await.unwrap();
    let b = fx.service.browse("/other", FORMAT_JSON, 1).await.unwrap();
    let a: serde_json::Value = serde_json::from_str(&a).unwrap();
    let b: serde_json::Value = serde_json::from_str(&b).unwrap();
    assert_eq!(a["productTypes"], b["productTypes"]);
    assert_eq!(a["policy"], json!("policyA"));
    assert_eq!(b["policy"], json!("other"));
}

#[tokio::test]
async fn two_segments_list_one_page_of_products() {
    let fx = fixture();
    let html = fx
        .service
        .browse("/policyA/SST", FORMAT_HTML, 1)
        .await
        .unwrap();
    assert!(html.contains("rel=\"/policyA/SST/7\">sst_200001.nc</a>"));
    assert!(html.contains("rel=\"/policyA/SST/8\">sst_200002.nc</a>"));
}

#[tokio::test]
async fn products_as_json_carry_id_name_and_path() {
    let fx = fixture();
    let body = fx
        .service
        .browse("/policyA/SST", FORMAT_JSON, 1)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["policy"], json!("policyA"));
    assert_eq!(parsed["productType"], json!("SST"));
    assert_eq!(parsed["products"][0]["id"], json!("7"));
    assert_eq!(parsed["products"][0]["name"], json!("sst_200001.nc"));
    assert_eq!(parsed["products"][0]["path"], json!("/policyA/SST/7"));
}

#[tokio::test]
async fn segments_beyond_the_second_are_ignored() {
    let fx = fixture();
    let deep = fx
        .service
        .browse("/policyA/SST/7/extra", FORMAT_JSON, 1)
        .await
        .unwrap();
    let flat = fx.service.browse("/policyA/SST", FORMAT_JSON, 1).await.unwrap();
    assert_eq!(deep, flat);
}

#[tokio::test]
async fn unknown_product_type_degrades_to_an_empty_body() {
    let fx = fixture();
    let body = fx
        .service
        .browse("/policyA/NOPE", FORMAT_HTML, 1)
        .await
        .unwrap();
    assert_eq!(body, "");
}

#[tokio::test]
async fn unknown_format_returns_the_sentinel() {
    let fx = fixture();
    for path in ["/policyA", "/policyA/SST"] {
        let body = fx.service.browse(path, "yaml", 1).await.unwrap();
        assert_eq!(body, UNKNOWN_OUT_FORMAT);
    }
    let body = fx.service.dispatch(&[], "yaml", 1).await.unwrap();
    assert_eq!(body, UNKNOWN_OUT_FORMAT);
}

#[tokio::test]
async fn store_failure_propagates_instead_of_masking() {
    let fx = fixture_with(FixedStore::failing(), FixedCatalog::default());
    let err = fx.service.browse("/policyA", FORMAT_HTML, 1).await;
    assert!(err.is_err(), "a failed query must not look like an empty listing");
}

#[tokio::test]
async fn missing_policy_root_is_a_distinct_error() {
    let store = FixedStore::default();
    let service = BrowseService::new(
        store.clone(),
        FixedCatalog {
            types: store,
            granules: HashMap::new(),
        },
        "/nonexistent/policy/root",
    );
    let err = service.dispatch(&[], FORMAT_HTML, 1).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn by_name_lookup_returns_the_last_matching_row() {
    let store = FixedStore::with_rows(vec![
        dataset_row(1, "SST", "first", "first"),
        dataset_row(2, "SST", "second", "second"),
    ]);
    let picked = store.product_type_by_name("SST").await.unwrap().unwrap();
    assert_eq!(picked.id, "2");
    assert_eq!(picked.long_name, "second");
}

fn new_product_type(name: &str, description: &str) -> ProductType {
    ProductType {
        id: String::new(),
        name: name.to_string(),
        long_name: String::new(),
        description: description.to_string(),
        source: String::new(),
        reference_url: String::new(),
        versioning: VERSIONING_BASIC.to_string(),
        repository_path: REPOSITORY_ROOT.to_string(),
        metadata: BTreeMap::new(),
    }
}

#[tokio::test]
async fn added_product_type_round_trips_by_assigned_id() {
    let store = FixedStore::with_rows(vec![dataset_row(
        42,
        "SST",
        "Sea Surface Temp",
        "sea surface temperature",
    )]);
    store
        .add_product_type(&new_product_type("AOD", "aerosol optical depth"))
        .await
        .unwrap();

    // the assigned id stays in the store; learn it through the by-name lookup
    let stored = store.product_type_by_name("AOD").await.unwrap().unwrap();
    assert_ne!(stored.id, "");
    let by_id = store.product_type_by_id(&stored.id).await.unwrap().unwrap();
    assert_eq!(by_id.name, "AOD");
    assert_eq!(by_id.description, "aerosol optical depth");
}

#[tokio::test]
async fn add_writes_the_short_name_into_both_name_columns() {
    let store = FixedStore::default();
    store
        .add_product_type(&new_product_type("AOD", "aerosol optical depth"))
        .await
        .unwrap();
    let stored = store.product_type_by_name("AOD").await.unwrap().unwrap();
    assert_eq!(stored.long_name, "AOD");
    assert_eq!(stored.metadata["DatasetLongName"], "AOD");
}
