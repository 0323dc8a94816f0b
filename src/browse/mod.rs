//! Virtual-path resolution and the browse state machine.
//!
//! A browse request addresses the catalog with a slash-delimited virtual
//! path of up to two meaningful segments, `policy/productType`. The number
//! of resolved segments selects the response: the policy listing (none),
//! the product-type listing (one) or one page of products (two).

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::catalog::CatalogAdapter;
use crate::database::ProductTypeStore;
use crate::error::BrowseError;
use crate::models::ProductQuery;

pub mod encode;

pub const FORMAT_HTML: &str = "html";
pub const FORMAT_JSON: &str = "json";
/// Sentinel body returned for an unrecognized output format.
pub const UNKNOWN_OUT_FORMAT: &str = "NOT_SUPPORTED";

/// Splits a virtual path into its segments.
///
/// One leading `/` is stripped unless the path is exactly `/`; the
/// remainder splits on `/` with interior empty segments preserved and
/// trailing ones dropped. At least one segment always survives, so the
/// root path yields a single empty segment — the browse service resolves
/// that as policy `""`, not as "no policy given". Callers wanting the
/// policy listing must dispatch with no segments at all.
pub fn tokenize_virtual_path(path: &str) -> Vec<String> {
    let vpath = if path.starts_with('/') && path.len() > 1 {
        &path[1..]
    } else {
        path
    };
    let mut segments: Vec<String> = vpath.split('/').map(str::to_string).collect();
    while segments.len() > 1 && segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    debug!("origPath: [{}], pathToks: {:?}", path, segments);
    segments
}

/// Answers browse requests by depth of the resolved virtual path.
pub struct BrowseService<S, C> {
    store: S,
    catalog: C,
    policy_root: PathBuf,
}

impl<S, C> BrowseService<S, C>
where
    S: ProductTypeStore,
    C: CatalogAdapter,
{
    pub fn new(store: S, catalog: C, policy_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            catalog,
            policy_root: policy_root.into(),
        }
    }

    /// Resolves `path` and renders the matching listing in `format`.
    pub async fn browse(
        &self,
        path: &str,
        format: &str,
        page_num: u32,
    ) -> Result<String, BrowseError> {
        let segments = tokenize_virtual_path(path);
        self.dispatch(&segments, format, page_num).await
    }

    /// The state machine over path depth. Only the first two segments are
    /// meaningful; anything deeper is ignored.
    pub async fn dispatch(
        &self,
        segments: &[String],
        format: &str,
        page_num: u32,
    ) -> Result<String, BrowseError> {
        let policy = segments.first().map(String::as_str);
        let product_type = segments.get(1).map(String::as_str);

        match (policy, product_type) {
            (Some(policy), Some(product_type)) => {
                self.products_for_product_type(policy, product_type, format, page_num)
                    .await
            }
            (Some(policy), None) => self.product_types_for_policy(policy, format).await,
            (None, _) => self.policies(format),
        }
    }

    /// Immediate subdirectories of the policy root, hidden entries and
    /// plain files excluded.
    fn policies(&self, format: &str) -> Result<String, BrowseError> {
        let policies = self.list_policy_dirs()?;
        Ok(match format {
            FORMAT_HTML => encode::policies_as_html(&policies),
            FORMAT_JSON => encode::policies_as_json(&policies),
            _ => UNKNOWN_OUT_FORMAT.to_string(),
        })
    }

    /// The policy segment names the browse location only; it never filters
    /// the product-type listing.
    async fn product_types_for_policy(
        &self,
        policy: &str,
        format: &str,
    ) -> Result<String, BrowseError> {
        let names: Vec<String> = self
            .store
            .list_product_types()
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        Ok(match format {
            FORMAT_HTML => encode::product_types_as_html(policy, &names),
            FORMAT_JSON => encode::product_types_as_json(policy, &names),
            _ => UNKNOWN_OUT_FORMAT.to_string(),
        })
    }

    async fn products_for_product_type(
        &self,
        policy: &str,
        product_type_name: &str,
        format: &str,
        page_num: u32,
    ) -> Result<String, BrowseError> {
        let Some(product_type) = self.catalog.product_type_by_name(product_type_name).await?
        else {
            warn!("no product type named [{}]", product_type_name);
            return Ok(String::new());
        };
        let page = self
            .catalog
            .paged_query(&ProductQuery::default(), &product_type, page_num)
            .await?;
        Ok(match format {
            FORMAT_HTML => encode::products_as_html(&page, policy, product_type_name),
            FORMAT_JSON => encode::products_as_json(&page, policy, product_type_name),
            _ => UNKNOWN_OUT_FORMAT.to_string(),
        })
    }

    fn list_policy_dirs(&self) -> Result<Vec<String>, BrowseError> {
        let entries =
            std::fs::read_dir(&self.policy_root).map_err(|source| BrowseError::PolicyRoot {
                path: self.policy_root.clone(),
                source,
            })?;

        let mut policies = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| BrowseError::PolicyRoot {
                path: self.policy_root.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if entry.path().is_dir() {
                policies.push(name);
            }
        }
        // filesystem order is unspecified; sort for stable output
        policies.sort();
        Ok(policies)
    }
}
