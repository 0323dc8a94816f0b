//! HTTP surface: the browse endpoint plus a small JSON API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::browse::BrowseService;
use crate::catalog::GranuleCatalog;
use crate::config::CatalogConfig;
use crate::database::{DatabaseManager, DatasetRepository, ProductTypeStore};
use crate::models::Element;
use crate::validation::{ParameterValidationSource, ValidationSource};

#[derive(Clone)]
pub struct AppState {
    pub browse: Arc<BrowseService<DatasetRepository, GranuleCatalog>>,
    pub store: Arc<DatasetRepository>,
    pub validation: Arc<ParameterValidationSource>,
}

impl AppState {
    pub fn new(db: &DatabaseManager, config: &CatalogConfig) -> Self {
        let browse = BrowseService::new(
            db.dataset_repository(),
            db.granule_catalog(config.page_size),
            config.policy_root.clone(),
        );
        Self {
            browse: Arc::new(browse),
            store: Arc::new(db.dataset_repository()),
            validation: Arc::new(db.validation_source()),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(rename = "pageNum", default = "default_page_num")]
    pub page_num: u32,
}

fn default_path() -> String {
    "/".to_string()
}

fn default_format() -> String {
    crate::browse::FORMAT_HTML.to_string()
}

fn default_page_num() -> u32 {
    1
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/policy/browse", get(browse_catalog))
        .route("/api/health", get(health_check))
        .route("/api/product-types/:name/elements", get(product_type_elements))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

/// Browse the catalog by virtual path.
///
/// A store or catalog failure degrades to an empty body with a server error
/// status; "nothing at this path" stays an empty listing with status 200.
async fn browse_catalog(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> (StatusCode, String) {
    match state
        .browse
        .browse(&params.path, &params.format, params.page_num)
        .await
    {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            warn!("browse failed for path [{}]: {}", params.path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::ok("OK".to_string()))
}

/// Descriptive elements declared for the named product type.
async fn product_type_elements(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> (StatusCode, Json<ApiResponse<Vec<Element>>>) {
    let product_type = match state.store.product_type_by_name(&name).await {
        Ok(Some(product_type)) => product_type,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::err(format!("no product type named {name}"))),
            )
        }
        Err(e) => {
            warn!("product type lookup failed for [{}]: {}", name, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(e.to_string())),
            );
        }
    };

    match state.validation.elements_for_product_type(&product_type).await {
        Ok(elements) => (StatusCode::OK, Json(ApiResponse::ok(elements))),
        Err(e) => {
            warn!("element listing failed for [{}]: {}", name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(e.to_string())),
            )
        }
    }
}
