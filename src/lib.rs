//! Dataset catalog adapter and browse service.
//!
//! Adapts a relational schema of scientific datasets and their files
//! ("granules") to the file-manager catalog model, and exposes that catalog
//! through a hierarchical, paginated browse API addressed by virtual paths
//! of the form `policy/productType/product`.
//!
//! The crate is organised around three capability seams, each injected at
//! construction time rather than discovered at runtime:
//!
//! - [`database::ProductTypeStore`] — CRUD over the `dataset` table.
//! - [`catalog::CatalogAdapter`] — product lookup and paged granule queries.
//! - [`validation::ValidationSource`] — descriptive elements declared for a
//!   product type in the `parameter` table.
//!
//! [`browse::BrowseService`] orchestrates the three behind the HTTP routes
//! in [`api`].

pub mod api;
pub mod browse;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod validation;

pub use browse::BrowseService;
pub use config::CatalogConfig;
pub use database::{DatabaseManager, DatasetRepository, ProductTypeStore};
pub use error::{BrowseError, StoreError};
