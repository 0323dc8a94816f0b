//! Error types for the catalog adapter.
//!
//! "Not found" is never an error here: lookups return `Option` and listings
//! return empty collections. The enums below cover the failures callers must
//! be able to tell apart from an empty result.

use std::path::PathBuf;

use thiserror::Error;

/// Failure at the data-access boundary (connection pool or query execution).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not obtain a catalog connection: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("catalog query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if matches!(
            e,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
        ) {
            Self::Unavailable(e)
        } else {
            Self::Query(e)
        }
    }
}

/// Failure while answering a browse request.
#[derive(Error, Debug)]
pub enum BrowseError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to read policy root {}: {source}", path.display())]
    PolicyRoot {
        path: PathBuf,
        source: std::io::Error,
    },
}
