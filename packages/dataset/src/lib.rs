#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loading for the game play dashboard.
//!
//! A [`loader::DatasetLoader`] fetches a delimited text resource (local file
//! or HTTP URL, optionally gzip-compressed), parses it with the `csv` crate,
//! and coerces the declared numeric columns. Unparseable numeric cells become
//! missing values rather than failing the load; a load that cannot read or
//! parse the resource at all fails with a [`LoadError`] and is never retried.

pub mod loader;
pub mod parsing;
pub mod resource;

pub use game_viz_dataset_models::{ColumnSchema, Dataset, LatLng, Record, RecordId};
pub use loader::DatasetLoader;
pub use resource::{DataResource, DataRoot};

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading the resource or decompressing it failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row is missing a column the schema declares.
    #[error("Column '{column}' not found in {resource}")]
    MissingColumn {
        /// The declared column.
        column: String,
        /// The resource that was loaded.
        resource: String,
    },

    /// The resource has no header row.
    #[error("{resource} contains no header row")]
    NoHeader {
        /// The resource that was loaded.
        resource: String,
    },
}
