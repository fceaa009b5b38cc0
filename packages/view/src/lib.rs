#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard view definitions.
//!
//! A view is one dashboard page: its dataset, map layer, charts, viewport
//! presets, and year slider. Views are plain TOML configs embedded at compile
//! time (see [`registry`]), so adding a page needs no code beyond a new
//! config file.

pub mod definition;
pub mod registry;

pub use definition::{
    ChartConfig, HexagonLayerConfig, HexagonStyle, LayerConfig, MapScope, ScreenGridLayerConfig,
    ViewDefinition, YearSlider, parse_view_toml,
};
pub use registry::{all_views, view_by_id};

/// Errors produced while reading a view definition.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The TOML could not be deserialized.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The definition parsed but is internally inconsistent.
    #[error("View '{view}' is invalid: {reason}")]
    Invalid {
        /// Id of the offending view.
        view: String,
        /// What is wrong with it.
        reason: String,
    },
}
