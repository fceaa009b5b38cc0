#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the game play visualization server.
//!
//! Snapshots are served as-is from the dashboard crate; the types here cover
//! the remaining endpoints.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// One entry of the view list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiViewSummary {
    /// View id, used in `/api/views/{id}`.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Dataset load state (`loading`, `ready`, `failed`).
    pub status: String,
    /// Records in the loaded dataset.
    pub record_count: usize,
    /// Whether the view has a region dropdown.
    pub has_regions: bool,
}

/// Region dropdown contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegions {
    /// View id.
    pub view_id: String,
    /// Dropdown entries; the unfiltered entry comes first.
    pub regions: Vec<String>,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
