#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection state and snapshot pipeline for dashboard views.
//!
//! User events replace the view's [`FilterState`](game_viz_dataset_models::FilterState)
//! wholesale; every accepted event recomputes the charts, map layer, and
//! viewport into a new [`Snapshot`] that replaces the old one as a unit.
//!
//! [`state::Dashboard`] is the synchronous state machine.
//! [`actor::DashboardHandle`] runs one per view on Tokio, loading the dataset
//! in the background and publishing snapshots over a `watch` channel.

pub mod actor;
pub mod event;
pub mod snapshot;
pub mod state;

pub use actor::DashboardHandle;
pub use event::{ALL_REGIONS, DashboardEvent};
pub use snapshot::{
    ChartData, LayerData, LoadStatus, Selection, Snapshot, compute_snapshot, empty_snapshot,
};
pub use state::Dashboard;

/// Errors returned when driving a dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// A cell id that is not part of the current map layer.
    #[error("Unknown cell '{cell_id}' in view '{view}'")]
    UnknownCell {
        /// View id.
        view: String,
        /// The requested cell id.
        cell_id: String,
    },

    /// The view task has stopped.
    #[error("Dashboard for view '{0}' is no longer running")]
    Closed(String),
}
