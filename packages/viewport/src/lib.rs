#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Viewport controller.
//!
//! The map camera is never authored directly: [`derive_viewport`] computes it
//! from the active [`FilterState`], the records in scope, and the view's
//! [`ViewportSettings`]. Any scope without a usable position falls back to
//! the view's default camera, so the result never contains NaN.

use game_viz_dataset_models::{FilterState, LatLng, Record};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Map camera state handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Zoom level.
    pub zoom: f64,
    /// Camera pitch in degrees.
    #[serde(default)]
    pub pitch: f64,
    /// Camera bearing in degrees.
    #[serde(default)]
    pub bearing: f64,
    /// Lowest zoom the user may reach.
    pub min_zoom: Option<f64>,
    /// Highest zoom the user may reach.
    pub max_zoom: Option<f64>,
    /// Camera transition duration in milliseconds (0 = jump).
    #[serde(default)]
    pub transition_duration_ms: u32,
}

impl ViewportState {
    /// The nationwide camera used by the US-level view.
    #[must_use]
    pub const fn nationwide() -> Self {
        Self {
            latitude: 37.0902,
            longitude: -95.7129,
            zoom: 4.0,
            pitch: 40.0,
            bearing: 0.0,
            min_zoom: Some(2.0),
            max_zoom: Some(12.0),
            transition_duration_ms: 0,
        }
    }

    /// Returns this camera recentered on `center`.
    #[must_use]
    pub const fn focused(self, center: LatLng, zoom: f64, transition_duration_ms: u32) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            zoom,
            transition_duration_ms,
            ..self
        }
    }
}

/// How the camera center is chosen for a filtered scope.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CenterStrategy {
    /// Arithmetic mean of all positioned records in scope.
    #[default]
    Mean,
    /// The first positioned record in scope (for datasets that carry one
    /// representative coordinate per region across several rows).
    FirstMatch,
}

/// Per-view camera configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ViewportSettings {
    /// Camera for the unfiltered scope and every fallback.
    pub default: ViewportState,
    /// Zoom used when focusing on a filtered scope.
    pub focus_zoom: f64,
    /// Transition duration when focusing, in milliseconds.
    #[serde(default)]
    pub transition_duration_ms: u32,
    /// How the focus center is computed.
    #[serde(default)]
    pub center: CenterStrategy,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            default: ViewportState::nationwide(),
            focus_zoom: 6.0,
            transition_duration_ms: 1000,
            center: CenterStrategy::FirstMatch,
        }
    }
}

/// Center of the positioned records per `strategy`, or `None` when no
/// record in `records` has a position.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn scope_center(records: &[&Record], strategy: CenterStrategy) -> Option<LatLng> {
    let mut positions = records.iter().filter_map(|r| r.position);
    match strategy {
        CenterStrategy::FirstMatch => positions.next(),
        CenterStrategy::Mean => {
            let (lat, lng, n) = positions.fold((0.0, 0.0, 0_u64), |(lat, lng, n), p| {
                (lat + p.latitude, lng + p.longitude, n + 1)
            });
            if n == 0 {
                return None;
            }
            LatLng::new(lat / n as f64, lng / n as f64)
        }
    }
}

/// Derives the camera for `filter` over the records in scope.
///
/// `records` must already be restricted to the scope of `filter`. The
/// unfiltered scope always yields `settings.default`, as does a filtered
/// scope with no positioned records.
#[must_use]
pub fn derive_viewport(
    filter: &FilterState,
    records: &[&Record],
    settings: &ViewportSettings,
) -> ViewportState {
    if filter.is_all() {
        return settings.default;
    }
    scope_center(records, settings.center).map_or(settings.default, |center| {
        settings
            .default
            .focused(center, settings.focus_zoom, settings.transition_duration_ms)
    })
}
