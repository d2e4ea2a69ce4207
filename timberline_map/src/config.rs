// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use serde::{Deserialize, Serialize};
use timberline_draw::{DrawConfig, Millis};
use timberline_mesh::MeshSize;
use timberline_viewport::FitOptions;

use crate::error::ConfigError;

/// Tunables for a [`Viewer`](crate::Viewer).
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```rust
/// use timberline_map::ViewerConfig;
/// use timberline_mesh::MeshSize;
///
/// let cfg = ViewerConfig::from_json_str(r#"{ "mesh_size": { "fixed": 20.0 } }"#).unwrap();
/// assert_eq!(cfg.mesh_size, MeshSize::Fixed(20.0));
/// assert_eq!(cfg.min_rectangle_m, 100.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Cell size for the tree mesh.
    pub mesh_size: MeshSize,
    /// Shortest accepted rectangle drag in meters.
    pub min_rectangle_m: f64,
    /// Double-click window for polygon drawing in milliseconds.
    pub double_click_window_ms: Millis,
    /// Commit polygons on native double-click events.
    pub native_double_click: bool,
    /// Fit used for selections and search hits.
    pub selection_fit: FitOptions,
    /// Fit used for aerial image footprints.
    pub image_fit: FitOptions,
    /// Fit used for administrative regions.
    pub region_fit: FitOptions,
}

impl ViewerConfig {
    /// Parse a JSON document, filling absent keys with defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The drawing thresholds.
    pub fn draw_config(&self) -> DrawConfig {
        DrawConfig {
            min_rectangle_m: self.min_rectangle_m,
            double_click_window_ms: self.double_click_window_ms,
            native_double_click: self.native_double_click,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let draw = DrawConfig::default();
        Self {
            mesh_size: MeshSize::default(),
            min_rectangle_m: draw.min_rectangle_m,
            double_click_window_ms: draw.double_click_window_ms,
            native_double_click: draw.native_double_click,
            selection_fit: FitOptions::SELECTION,
            image_fit: FitOptions::IMAGE,
            region_fit: FitOptions::REGION,
        }
    }
}
