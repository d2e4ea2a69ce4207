// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The analysis request/response contract.
//!
//! Field names match the analysis backend exactly; these types serialize to
//! and from its JSON bodies unchanged.

use serde::{Deserialize, Serialize};
use timberline_geo::{BoundingBox, LatLon};
use timberline_mesh::TreeSample;

/// Identifies one submitted analysis request.
///
/// Tickets increase monotonically within a [`Viewer`](crate::Viewer).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(pub u64);

/// Where the imagery for an analysis comes from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// The basemap tiles under the area of interest.
    #[default]
    Map,
    /// A previously uploaded aerial image, named by `file_id`.
    Upload,
}

/// What to analyze.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Imagery source.
    #[serde(default)]
    pub mode: AnalysisMode,
    /// Bounds of the area of interest.
    pub bbox: BoundingBox,
    /// Uploaded image to analyze in [`AnalysisMode::Upload`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Outline to clip to: a drawn polygon or a single selected parcel.
    /// `null` for rectangles and multi-parcel selections.
    pub polygon_coords: Option<Vec<LatLon>>,
    /// Forest registry id (compartment-subcompartment) of a single selected
    /// parcel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forest_registry_id: Option<String>,
    /// Selected parcel ids; `null` for drawn regions.
    pub selected_ids: Option<Vec<String>>,
}

impl AnalysisRequest {
    /// A map-mode request for `bbox` with no outline, registry id or
    /// selection.
    pub fn map(bbox: BoundingBox) -> Self {
        Self {
            mode: AnalysisMode::Map,
            bbox,
            file_id: None,
            polygon_coords: None,
            forest_registry_id: None,
            selected_ids: None,
        }
    }

    /// Estimated area of [`bbox`](Self::bbox) in square kilometers.
    pub fn area_km2(&self) -> f64 {
        self.bbox.area_km2()
    }

    /// Serialize to the backend's JSON body.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// How much the backend trusts its estimate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Rough.
    Low,
    /// Usable.
    Medium,
    /// Reliable.
    High,
}

/// What the backend found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Estimated number of trees in the area.
    pub tree_count: u64,
    /// Estimated total stem volume in cubic meters.
    pub volume_m3: f64,
    /// Confidence in the estimate, if reported.
    #[serde(default)]
    pub confidence: Option<Confidence>,
    /// Human-readable notes.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Individually located trees for the mesh.
    #[serde(default)]
    pub tree_points: Vec<TreeSample>,
}

impl AnalysisResult {
    /// Parse the backend's JSON body.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// The external analysis backend.
///
/// Submission is fire-and-forget: the implementation delivers the outcome
/// later by calling [`Viewer::apply_analysis`](crate::Viewer::apply_analysis)
/// with the same ticket.
pub trait AnalysisService {
    /// Start analyzing `request`.
    fn submit(&mut self, ticket: RequestTicket, request: &AnalysisRequest);
}
