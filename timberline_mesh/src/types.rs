// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use timberline_geo::{BoundingBox, LatLon};

/// Broad botanical class of a tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TreeClass {
    /// Needle-leaved.
    Coniferous,
    /// Broad-leaved.
    Broadleaf,
}

/// One measured tree.
///
/// With the `serde` feature the field names follow the analysis backend:
/// `lat`, `lon`, `tree_type`, `dbh` and `volume`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeSample {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Diameter at breast height in centimeters.
    #[cfg_attr(feature = "serde", serde(rename = "dbh"))]
    pub diameter_cm: f64,
    /// Stem volume in cubic meters.
    #[cfg_attr(feature = "serde", serde(rename = "volume"))]
    pub volume_m3: f64,
    /// Botanical class.
    #[cfg_attr(feature = "serde", serde(rename = "tree_type"))]
    pub class: TreeClass,
}

impl TreeSample {
    /// Position of the sample.
    pub const fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// How wide each mesh cell is.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MeshSize {
    /// A fixed edge length in meters.
    Fixed(f64),
    /// Derive the edge length from the spacing of the first two samples,
    /// using `fallback` meters when that is not possible.
    Estimated {
        /// Edge length in meters when fewer than two samples exist or the
        /// first two coincide.
        fallback: f64,
    },
}

impl MeshSize {
    /// Default fixed edge length in meters.
    pub const DEFAULT_FIXED_M: f64 = 500.0;
    /// Default fallback for [`MeshSize::Estimated`] in meters.
    pub const DEFAULT_ESTIMATE_FALLBACK_M: f64 = 10.0;

    /// Estimation with the default fallback.
    pub const ESTIMATED: Self = Self::Estimated {
        fallback: Self::DEFAULT_ESTIMATE_FALLBACK_M,
    };
}

impl Default for MeshSize {
    fn default() -> Self {
        Self::Fixed(Self::DEFAULT_FIXED_M)
    }
}

/// One rendered cell of the mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshCell {
    /// Cell extent.
    pub bounds: BoundingBox,
    /// Number of samples aggregated into the cell.
    pub count: usize,
    /// Total volume of those samples in cubic meters.
    pub volume_m3: f64,
    /// Class with the most samples in the cell.
    pub dominant_class: TreeClass,
    /// Fill opacity in `[0.4, 0.95]`, scaled by volume.
    pub opacity: f64,
}

/// Output of one aggregation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshLayer {
    /// Kept cells, in sample order.
    pub cells: Vec<MeshCell>,
    /// Extent of every sample cell before clipping, for the neutral layer
    /// drawn underneath. `None` when there were no samples.
    pub backdrop: Option<BoundingBox>,
    /// Edge length in meters that was used.
    pub cell_size_m: f64,
    /// Cell height in degrees.
    pub lat_step: f64,
    /// Cell width in degrees.
    pub lon_step: f64,
}

impl MeshLayer {
    /// Whether no cell survived.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
