// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simple polygons and the ray-casting inside test.

use alloc::vec::Vec;
use core::fmt;

use crate::types::{BoundingBox, LatLon};

/// Minimum number of vertices of a [`Polygon`].
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Errors produced when building geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeometryError {
    /// A polygon needs at least [`MIN_POLYGON_VERTICES`] vertices.
    TooFewVertices {
        /// Number of vertices that were supplied.
        found: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewVertices { found } => write!(
                f,
                "a polygon needs at least {MIN_POLYGON_VERTICES} vertices, got {found}"
            ),
        }
    }
}

impl core::error::Error for GeometryError {}

/// Ray-casting point-in-polygon test over a closed vertex ring.
///
/// A horizontal ray is cast from `p` towards increasing longitude. Edge
/// `(i, j)` (with `j` the previous vertex, wrapping) counts as a crossing when
/// exactly one endpoint lies strictly north of `p` and the edge's longitude at
/// `p.lat` is greater than `p.lon`. The point is inside when the number of
/// crossings is odd.
///
/// The strict comparison on one side is the usual half-open convention: a
/// point on a western or southern edge tests inside while one on an eastern or
/// northern edge tests outside, for an axis-aligned ring. Results are
/// deterministic for identical input. Rings with fewer than three vertices
/// never contain anything. Self-intersecting rings are accepted but the result
/// for them carries no geometric meaning.
pub fn point_in_ring(p: LatLon, ring: &[LatLon]) -> bool {
    let n = ring.len();
    if n < MIN_POLYGON_VERTICES {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].lon, ring[i].lat);
        let (xj, yj) = (ring[j].lon, ring[j].lat);
        if (yi > p.lat) != (yj > p.lat) {
            let x_cross = (xj - xi) * (p.lat - yi) / (yj - yi) + xi;
            if p.lon < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A closed polygon with at least three vertices.
///
/// The ring is implicitly closed: the last vertex connects back to the first,
/// so callers should not repeat the first vertex. Winding order is not
/// significant and self-intersection is not validated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<LatLon>", into = "Vec<LatLon>"))]
pub struct Polygon {
    vertices: Vec<LatLon>,
}

impl Polygon {
    /// Build a polygon, rejecting rings with fewer than three vertices.
    pub fn new(vertices: impl Into<Vec<LatLon>>) -> Result<Self, GeometryError> {
        let vertices = vertices.into();
        if vertices.len() < MIN_POLYGON_VERTICES {
            return Err(GeometryError::TooFewVertices {
                found: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    /// The rectangle outline of a bounding box (SW, NW, NE, SE).
    pub fn from_bounding_box(bbox: &BoundingBox) -> Self {
        Self {
            vertices: bbox.corners().to_vec(),
        }
    }

    /// The vertex ring.
    pub fn vertices(&self) -> &[LatLon] {
        &self.vertices
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Consume the polygon and return its vertices.
    pub fn into_vertices(self) -> Vec<LatLon> {
        self.vertices
    }
}

impl TryFrom<Vec<LatLon>> for Polygon {
    type Error = GeometryError;

    fn try_from(vertices: Vec<LatLon>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<Polygon> for Vec<LatLon> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices
    }
}

/// A closed geographic region that can answer inside queries.
///
/// Implemented for [`Polygon`] and [`BoundingBox`] so that selection
/// boundaries and viewport inputs can be mixed freely.
pub trait Region {
    /// Whether `p` lies inside the region.
    fn contains_point(&self, p: LatLon) -> bool;

    /// The smallest box enclosing the region.
    fn bounding_box(&self) -> BoundingBox;
}

impl Region for Polygon {
    fn contains_point(&self, p: LatLon) -> bool {
        point_in_ring(p, &self.vertices)
    }

    fn bounding_box(&self) -> BoundingBox {
        let first = self.vertices[0];
        self.vertices[1..]
            .iter()
            .fold(BoundingBox::from_corners(first, first), |acc, v| {
                acc.include(*v)
            })
    }
}

impl Region for BoundingBox {
    fn contains_point(&self, p: LatLon) -> bool {
        self.contains(p)
    }

    fn bounding_box(&self) -> BoundingBox {
        *self
    }
}

impl<R: Region + ?Sized> Region for &R {
    fn contains_point(&self, p: LatLon) -> bool {
        (**self).contains_point(p)
    }

    fn bounding_box(&self) -> BoundingBox {
        (**self).bounding_box()
    }
}
