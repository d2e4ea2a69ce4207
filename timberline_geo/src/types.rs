// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point and bounding box types in geographic degrees.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};

use crate::distance::{KM_PER_DEGREE, haversine_distance_m};

/// A geographic position in degrees.
///
/// `lat` grows northwards and `lon` eastwards. When converted to [`kurbo`]
/// types, longitude maps to `x` and latitude to `y`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    /// Create a new position.
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in meters.
    #[inline]
    pub fn distance_to(self, other: Self) -> f64 {
        haversine_distance_m(self, other)
    }

    /// Convert to a [`kurbo::Point`] with `x = lon`, `y = lat`.
    #[inline]
    pub const fn to_point(self) -> Point {
        Point::new(self.lon, self.lat)
    }

    /// Convert from a [`kurbo::Point`] with `x = lon`, `y = lat`.
    #[inline]
    pub const fn from_point(pt: Point) -> Self {
        Self::new(pt.y, pt.x)
    }
}

impl From<(f64, f64)> for LatLon {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

/// Axis-aligned box in geographic degrees.
///
/// Always satisfies `min_lat <= max_lat` and `min_lon <= max_lon` when built
/// through [`BoundingBox::new`] or [`BoundingBox::from_corners`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Western edge.
    pub min_lon: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Eastern edge.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a box from edges, swapping any inverted pair.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat: min_lat.min(max_lat),
            min_lon: min_lon.min(max_lon),
            max_lat: min_lat.max(max_lat),
            max_lon: min_lon.max(max_lon),
        }
    }

    /// The box spanned by two opposite corners, in any order.
    pub fn from_corners(a: LatLon, b: LatLon) -> Self {
        Self::new(a.lat, a.lon, b.lat, b.lon)
    }

    /// A box of the given angular size centered on `center`.
    pub fn centered(center: LatLon, lat_span: f64, lon_span: f64) -> Self {
        let half_lat = lat_span / 2.0;
        let half_lon = lon_span / 2.0;
        Self::new(
            center.lat - half_lat,
            center.lon - half_lon,
            center.lat + half_lat,
            center.lon + half_lon,
        )
    }

    /// The smallest box enclosing every point, or `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = LatLon>>(points: I) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let init = Self::from_corners(first, first);
        Some(it.fold(init, |acc, p| acc.include(p)))
    }

    /// Grow the box to include `p`.
    #[must_use]
    pub fn include(self, p: LatLon) -> Self {
        Self {
            min_lat: self.min_lat.min(p.lat),
            min_lon: self.min_lon.min(p.lon),
            max_lat: self.max_lat.max(p.lat),
            max_lon: self.max_lon.max(p.lon),
        }
    }

    /// The smallest box enclosing both boxes (componentwise min/max).
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lat: self.max_lat.max(other.max_lat),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }

    /// Grow each edge outwards by the given angular margins.
    #[must_use]
    pub fn expand(self, lat_margin: f64, lon_margin: f64) -> Self {
        Self::new(
            self.min_lat - lat_margin,
            self.min_lon - lon_margin,
            self.max_lat + lat_margin,
            self.max_lon + lon_margin,
        )
    }

    /// Whether the point lies inside or on the edge of the box.
    #[inline]
    pub fn contains(&self, p: LatLon) -> bool {
        self.min_lat <= p.lat
            && p.lat <= self.max_lat
            && self.min_lon <= p.lon
            && p.lon <= self.max_lon
    }

    /// Center of the box.
    pub fn center(&self) -> LatLon {
        LatLon::new(
            0.5 * (self.min_lat + self.max_lat),
            0.5 * (self.min_lon + self.max_lon),
        )
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees.
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Corners in south-west, north-west, north-east, south-east order.
    pub fn corners(&self) -> [LatLon; 4] {
        [
            LatLon::new(self.min_lat, self.min_lon),
            LatLon::new(self.max_lat, self.min_lon),
            LatLon::new(self.max_lat, self.max_lon),
            LatLon::new(self.min_lat, self.max_lon),
        ]
    }

    /// Approximate area in square kilometers.
    ///
    /// Uses the equirectangular approximation: 111 km per degree of latitude
    /// and `111 * cos(mid latitude)` km per degree of longitude.
    pub fn area_km2(&self) -> f64 {
        let mid_lat = self.center().lat.to_radians();
        let lat_km = self.lat_span() * KM_PER_DEGREE;
        let lon_km = self.lon_span() * KM_PER_DEGREE * mid_lat.cos();
        lat_km * lon_km
    }

    /// Convert to a [`kurbo::Rect`] with `x = lon`, `y = lat`.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }

    /// Convert from a [`kurbo::Rect`] with `x = lon`, `y = lat`.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.y0, rect.x0, rect.y1, rect.x1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_inverted_edges() {
        let b = BoundingBox::new(1.0, 3.0, 0.0, 2.0);
        assert_eq!(b, BoundingBox::new(0.0, 2.0, 1.0, 3.0));
        assert!(b.min_lat <= b.max_lat && b.min_lon <= b.max_lon);
    }

    #[test]
    fn union_is_componentwise() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(2.0, 2.0, 3.0, 3.0);
        assert_eq!(a.union(b), BoundingBox::new(0.0, 0.0, 3.0, 3.0));
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(BoundingBox::from_points(core::iter::empty()).is_none());
        let b = BoundingBox::from_points([LatLon::new(1.0, 5.0), LatLon::new(-1.0, 2.0)])
            .expect("two points");
        assert_eq!(b, BoundingBox::new(-1.0, 2.0, 1.0, 5.0));
    }

    #[test]
    fn corners_run_sw_nw_ne_se() {
        let b = BoundingBox::new(10.0, 20.0, 11.0, 21.0);
        assert_eq!(
            b.corners(),
            [
                LatLon::new(10.0, 20.0),
                LatLon::new(11.0, 20.0),
                LatLon::new(11.0, 21.0),
                LatLon::new(10.0, 21.0),
            ]
        );
    }

    #[test]
    fn rect_round_trip_keeps_axes() {
        let b = BoundingBox::new(43.0, 141.0, 43.5, 141.5);
        let r = b.to_rect();
        assert_eq!(r.x0, 141.0);
        assert_eq!(r.y1, 43.5);
        assert_eq!(BoundingBox::from_rect(r), b);
    }

    #[test]
    fn area_at_equator_is_square_degrees_times_111_squared() {
        let b = BoundingBox::new(-0.5, -0.5, 0.5, 0.5);
        let area = b.area_km2();
        assert!((area - 111.0 * 111.0).abs() < 1e-6, "area was {area}");
    }

    #[test]
    fn point_maps_lon_to_x() {
        let p = LatLon::new(43.2, 141.7).to_point();
        assert_eq!(p, Point::new(141.7, 43.2));
        assert_eq!(LatLon::from_point(Point::new(-70.0, 12.5)), LatLon::new(12.5, -70.0));
    }

    #[test]
    fn contains_includes_edges() {
        let b = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(b.contains(LatLon::new(0.0, 0.5)));
        assert!(b.contains(LatLon::new(1.0, 1.0)));
        assert!(!b.contains(LatLon::new(1.1, 0.5)));
    }
}
