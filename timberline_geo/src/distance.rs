// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distances and degree/meter conversions.
//!
//! Two models are used side by side: great-circle distance on a sphere for
//! gesture thresholds, and the flat "111 km per degree" approximation for
//! sizing mesh cells and estimating areas. No other projection is supported.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::types::LatLon;

/// Mean Earth radius in meters used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Kilometers per degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Great-circle distance between two positions in meters (haversine).
pub fn haversine_distance_m(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let sin_dlat = ((lat2 - lat1) / 2.0).sin();
    let sin_dlon = ((b.lon - a.lon).to_radians() / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Meters spanned by one degree of longitude at `lat` degrees.
#[inline]
pub fn meters_per_degree_lon(lat: f64) -> f64 {
    METERS_PER_DEGREE * lat.to_radians().cos()
}

/// Latitude span in degrees covering `meters`.
#[inline]
pub fn lat_degrees_for(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Longitude span in degrees covering `meters` at `lat` degrees.
#[inline]
pub fn lon_degrees_for(meters: f64, lat: f64) -> f64 {
    meters / meters_per_degree_lon(lat)
}

/// Planar separation of two positions in meters under the flat approximation,
/// measured separately along each axis as `(north_south, east_west)`.
///
/// The east-west component is scaled by the cosine of `a`'s latitude.
pub fn axis_separation_m(a: LatLon, b: LatLon) -> (f64, f64) {
    let ns = (a.lat - b.lat).abs() * METERS_PER_DEGREE;
    let ew = (a.lon - b.lon).abs() * meters_per_degree_lon(a.lat);
    (ns, ew)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let p = LatLon::new(43.06, 141.35);
        assert_eq!(haversine_distance_m(p, p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_distance_m(LatLon::new(0.0, 0.0), LatLon::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 1.0, "distance was {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = LatLon::new(43.0, 141.0);
        let b = LatLon::new(43.01, 141.02);
        assert!((haversine_distance_m(a, b) - haversine_distance_m(b, a)).abs() < 1e-9);
    }

    #[test]
    fn longitude_degrees_widen_towards_poles() {
        let at_equator = lon_degrees_for(500.0, 0.0);
        let at_60 = lon_degrees_for(500.0, 60.0);
        assert!((at_equator - lat_degrees_for(500.0)).abs() < 1e-12);
        assert!((at_60 - 2.0 * at_equator).abs() < 1e-9, "at 60 deg was {at_60}");
    }

    #[test]
    fn axis_separation_splits_components() {
        let (ns, ew) = axis_separation_m(LatLon::new(0.0, 0.0), LatLon::new(0.001, 0.002));
        assert!((ns - 111.0).abs() < 1e-9);
        assert!((ew - 222.0).abs() < 1e-9);
    }
}
