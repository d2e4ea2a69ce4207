// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timberline Geo: geographic primitives for map selection.
//!
//! This crate provides the small, stateless geometry vocabulary shared by the
//! other Timberline crates:
//!
//! - [`LatLon`] – a position in degrees.
//! - [`BoundingBox`] – an axis-aligned box in degrees with union/expand helpers.
//! - [`Polygon`] – a closed ring of at least three vertices.
//! - [`Region`] – a trait for anything that can answer "is this point inside?"
//!   and report its bounding box.
//! - [`point_in_ring`] – the ray-casting inside test.
//!
//! Distances come in two flavors (see [`distance`]): great-circle meters for
//! gesture thresholds, and the flat "111 km per degree" approximation for
//! mesh sizing and area estimates. No other coordinate reference system is
//! modeled.
//!
//! ## Minimal example
//!
//! ```rust
//! use timberline_geo::{LatLon, Polygon, Region};
//!
//! let square = Polygon::new(vec![
//!     LatLon::new(0.0, 0.0),
//!     LatLon::new(0.0, 1.0),
//!     LatLon::new(1.0, 1.0),
//!     LatLon::new(1.0, 0.0),
//! ])
//! .unwrap();
//!
//! assert!(square.contains_point(LatLon::new(0.5, 0.5)));
//! assert!(!square.contains_point(LatLon::new(2.0, 2.0)));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support in `kurbo`.
//! - `libm`: `no_std` float math through `kurbo`'s `libm` feature.
//! - `serde`: `Serialize`/`Deserialize` for [`LatLon`], [`BoundingBox`] and
//!   [`Polygon`], with field names `lat`/`lon` and `min_lat`/`min_lon`/
//!   `max_lat`/`max_lon`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod distance;
mod polygon;
mod types;

pub use distance::{haversine_distance_m, lat_degrees_for, lon_degrees_for};
pub use polygon::{GeometryError, MIN_POLYGON_VERTICES, Polygon, Region, point_in_ring};
pub use types::{BoundingBox, LatLon};
