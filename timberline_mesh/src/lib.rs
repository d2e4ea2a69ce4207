// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timberline Mesh: per-tree samples to a clipped density mesh.
//!
//! [`aggregate`] turns a list of [`TreeSample`]s into [`MeshCell`]s ready for
//! display: one axis-aligned cell per sample, sized by [`MeshSize`], kept only
//! when its center falls inside one of the boundary [`Region`]s, and shaded by
//! volume from [`MIN_OPACITY`] to [`MAX_OPACITY`].
//!
//! Cell sizes are converted to degrees with the flat 111 km per degree
//! approximation at the mean sample latitude, so cells stay square on the
//! ground at that latitude.
//!
//! ## Example
//!
//! ```rust
//! use timberline_geo::BoundingBox;
//! use timberline_mesh::{MeshSize, TreeClass, TreeSample, aggregate};
//!
//! let tree = |lat: f64, volume_m3: f64| TreeSample {
//!     lat,
//!     lon: 141.0,
//!     diameter_cm: 32.0,
//!     volume_m3,
//!     class: TreeClass::Coniferous,
//! };
//! let samples = [tree(43.0001, 0.8), tree(43.0002, 1.6), tree(43.5, 2.4)];
//! let stand = BoundingBox::new(43.0, 140.9, 43.1, 141.1);
//!
//! let layer = aggregate(&samples, MeshSize::Fixed(10.0), &[stand]);
//! assert_eq!(layer.cells.len(), 2);
//! assert_eq!(layer.cells[0].opacity, 0.4);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `timberline_geo/std`.
//! - `libm`: `no_std` float math through `timberline_geo/libm`.
//! - `serde`: `Serialize`/`Deserialize` for [`TreeSample`], [`TreeClass`] and
//!   [`MeshSize`]. Samples use the analysis backend's field names.
//!
//! Aggregation statistics are reported through the `log` facade at debug level.
//!
//! This crate is `no_std` and uses `alloc`.
//!
//! [`Region`]: timberline_geo::Region

#![no_std]

extern crate alloc;

mod aggregate;
mod types;

pub use aggregate::{MAX_OPACITY, MIN_OPACITY, aggregate, opacity_for, resolve_cell_size};
pub use types::{MeshCell, MeshLayer, MeshSize, TreeClass, TreeSample};
