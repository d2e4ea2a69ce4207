// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timberline Selection: an ordered multi-selection registry with undo.
//!
//! [`SelectionRegistry`] tracks which parcels are selected, in the order they
//! were selected, together with each parcel's boundary polygon.
//!
//! - [`SelectionRegistry::toggle`] selects or deselects an id.
//! - [`SelectionRegistry::undo_last`] removes the most recent selection.
//! - [`SelectionRegistry::clear`] removes everything.
//! - [`SelectionRegistry::commit`] drains a [`StyleDamage`] batch listing ids
//!   whose highlight changed since the last commit.
//!
//! The registry is generic over the id type; the viewer uses `String`.
//!
//! ## Example
//!
//! ```rust
//! use timberline_geo::{BoundingBox, Polygon};
//! use timberline_selection::SelectionRegistry;
//!
//! let parcel = |lat: f64| Polygon::from_bounding_box(&BoundingBox::new(lat, 0.0, lat + 1.0, 1.0));
//!
//! let mut reg = SelectionRegistry::new();
//! reg.toggle("12-3", parcel(0.0));
//! reg.toggle("12-4", parcel(2.0));
//! let damage = reg.commit();
//! assert_eq!(damage.highlighted.len(), 2);
//!
//! assert_eq!(reg.undo_last(), Some("12-4"));
//! assert_eq!(reg.commit().restored.as_slice(), &["12-4"]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod damage;
mod registry;

pub use damage::StyleDamage;
pub use registry::{ParcelSelection, SelectionRegistry};
