// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timberline Viewport: fit the map to a set of regions.
//!
//! [`fit`] unions the bounding boxes of any [`Region`]s and pairs the result
//! with the padding and zoom ceiling from [`FitOptions`]. The returned
//! [`FitRequest`] is handed to the map; this crate never owns camera state.
//!
//! Presets cover the three situations the viewer fits for:
//! [`FitOptions::SELECTION`], [`FitOptions::IMAGE`] and [`FitOptions::REGION`].
//!
//! ```rust
//! use timberline_geo::BoundingBox;
//! use timberline_viewport::{FitError, FitOptions, fit};
//!
//! let parcels = [
//!     BoundingBox::new(0.0, 0.0, 1.0, 1.0),
//!     BoundingBox::new(2.0, 2.0, 3.0, 3.0),
//! ];
//! let req = fit(&parcels, FitOptions::SELECTION).unwrap();
//! assert_eq!(req.bounds, BoundingBox::new(0.0, 0.0, 3.0, 3.0));
//!
//! let none: [BoundingBox; 0] = [];
//! assert_eq!(fit(&none, FitOptions::SELECTION), Err(FitError::NoSelection));
//! ```
//!
//! This crate is `no_std`.
//!
//! [`Region`]: timberline_geo::Region

#![no_std]

#[cfg(test)]
extern crate alloc;

mod fit;

pub use fit::{FitError, FitOptions, FitRequest, fit, union_bounds};
