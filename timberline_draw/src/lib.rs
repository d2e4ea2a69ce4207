// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timberline Draw: a pointer-driven state machine for drawing regions on a map.
//!
//! [`DrawingController`] turns pointer events that the host has already
//! projected to [`LatLon`](timberline_geo::LatLon) into committed rectangles
//! and polygons. It owns no rendering: each handler returns a [`DrawOutput`]
//! describing how the preview layer changed and, when a gesture finished,
//! either a [`DrawCommit`] or a [`DrawError`].
//!
//! ## Lifecycle
//!
//! `Idle` → `DrawingRectangle` | `DrawingPolygon` → `Complete`, with
//! [`DrawingController::cancel`] returning to `Idle` from anywhere.
//!
//! - Rectangle: press to anchor, drag to preview, release to commit. Drags
//!   shorter than [`DrawConfig::min_rectangle_m`] meters are rejected.
//! - Polygon: each click adds a vertex once the double-click window has
//!   elapsed; a second click inside the window closes the ring instead.
//!
//! The controller is armed with [`DrawingController::arm`] and disarms itself
//! after each successful commit.
//!
//! ## Minimal example
//!
//! ```rust
//! use timberline_draw::{DrawingController, PointerEvent, PointerKind, ShapeKind};
//! use timberline_geo::LatLon;
//!
//! let mut draw = DrawingController::new();
//! draw.arm(ShapeKind::Rectangle);
//!
//! let sw = LatLon::new(43.00, 141.00);
//! let ne = LatLon::new(43.01, 141.01);
//! draw.on_pointer_event(PointerEvent::new(PointerKind::Down, sw, 0));
//! draw.on_pointer_event(PointerEvent::new(PointerKind::Move, ne, 16));
//! let out = draw.on_pointer_event(PointerEvent::new(PointerKind::Up, ne, 32));
//!
//! let commit = out.commit().unwrap();
//! assert_eq!(commit.vertices.len(), 4);
//! assert!(!draw.is_armed());
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `timberline_geo/std`.
//! - `libm`: `no_std` float math through `timberline_geo/libm`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod controller;
mod types;

pub use controller::DrawingController;
pub use types::{
    DrawCommit, DrawConfig, DrawError, DrawOutput, DrawState, Millis, PointerEvent, PointerKind,
    Preview, PreviewUpdate, ShapeKind,
};
