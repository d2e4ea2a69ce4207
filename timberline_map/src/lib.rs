// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timberline Map: the viewer layer that ties the Timberline primitives to a map.
//!
//! [`Viewer`] owns one [`DrawingController`](timberline_draw::DrawingController)
//! and one [`SelectionRegistry`](timberline_selection::SelectionRegistry) and
//! drives a host-provided [`MapView`]:
//!
//! - pointer events go to the draw tool; previews and committed shapes become
//!   layers;
//! - parcel clicks toggle the selection, restyle outlines and refit the camera;
//! - analysis requests go out through an [`AnalysisService`] tagged with a
//!   [`RequestTicket`], and results come back through
//!   [`Viewer::apply_analysis`], which drops stale ones and renders the rest
//!   as a tree mesh.
//!
//! Parcels come from any [`ParcelSource`]; [`GeoJsonSource`] reads the forest
//! registry's GeoJSON export. Tunables live in [`ViewerConfig`], which can be
//! loaded from JSON.
//!
//! Diagnostics go through the `log` facade; install any logger to see them.
//!
//! ## Example
//!
//! ```rust
//! use timberline_geo::{BoundingBox, Polygon};
//! use timberline_map::{
//!     InteractionFlags, Layer, LayerId, MapView, Parcel, ParcelAttributes, Style, Viewer,
//!     ViewerConfig,
//! };
//! use timberline_viewport::FitRequest;
//!
//! #[derive(Default)]
//! struct Headless {
//!     fits: usize,
//! }
//!
//! impl MapView for Headless {
//!     fn add_layer(&mut self, _: Layer) {}
//!     fn remove_layer(&mut self, _: LayerId) {}
//!     fn set_style(&mut self, _: &str, _: Style) {}
//!     fn fit_bounds(&mut self, _: &FitRequest) {
//!         self.fits += 1;
//!     }
//!     fn set_interaction(&mut self, _: InteractionFlags) {}
//! }
//!
//! let parcels = vec![Parcel::new(
//!     ParcelAttributes {
//!         compartment: "0053".into(),
//!         subcompartment: "0049".into(),
//!         ..Default::default()
//!     },
//!     Polygon::from_bounding_box(&BoundingBox::new(43.0, 141.0, 43.01, 141.01)),
//! )];
//!
//! let mut view = Headless::default();
//! let mut viewer = Viewer::new(ViewerConfig::default());
//! viewer.load_parcels(&mut view, &parcels).unwrap();
//! assert_eq!(viewer.toggle_parcel(&mut view, "0053-0049"), Ok(true));
//! assert_eq!(view.fits, 1);
//! ```

mod analysis;
mod config;
mod error;
mod parcel;
mod view;
mod viewer;

pub use analysis::{
    AnalysisMode, AnalysisRequest, AnalysisResult, AnalysisService, Confidence, RequestTicket,
};
pub use config::ViewerConfig;
pub use error::{ConfigError, SourceError, ViewerError};
pub use parcel::{
    AREA_PROPERTY, COMPARTMENT_PROPERTY, GeoJsonSource, KEYCODE_PROPERTY, Parcel,
    ParcelAttributes, ParcelSource, SUBCOMPARTMENT_PROPERTY, parcels_from_geojson,
};
pub use view::{Backdrop, InteractionFlags, Layer, LayerId, MapView, Style};
pub use viewer::Viewer;
