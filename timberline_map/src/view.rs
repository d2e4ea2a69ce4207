// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering surface the viewer drives.

use bitflags::bitflags;
use timberline_draw::Preview;
use timberline_geo::{BoundingBox, Polygon};
use timberline_mesh::MeshLayer;
use timberline_viewport::FitRequest;

use crate::parcel::Parcel;

/// Identifies one of the layers the viewer manages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerId {
    /// All loaded parcel outlines.
    Parcels,
    /// In-progress drawing feedback.
    Preview,
    /// The last committed drawn shape.
    DrawnShape,
    /// Neutral fill underneath the mesh.
    MeshBackdrop,
    /// Tree density cells.
    Mesh,
}

/// Where the neutral layer under the mesh is drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum Backdrop {
    /// The boundary polygons the mesh was clipped to.
    Regions(Vec<Polygon>),
    /// The padded extent of all samples, when nothing clipped the mesh.
    Bounds(BoundingBox),
}

/// Layer content handed to [`MapView::add_layer`].
#[derive(Clone, Debug, PartialEq)]
pub enum Layer {
    /// Parcel outlines in their default style.
    Parcels(Vec<Parcel>),
    /// Drawing feedback.
    Preview(Preview),
    /// A committed drawn shape.
    DrawnShape(Polygon),
    /// Neutral fill underneath the mesh.
    MeshBackdrop(Backdrop),
    /// Tree density cells.
    Mesh(MeshLayer),
}

impl Layer {
    /// The slot this layer occupies.
    pub fn id(&self) -> LayerId {
        match self {
            Self::Parcels(_) => LayerId::Parcels,
            Self::Preview(_) => LayerId::Preview,
            Self::DrawnShape(_) => LayerId::DrawnShape,
            Self::MeshBackdrop(_) => LayerId::MeshBackdrop,
            Self::Mesh(_) => LayerId::Mesh,
        }
    }
}

/// Style of one parcel outline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    /// Not selected.
    Default,
    /// Part of the multi-selection.
    Selected,
    /// The current search hit.
    Searched,
}

bitflags! {
    /// Pointer-side map behaviors that drawing switches off.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct InteractionFlags: u8 {
        /// Dragging pans the map.
        const DRAGGING = 1;
        /// Double clicking zooms in.
        const DOUBLE_CLICK_ZOOM = 1 << 1;
        /// Show a crosshair cursor.
        const CROSSHAIR = 1 << 2;
    }
}

impl InteractionFlags {
    /// Normal browsing.
    pub const BROWSING: Self = Self::DRAGGING.union(Self::DOUBLE_CLICK_ZOOM);
    /// While a draw tool is armed.
    pub const DRAWING: Self = Self::CROSSHAIR;
}

/// Minimal capability interface over a map widget.
///
/// The viewer only ever talks to the map through this trait, so tests and
/// headless hosts can substitute a recorder.
pub trait MapView {
    /// Show `layer`, replacing any layer already in the same [`LayerId`] slot.
    fn add_layer(&mut self, layer: Layer);

    /// Remove the layer in slot `id`. Removing an absent layer is a no-op.
    fn remove_layer(&mut self, id: LayerId);

    /// Restyle the outline of parcel `parcel_id`.
    fn set_style(&mut self, parcel_id: &str, style: Style);

    /// Move the camera.
    fn fit_bounds(&mut self, request: &FitRequest);

    /// Enable exactly the given pointer behaviors.
    fn set_interaction(&mut self, flags: InteractionFlags);
}
