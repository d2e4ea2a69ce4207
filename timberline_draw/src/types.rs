// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events, configuration, and typed outputs of the drawing controller.

use alloc::vec::Vec;
use core::fmt;

use timberline_geo::{BoundingBox, LatLon, Polygon};

/// Timestamp in milliseconds, from any monotonic clock the host chooses.
pub type Millis = u64;

/// Which shape the controller draws while armed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Press, drag and release to span an axis-aligned box.
    Rectangle,
    /// Click each vertex, double click to close the ring.
    Polygon,
}

/// Kind of pointer input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Press and release recognized as a click by the host.
    Click,
    /// Native double-click notification from the host.
    DoubleClick,
}

/// A pointer event already projected to geographic coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// Where it happened.
    pub position: LatLon,
    /// When it happened.
    pub timestamp: Millis,
}

impl PointerEvent {
    /// Convenience constructor.
    pub const fn new(kind: PointerKind, position: LatLon, timestamp: Millis) -> Self {
        Self {
            kind,
            position,
            timestamp,
        }
    }
}

/// Thresholds used by the drawing controller.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawConfig {
    /// Rectangles whose anchor-to-release great-circle distance is below this
    /// many meters are rejected.
    pub min_rectangle_m: f64,
    /// Two clicks closer together than this many milliseconds form a double
    /// click.
    pub double_click_window_ms: Millis,
    /// Treat [`PointerKind::DoubleClick`] events as a commit gesture.
    ///
    /// Leave this off when the host also delivers the two underlying clicks,
    /// since the click debounce already recognizes the gesture.
    pub native_double_click: bool,
}

impl DrawConfig {
    /// Default minimum rectangle size in meters.
    pub const DEFAULT_MIN_RECTANGLE_M: f64 = 100.0;
    /// Default double-click window in milliseconds.
    pub const DEFAULT_DOUBLE_CLICK_WINDOW_MS: Millis = 300;
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            min_rectangle_m: Self::DEFAULT_MIN_RECTANGLE_M,
            double_click_window_ms: Self::DEFAULT_DOUBLE_CLICK_WINDOW_MS,
            native_double_click: false,
        }
    }
}

/// Lifecycle state of the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DrawState {
    /// No session in progress.
    Idle,
    /// Dragging out a rectangle.
    DrawingRectangle,
    /// Collecting polygon vertices.
    DrawingPolygon,
    /// A shape was committed and is still on display.
    Complete,
}

/// Live preview geometry for an in-progress session.
#[derive(Clone, Debug, PartialEq)]
pub enum Preview {
    /// A single polygon vertex, drawn as a marker.
    Vertex(LatLon),
    /// Two or more polygon vertices, drawn as an outline.
    Path(Vec<LatLon>),
    /// The rectangle spanned so far.
    Rectangle(BoundingBox),
}

/// How the preview layer changed after handling an input.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum PreviewUpdate {
    /// Leave the preview as it is.
    #[default]
    Unchanged,
    /// Remove the preview.
    Cleared,
    /// Replace the preview with new geometry.
    Set(Preview),
}

/// A finished shape.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommit {
    /// Which tool produced it.
    pub shape: ShapeKind,
    /// Enclosing box.
    pub bounding_box: BoundingBox,
    /// Ring vertices; rectangle corners run SW, NW, NE, SE.
    pub vertices: Vec<LatLon>,
}

impl DrawCommit {
    /// The committed ring as a [`Polygon`].
    pub fn polygon(&self) -> Polygon {
        // Commits always carry at least three vertices.
        Polygon::new(self.vertices.clone())
            .unwrap_or_else(|_| Polygon::from_bounding_box(&self.bounding_box))
    }
}

/// A drawing attempt that could not be committed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DrawError {
    /// The rectangle drag was shorter than the configured minimum. The session
    /// was reset.
    ShapeTooSmall {
        /// Anchor-to-release distance in meters.
        distance_m: f64,
    },
    /// A polygon commit was requested with fewer than three vertices. The
    /// session stays open for more input.
    InvalidShape {
        /// Vertices collected so far.
        vertices: usize,
    },
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeTooSmall { distance_m } => {
                write!(f, "rectangle is too small ({distance_m:.1} m across)")
            }
            Self::InvalidShape { vertices } => {
                write!(f, "a polygon needs at least 3 vertices, got {vertices}")
            }
        }
    }
}

impl core::error::Error for DrawError {}

/// Everything a single input produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawOutput {
    /// Change to the preview layer.
    pub preview: PreviewUpdate,
    /// `true` when a previously committed shape was discarded and should be
    /// removed from display.
    pub committed_shape_cleared: bool,
    /// A commit or a rejected commit, if the input finished a gesture.
    pub result: Option<Result<DrawCommit, DrawError>>,
}

impl DrawOutput {
    /// An output with no effects.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether this output has no effect at all.
    pub fn is_empty(&self) -> bool {
        self.preview == PreviewUpdate::Unchanged
            && !self.committed_shape_cleared
            && self.result.is_none()
    }

    /// The committed shape, if the input finished one.
    pub fn commit(&self) -> Option<&DrawCommit> {
        self.result.as_ref().and_then(|r| r.as_ref().ok())
    }

    /// The rejection, if the input failed a commit.
    pub fn error(&self) -> Option<DrawError> {
        self.result.as_ref().and_then(|r| r.as_ref().err().copied())
    }
}
