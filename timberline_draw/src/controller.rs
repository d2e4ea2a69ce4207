// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing state machine.

use smallvec::SmallVec;
use timberline_geo::{BoundingBox, LatLon, MIN_POLYGON_VERTICES};

use crate::types::{
    DrawCommit, DrawConfig, DrawError, DrawOutput, DrawState, Millis, PointerEvent, PointerKind,
    Preview, PreviewUpdate, ShapeKind,
};

/// A click whose "add vertex" action is waiting out the double-click window.
#[derive(Copy, Clone, Debug, PartialEq)]
struct PendingClick {
    position: LatLon,
    timestamp: Millis,
}

#[derive(Clone, Debug, PartialEq)]
enum Session {
    Idle,
    Rectangle {
        anchor: LatLon,
        current: LatLon,
    },
    Polygon {
        vertices: SmallVec<[LatLon; 8]>,
        pending: Option<PendingClick>,
    },
    Complete,
}

/// Turns pointer input into committed rectangles and polygons.
///
/// The controller only reacts while armed with a [`ShapeKind`]; every input
/// is ignored otherwise. Committing a shape disarms it again, so each
/// [`arm`](Self::arm) yields at most one shape.
///
/// Polygon vertices are debounced: a click schedules a deferred "add vertex"
/// that fires once the double-click window has elapsed, either when the host
/// calls [`poll`](Self::poll) or when the next click arrives. A second click
/// inside the window cancels the deferred vertex and attempts a commit
/// instead. Hosts driving a timer should poll at [`next_deadline`](Self::next_deadline).
#[derive(Clone, Debug)]
pub struct DrawingController {
    config: DrawConfig,
    mode: Option<ShapeKind>,
    session: Session,
    committed: Option<DrawCommit>,
}

impl DrawingController {
    /// Create an idle, disarmed controller with default thresholds.
    pub fn new() -> Self {
        Self::with_config(DrawConfig::default())
    }

    /// Create an idle, disarmed controller with custom thresholds.
    pub fn with_config(config: DrawConfig) -> Self {
        Self {
            config,
            mode: None,
            session: Session::Idle,
            committed: None,
        }
    }

    /// Active thresholds.
    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    /// Arm the controller for `kind`.
    ///
    /// Any in-progress session is discarded. A previously committed shape
    /// stays on display until the next session starts.
    pub fn arm(&mut self, kind: ShapeKind) -> DrawOutput {
        let out = self.discard_session();
        self.mode = Some(kind);
        out
    }

    /// Disarm the controller, discarding any in-progress session.
    pub fn disarm(&mut self) -> DrawOutput {
        let out = self.discard_session();
        self.mode = None;
        out
    }

    /// The shape kind the controller is armed for, if any.
    pub fn mode(&self) -> Option<ShapeKind> {
        self.mode
    }

    /// Whether pointer input is currently being consumed.
    pub fn is_armed(&self) -> bool {
        self.mode.is_some()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DrawState {
        match self.session {
            Session::Idle => DrawState::Idle,
            Session::Rectangle { .. } => DrawState::DrawingRectangle,
            Session::Polygon { .. } => DrawState::DrawingPolygon,
            Session::Complete => DrawState::Complete,
        }
    }

    /// The most recently committed shape, while it is still on display.
    pub fn committed(&self) -> Option<&DrawCommit> {
        self.committed.as_ref()
    }

    /// Number of polygon vertices collected so far (excluding a pending click).
    pub fn vertex_count(&self) -> usize {
        match &self.session {
            Session::Polygon { vertices, .. } => vertices.len(),
            _ => 0,
        }
    }

    /// The preview geometry for the current session.
    pub fn preview(&self) -> Option<Preview> {
        match &self.session {
            Session::Rectangle { anchor, current } => {
                Some(Preview::Rectangle(BoundingBox::from_corners(*anchor, *current)))
            }
            Session::Polygon { vertices, .. } => polygon_preview(vertices),
            Session::Idle | Session::Complete => None,
        }
    }

    /// When the pending click (if any) turns into a vertex.
    pub fn next_deadline(&self) -> Option<Millis> {
        match &self.session {
            Session::Polygon {
                pending: Some(p), ..
            } => Some(p.timestamp.saturating_add(self.config.double_click_window_ms)),
            _ => None,
        }
    }

    /// Dispatch a pointer event to the matching handler.
    pub fn on_pointer_event(&mut self, event: PointerEvent) -> DrawOutput {
        let PointerEvent {
            kind,
            position,
            timestamp,
        } = event;
        match kind {
            PointerKind::Down => self.on_down(position),
            PointerKind::Move => self.on_move(position),
            PointerKind::Up => self.on_up(position),
            PointerKind::Click => self.on_click(position, timestamp),
            PointerKind::DoubleClick => self.on_double_click(),
        }
    }

    /// Record a press. Starts a rectangle session when armed for rectangles.
    pub fn on_down(&mut self, position: LatLon) -> DrawOutput {
        if self.mode != Some(ShapeKind::Rectangle) {
            return DrawOutput::none();
        }
        let mut out = DrawOutput::none();
        out.committed_shape_cleared = self.committed.take().is_some();
        self.session = Session::Rectangle {
            anchor: position,
            current: position,
        };
        out.preview = PreviewUpdate::Set(Preview::Rectangle(BoundingBox::from_corners(
            position, position,
        )));
        out
    }

    /// Track the pointer. Updates the live rectangle preview while dragging.
    pub fn on_move(&mut self, position: LatLon) -> DrawOutput {
        let Session::Rectangle { anchor, current } = &mut self.session else {
            return DrawOutput::none();
        };
        *current = position;
        DrawOutput {
            preview: PreviewUpdate::Set(Preview::Rectangle(BoundingBox::from_corners(
                *anchor, position,
            ))),
            ..DrawOutput::none()
        }
    }

    /// Record a release. Finishes a rectangle session.
    ///
    /// Releases closer than [`DrawConfig::min_rectangle_m`] to the anchor fail
    /// with [`DrawError::ShapeTooSmall`] and reset the session; the controller
    /// stays armed for another attempt.
    pub fn on_up(&mut self, position: LatLon) -> DrawOutput {
        let Session::Rectangle { anchor, .. } = self.session else {
            return DrawOutput::none();
        };
        let distance_m = anchor.distance_to(position);
        if distance_m < self.config.min_rectangle_m {
            self.session = Session::Idle;
            return DrawOutput {
                preview: PreviewUpdate::Cleared,
                result: Some(Err(DrawError::ShapeTooSmall { distance_m })),
                ..DrawOutput::none()
            };
        }
        let bounding_box = BoundingBox::from_corners(anchor, position);
        let commit = DrawCommit {
            shape: ShapeKind::Rectangle,
            bounding_box,
            vertices: bounding_box.corners().to_vec(),
        };
        self.finish(commit)
    }

    /// Record a click. Schedules a polygon vertex or, when it follows another
    /// click within the double-click window, attempts a commit.
    pub fn on_click(&mut self, position: LatLon, timestamp: Millis) -> DrawOutput {
        if self.mode != Some(ShapeKind::Polygon) {
            return DrawOutput::none();
        }
        let window = self.config.double_click_window_ms;
        let mut out = DrawOutput::none();
        match &mut self.session {
            Session::Polygon { vertices, pending } => {
                if let Some(prev) = pending.take() {
                    if timestamp.saturating_sub(prev.timestamp) < window {
                        return self.try_commit_polygon();
                    }
                    // The host never polled; the earlier click is overdue.
                    vertices.push(prev.position);
                    out.preview = preview_update(vertices);
                }
                *pending = Some(PendingClick {
                    position,
                    timestamp,
                });
            }
            _ => {
                out.committed_shape_cleared = self.committed.take().is_some();
                self.session = Session::Polygon {
                    vertices: SmallVec::new(),
                    pending: Some(PendingClick {
                        position,
                        timestamp,
                    }),
                };
            }
        }
        out
    }

    /// Handle a native double-click notification.
    ///
    /// Ignored unless [`DrawConfig::native_double_click`] is set, in which case
    /// any pending click is dropped and a commit is attempted.
    pub fn on_double_click(&mut self) -> DrawOutput {
        if !self.config.native_double_click || self.mode != Some(ShapeKind::Polygon) {
            return DrawOutput::none();
        }
        match &mut self.session {
            Session::Polygon { pending, .. } => {
                *pending = None;
                self.try_commit_polygon()
            }
            _ => DrawOutput::none(),
        }
    }

    /// Apply a pending polygon click whose double-click window has elapsed.
    pub fn poll(&mut self, now: Millis) -> DrawOutput {
        let window = self.config.double_click_window_ms;
        let Session::Polygon { vertices, pending } = &mut self.session else {
            return DrawOutput::none();
        };
        match *pending {
            Some(p) if now >= p.timestamp.saturating_add(window) => {
                *pending = None;
                vertices.push(p.position);
                DrawOutput {
                    preview: preview_update(vertices),
                    ..DrawOutput::none()
                }
            }
            _ => DrawOutput::none(),
        }
    }

    /// Discard the current session and any committed shape.
    ///
    /// A no-op when idle with nothing on display. The armed mode is kept.
    pub fn cancel(&mut self) -> DrawOutput {
        let mut out = self.discard_session();
        if self.committed.take().is_some() {
            out.committed_shape_cleared = true;
        }
        if matches!(self.session, Session::Complete) {
            self.session = Session::Idle;
        }
        out
    }

    fn try_commit_polygon(&mut self) -> DrawOutput {
        let Session::Polygon { vertices, .. } = &self.session else {
            return DrawOutput::none();
        };
        if vertices.len() < MIN_POLYGON_VERTICES {
            return DrawOutput {
                result: Some(Err(DrawError::InvalidShape {
                    vertices: vertices.len(),
                })),
                ..DrawOutput::none()
            };
        }
        let vertices = vertices.to_vec();
        let Some(bounding_box) = BoundingBox::from_points(vertices.iter().copied()) else {
            return DrawOutput::none();
        };
        self.finish(DrawCommit {
            shape: ShapeKind::Polygon,
            bounding_box,
            vertices,
        })
    }

    fn finish(&mut self, commit: DrawCommit) -> DrawOutput {
        self.session = Session::Complete;
        self.mode = None;
        self.committed = Some(commit.clone());
        DrawOutput {
            preview: PreviewUpdate::Cleared,
            result: Some(Ok(commit)),
            ..DrawOutput::none()
        }
    }

    /// Drop an in-progress session, reporting whether a preview was visible.
    fn discard_session(&mut self) -> DrawOutput {
        let had_preview = self.preview().is_some();
        if matches!(
            self.session,
            Session::Rectangle { .. } | Session::Polygon { .. }
        ) {
            self.session = Session::Idle;
        }
        DrawOutput {
            preview: if had_preview {
                PreviewUpdate::Cleared
            } else {
                PreviewUpdate::Unchanged
            },
            ..DrawOutput::none()
        }
    }
}

impl Default for DrawingController {
    fn default() -> Self {
        Self::new()
    }
}

fn polygon_preview(vertices: &[LatLon]) -> Option<Preview> {
    match vertices {
        [] => None,
        [only] => Some(Preview::Vertex(*only)),
        _ => Some(Preview::Path(vertices.to_vec())),
    }
}

fn preview_update(vertices: &[LatLon]) -> PreviewUpdate {
    polygon_preview(vertices).map_or(PreviewUpdate::Unchanged, PreviewUpdate::Set)
}
