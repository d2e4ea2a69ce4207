// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use hashbrown::HashMap;
use timberline_draw::{
    DrawCommit, DrawOutput, DrawingController, Millis, PointerEvent, PreviewUpdate, ShapeKind,
};
use timberline_geo::{BoundingBox, Polygon};
use timberline_mesh::{MeshLayer, aggregate};
use timberline_selection::SelectionRegistry;
use timberline_viewport::fit;

use crate::analysis::{AnalysisRequest, AnalysisResult, AnalysisService, RequestTicket};
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::parcel::{Parcel, ParcelSource};
use crate::view::{Backdrop, InteractionFlags, Layer, LayerId, MapView, Style};

/// What an in-flight analysis request was issued for.
#[derive(Clone, Debug)]
enum Origin {
    Selection(Vec<String>),
    Drawn(DrawCommit),
}

/// Ties drawing, parcel selection, analysis and mesh display to a [`MapView`].
///
/// The viewer never holds on to the view; every operation that changes what
/// is shown takes it as an argument. Tear down with [`reset`](Self::reset),
/// which removes every layer the viewer added.
#[derive(Debug)]
pub struct Viewer {
    config: ViewerConfig,
    draw: DrawingController,
    selection: SelectionRegistry<String>,
    parcels: Vec<Parcel>,
    parcel_index: HashMap<String, usize>,
    searched: Option<String>,
    drawn: Option<DrawCommit>,
    next_ticket: u64,
    in_flight: HashMap<RequestTicket, Origin>,
    drawn_ticket: Option<RequestTicket>,
    selection_ticket: Option<RequestTicket>,
    analysis: Option<AnalysisResult>,
    mesh: Option<MeshLayer>,
    shown: Vec<LayerId>,
}

impl Viewer {
    /// Create a viewer with no parcels, no selection and drawing disarmed.
    pub fn new(config: ViewerConfig) -> Self {
        let draw = DrawingController::with_config(config.draw_config());
        Self {
            config,
            draw,
            selection: SelectionRegistry::new(),
            parcels: Vec::new(),
            parcel_index: HashMap::new(),
            searched: None,
            drawn: None,
            next_ticket: 0,
            in_flight: HashMap::new(),
            drawn_ticket: None,
            selection_ticket: None,
            analysis: None,
            mesh: None,
            shown: Vec::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The drawing controller.
    pub fn drawing(&self) -> &DrawingController {
        &self.draw
    }

    /// The selection registry.
    pub fn selection(&self) -> &SelectionRegistry<String> {
        &self.selection
    }

    /// Loaded parcels.
    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    /// Look up a loaded parcel by id.
    pub fn parcel(&self, id: &str) -> Option<&Parcel> {
        self.parcel_index.get(id).map(|&i| &self.parcels[i])
    }

    /// The last committed drawn shape, while it is still shown.
    pub fn drawn_shape(&self) -> Option<&DrawCommit> {
        self.drawn.as_ref()
    }

    /// The last applied analysis result.
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// The mesh currently shown.
    pub fn mesh(&self) -> Option<&MeshLayer> {
        self.mesh.as_ref()
    }

    /// Number of submitted requests still waiting for a result.
    pub fn pending_analyses(&self) -> usize {
        self.in_flight.len()
    }

    // --- parcels ---

    /// Replace the parcel set from `source`.
    ///
    /// On failure the parcel set is left empty and
    /// [`ViewerError::DataUnavailable`] is returned; the rest of the viewer
    /// keeps working without parcels.
    pub fn load_parcels<S>(
        &mut self,
        view: &mut impl MapView,
        source: &S,
    ) -> Result<usize, ViewerError>
    where
        S: ParcelSource + ?Sized,
    {
        self.parcels.clear();
        self.parcel_index.clear();
        self.searched = None;
        self.hide(view, LayerId::Parcels);

        let parcels = match source.load() {
            Ok(parcels) => parcels,
            Err(err) => {
                log::warn!("parcel data unavailable: {err}");
                return Err(ViewerError::DataUnavailable(err));
            }
        };
        for (i, parcel) in parcels.iter().enumerate() {
            self.parcel_index.entry(parcel.id()).or_insert(i);
        }
        log::info!("loaded {} parcels", parcels.len());
        self.parcels = parcels;
        self.show(view, Layer::Parcels(self.parcels.clone()));
        // Selections made against an earlier parcel set keep their outlines.
        for id in self.selection.ids() {
            view.set_style(id, Style::Selected);
        }
        Ok(self.parcels.len())
    }

    /// Highlight and fit the first parcel whose id, compartment or
    /// sub-compartment equals `query`. Returns its id.
    pub fn search_parcel(
        &mut self,
        view: &mut impl MapView,
        query: &str,
    ) -> Result<String, ViewerError> {
        let query = query.trim();
        let Some(parcel) = self.parcels.iter().find(|p| p.matches(query)) else {
            return Err(ViewerError::NotFound(query.to_owned()));
        };
        let id = parcel.id();
        let request = fit(&[&parcel.polygon], self.config.selection_fit)?;

        if let Some(previous) = self.searched.take() {
            view.set_style(&previous, self.resting_style(&previous));
        }
        view.set_style(&id, Style::Searched);
        view.fit_bounds(&request);
        self.searched = Some(id.clone());
        Ok(id)
    }

    // --- selection ---

    /// Select or deselect parcel `id`. Returns whether it is now selected.
    pub fn toggle_parcel(
        &mut self,
        view: &mut impl MapView,
        id: &str,
    ) -> Result<bool, ViewerError> {
        let Some(parcel) = self.parcel(id) else {
            return Err(ViewerError::UnknownParcel(id.to_owned()));
        };
        let polygon = parcel.polygon.clone();
        let selected = self.selection.toggle(id.to_owned(), polygon);
        self.apply_selection_change(view);
        Ok(selected)
    }

    /// Deselect the most recently selected parcel. Returns its id, or `None`
    /// when nothing was selected.
    pub fn undo_last(&mut self, view: &mut impl MapView) -> Option<String> {
        let id = self.selection.undo_last()?;
        self.apply_selection_change(view);
        Some(id)
    }

    /// Deselect every parcel.
    pub fn clear_selection(&mut self, view: &mut impl MapView) {
        self.selection.clear();
        self.apply_selection_change(view);
    }

    /// Fit the viewport to the selected parcels.
    pub fn fit_selection(&self, view: &mut impl MapView) -> Result<(), ViewerError> {
        let polygons: Vec<&Polygon> = self.selection.polygons().collect();
        let request = fit(&polygons, self.config.selection_fit)?;
        view.fit_bounds(&request);
        Ok(())
    }

    /// Fit the viewport to an aerial image footprint.
    pub fn fit_image(&self, view: &mut impl MapView, footprint: BoundingBox) {
        let request = fit(&[footprint], self.config.image_fit);
        if let Ok(request) = request {
            view.fit_bounds(&request);
        }
    }

    /// Fit the viewport to an administrative region.
    pub fn fit_region(
        &self,
        view: &mut impl MapView,
        outlines: &[Polygon],
    ) -> Result<(), ViewerError> {
        let request = fit(outlines, self.config.region_fit)?;
        view.fit_bounds(&request);
        Ok(())
    }

    /// Attribute rows of the selected parcels, in selection order.
    pub fn selection_info(&self) -> Result<Vec<&Parcel>, ViewerError> {
        if self.selection.is_empty() {
            return Err(ViewerError::NoSelection);
        }
        Ok(self
            .selection
            .ids()
            .filter_map(|id| self.parcel(id))
            .collect())
    }

    fn apply_selection_change(&mut self, view: &mut impl MapView) {
        let damage = self.selection.commit();
        if !damage.restored.is_empty() {
            let selection = &self.selection;
            self.in_flight.retain(|_, origin| match origin {
                Origin::Selection(ids) => ids.iter().all(|id| selection.contains(id)),
                Origin::Drawn(_) => true,
            });
            if self
                .selection_ticket
                .is_some_and(|ticket| !self.in_flight.contains_key(&ticket))
            {
                self.selection_ticket = None;
            }
        }
        for id in &damage.restored {
            view.set_style(id, self.resting_style(id));
        }
        for id in &damage.highlighted {
            view.set_style(id, Style::Selected);
        }
        if !self.selection.is_empty() && !damage.is_empty() {
            let polygons: Vec<&Polygon> = self.selection.polygons().collect();
            if let Ok(request) = fit(&polygons, self.config.selection_fit) {
                view.fit_bounds(&request);
            }
        }
    }

    /// Style of a parcel outline that is not part of the selection.
    fn resting_style(&self, id: &str) -> Style {
        if self.selection.contains(&id.to_owned()) {
            Style::Selected
        } else if self.searched.as_deref() == Some(id) {
            Style::Searched
        } else {
            Style::Default
        }
    }

    // --- drawing ---

    /// Arm the draw tool for `kind` and switch the map to drawing interaction.
    pub fn arm_drawing(&mut self, view: &mut impl MapView, kind: ShapeKind) {
        let out = self.draw.arm(kind);
        self.apply_draw_output(view, out);
        view.set_interaction(InteractionFlags::DRAWING);
    }

    /// Disarm the draw tool, discarding any unfinished shape.
    pub fn disarm_drawing(&mut self, view: &mut impl MapView) {
        let out = self.draw.disarm();
        self.apply_draw_output(view, out);
        view.set_interaction(InteractionFlags::BROWSING);
    }

    /// Discard the unfinished and the committed drawn shape.
    ///
    /// Any analysis still running for the drawn shape becomes stale. The draw
    /// tool stays armed if it was.
    pub fn cancel_drawing(&mut self, view: &mut impl MapView) {
        let out = self.draw.cancel();
        self.apply_draw_output(view, out);
        self.discard_drawn(view);
    }

    /// Feed a pointer event to the draw tool.
    ///
    /// Returns the committed shape when the event finished one. Rejected
    /// shapes come back as [`ViewerError::ShapeTooSmall`] or
    /// [`ViewerError::InvalidShape`].
    pub fn on_pointer_event(
        &mut self,
        view: &mut impl MapView,
        event: PointerEvent,
    ) -> Result<Option<DrawCommit>, ViewerError> {
        let out = self.draw.on_pointer_event(event);
        self.apply_draw_output(view, out)
    }

    /// Let a pending polygon click become a vertex. Call at
    /// [`DrawingController::next_deadline`].
    pub fn poll(&mut self, view: &mut impl MapView, now: Millis) {
        let out = self.draw.poll(now);
        // Polling only ever adds a vertex.
        debug_assert!(out.result.is_none(), "poll produced {:?}", out.result);
        if let Err(err) = self.apply_draw_output(view, out) {
            log::debug!("poll ignored {err}");
        }
    }

    fn apply_draw_output(
        &mut self,
        view: &mut impl MapView,
        out: DrawOutput,
    ) -> Result<Option<DrawCommit>, ViewerError> {
        match out.preview {
            PreviewUpdate::Unchanged => {}
            PreviewUpdate::Cleared => self.hide(view, LayerId::Preview),
            PreviewUpdate::Set(preview) => self.show(view, Layer::Preview(preview)),
        }
        if out.committed_shape_cleared {
            self.discard_drawn(view);
        }
        match out.result {
            None => Ok(None),
            Some(Err(err)) => {
                log::debug!("drawing rejected: {err}");
                Err(err.into())
            }
            Some(Ok(commit)) => {
                self.show(view, Layer::DrawnShape(commit.polygon()));
                view.set_interaction(InteractionFlags::BROWSING);
                self.drawn = Some(commit.clone());
                Ok(Some(commit))
            }
        }
    }

    fn discard_drawn(&mut self, view: &mut impl MapView) {
        if self.drawn.take().is_some() {
            self.hide(view, LayerId::DrawnShape);
        }
        if let Some(ticket) = self.drawn_ticket.take() {
            self.in_flight.remove(&ticket);
        }
    }

    // --- analysis ---

    /// Submit the selected parcels for analysis.
    ///
    /// A single parcel is sent with its outline and forest registry id so the
    /// backend clips to it; several parcels are sent as their union bounds and
    /// ids. Supersedes any earlier selection request.
    pub fn request_selected_analysis(
        &mut self,
        service: &mut impl AnalysisService,
    ) -> Result<RequestTicket, ViewerError> {
        let bbox = self.selection.bounding_box().ok_or(ViewerError::NoSelection)?;
        let ids: Vec<String> = self.selection.ids().cloned().collect();
        let mut request = AnalysisRequest::map(bbox);
        if let [only] = self.selection.snapshot() {
            request.polygon_coords = Some(only.polygon.vertices().to_vec());
            request.forest_registry_id = Some(only.id.clone());
        }
        request.selected_ids = Some(ids.clone());

        if let Some(previous) = self.selection_ticket.take() {
            self.in_flight.remove(&previous);
        }
        let ticket = self.submit(service, request, Origin::Selection(ids));
        self.selection_ticket = Some(ticket);
        Ok(ticket)
    }

    /// Submit a drawn shape for analysis.
    ///
    /// Rectangles are sent as bounds only; polygons also carry their outline.
    /// Supersedes any earlier drawn-region request.
    pub fn request_drawn_analysis(
        &mut self,
        service: &mut impl AnalysisService,
        commit: &DrawCommit,
    ) -> RequestTicket {
        let polygon_coords = match commit.shape {
            ShapeKind::Rectangle => None,
            ShapeKind::Polygon => Some(commit.vertices.clone()),
        };
        let request = AnalysisRequest {
            polygon_coords,
            ..AnalysisRequest::map(commit.bounding_box)
        };
        if let Some(previous) = self.drawn_ticket.take() {
            self.in_flight.remove(&previous);
        }
        let ticket = self.submit(service, request, Origin::Drawn(commit.clone()));
        self.drawn_ticket = Some(ticket);
        ticket
    }

    fn submit(
        &mut self,
        service: &mut impl AnalysisService,
        request: AnalysisRequest,
        origin: Origin,
    ) -> RequestTicket {
        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;
        log::info!("analysis {ticket:?}: {:.4} km2 requested", request.area_km2());
        self.in_flight.insert(ticket, origin);
        service.submit(ticket, &request);
        ticket
    }

    /// Record that request `ticket` failed.
    ///
    /// The request stops being pending and the view is left as it is. Returns
    /// [`ViewerError::StaleAsyncResult`] when the ticket was no longer
    /// pending.
    pub fn fail_analysis(
        &mut self,
        ticket: RequestTicket,
        error: impl fmt::Display,
    ) -> Result<(), ViewerError> {
        if self.in_flight.remove(&ticket).is_none() {
            log::debug!("ignoring failure of unknown or superseded {ticket:?}: {error}");
            return Err(ViewerError::StaleAsyncResult);
        }
        self.forget_ticket(ticket);
        log::warn!("analysis {ticket:?} failed: {error}");
        Ok(())
    }

    fn forget_ticket(&mut self, ticket: RequestTicket) {
        if self.drawn_ticket == Some(ticket) {
            self.drawn_ticket = None;
        }
        if self.selection_ticket == Some(ticket) {
            self.selection_ticket = None;
        }
    }

    /// Show the result of request `ticket` as a tree mesh.
    ///
    /// Results are dropped with [`ViewerError::StaleAsyncResult`], leaving
    /// the view untouched, when any originating parcel has since been
    /// deselected, when a newer request for the selection or the drawn shape
    /// superseded it, when the drawn shape was cancelled, or when the ticket
    /// is unknown.
    pub fn apply_analysis(
        &mut self,
        view: &mut impl MapView,
        ticket: RequestTicket,
        result: AnalysisResult,
    ) -> Result<&MeshLayer, ViewerError> {
        let Some(origin) = self.in_flight.remove(&ticket) else {
            log::debug!("dropping result for unknown or superseded {ticket:?}");
            return Err(ViewerError::StaleAsyncResult);
        };
        self.forget_ticket(ticket);

        let (boundaries, backdrop_regions) = match &origin {
            Origin::Selection(ids) => {
                let mut polygons = Vec::with_capacity(ids.len());
                for id in ids {
                    match self.selection.get(id) {
                        Some(entry) => polygons.push(entry.polygon.clone()),
                        None => {
                            log::debug!("dropping result for {ticket:?}: {id} no longer selected");
                            return Err(ViewerError::StaleAsyncResult);
                        }
                    }
                }
                (polygons.clone(), Some(polygons))
            }
            Origin::Drawn(commit) => match commit.shape {
                ShapeKind::Rectangle => (Vec::new(), None),
                ShapeKind::Polygon => {
                    let outline = commit.polygon();
                    (vec![outline.clone()], Some(vec![outline]))
                }
            },
        };

        let layer = aggregate(&result.tree_points, self.config.mesh_size, &boundaries);
        log::info!(
            "analysis {ticket:?}: {} trees, {:.2} m3, {} mesh cells",
            result.tree_count,
            result.volume_m3,
            layer.cells.len()
        );

        let backdrop = match (backdrop_regions, layer.backdrop) {
            (Some(regions), _) => Some(Backdrop::Regions(regions)),
            (None, Some(bounds)) => Some(Backdrop::Bounds(bounds)),
            (None, None) => None,
        };
        match backdrop {
            Some(backdrop) => self.show(view, Layer::MeshBackdrop(backdrop)),
            None => self.hide(view, LayerId::MeshBackdrop),
        }
        self.show(view, Layer::Mesh(layer.clone()));

        self.analysis = Some(result);
        Ok(&*self.mesh.insert(layer))
    }

    /// Remove the mesh and forget the last analysis result.
    pub fn clear_analysis(&mut self, view: &mut impl MapView) {
        self.hide(view, LayerId::Mesh);
        self.hide(view, LayerId::MeshBackdrop);
        self.mesh = None;
        self.analysis = None;
    }

    // --- lifecycle ---

    /// Remove every layer this viewer added and return to the initial state.
    ///
    /// Loaded parcels are forgotten too; the configuration is kept.
    pub fn reset(&mut self, view: &mut impl MapView) {
        for id in self.shown.drain(..) {
            view.remove_layer(id);
        }
        view.set_interaction(InteractionFlags::BROWSING);
        *self = Self::new(self.config.clone());
    }

    fn show(&mut self, view: &mut impl MapView, layer: Layer) {
        let id = layer.id();
        if !self.shown.contains(&id) {
            self.shown.push(id);
        }
        view.add_layer(layer);
    }

    fn hide(&mut self, view: &mut impl MapView, id: LayerId) {
        if let Some(i) = self.shown.iter().position(|&s| s == id) {
            self.shown.remove(i);
            view.remove_layer(id);
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timberline_draw::PointerKind;
    use timberline_geo::LatLon;
    use timberline_mesh::{TreeClass, TreeSample};
    use timberline_viewport::FitRequest;

    use crate::analysis::AnalysisMode;
    use crate::error::SourceError;
    use crate::parcel::ParcelAttributes;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Add(LayerId),
        Remove(LayerId),
        Style(String, Style),
        Fit(FitRequest),
        Interaction(InteractionFlags),
    }

    #[derive(Debug, Default)]
    struct RecordingView {
        calls: Vec<Call>,
        layers: HashMap<LayerId, Layer>,
    }

    impl RecordingView {
        fn take(&mut self) -> Vec<Call> {
            std::mem::take(&mut self.calls)
        }
    }

    impl MapView for RecordingView {
        fn add_layer(&mut self, layer: Layer) {
            self.calls.push(Call::Add(layer.id()));
            self.layers.insert(layer.id(), layer);
        }

        fn remove_layer(&mut self, id: LayerId) {
            self.calls.push(Call::Remove(id));
            self.layers.remove(&id);
        }

        fn set_style(&mut self, parcel_id: &str, style: Style) {
            self.calls.push(Call::Style(parcel_id.to_owned(), style));
        }

        fn fit_bounds(&mut self, request: &FitRequest) {
            self.calls.push(Call::Fit(*request));
        }

        fn set_interaction(&mut self, flags: InteractionFlags) {
            self.calls.push(Call::Interaction(flags));
        }
    }

    #[derive(Debug, Default)]
    struct QueuedService {
        submitted: Vec<(RequestTicket, AnalysisRequest)>,
    }

    impl AnalysisService for QueuedService {
        fn submit(&mut self, ticket: RequestTicket, request: &AnalysisRequest) {
            self.submitted.push((ticket, request.clone()));
        }
    }

    struct FailingSource;

    impl ParcelSource for FailingSource {
        fn load(&self) -> Result<Vec<Parcel>, SourceError> {
            Err(SourceError::Unavailable("offline".into()))
        }
    }

    fn parcel(compartment: &str, sub: &str, lat: f64, lon: f64) -> Parcel {
        Parcel::new(
            ParcelAttributes {
                compartment: compartment.into(),
                subcompartment: sub.into(),
                ..ParcelAttributes::default()
            },
            Polygon::from_bounding_box(&BoundingBox::new(lat, lon, lat + 1.0, lon + 1.0)),
        )
    }

    fn loaded() -> (Viewer, RecordingView) {
        let mut viewer = Viewer::default();
        let mut view = RecordingView::default();
        let parcels = vec![
            parcel("0053", "0049", 0.0, 0.0),
            parcel("0053", "0050", 2.0, 2.0),
            parcel("0060", "0001", 5.0, 5.0),
        ];
        viewer
            .load_parcels(&mut view, &parcels)
            .expect("in-memory parcels");
        view.take();
        (viewer, view)
    }

    fn tree(lat: f64, lon: f64, volume_m3: f64) -> TreeSample {
        TreeSample {
            lat,
            lon,
            diameter_cm: 25.0,
            volume_m3,
            class: TreeClass::Broadleaf,
        }
    }

    fn result_with(points: Vec<TreeSample>) -> AnalysisResult {
        AnalysisResult {
            tree_count: points.len() as u64,
            volume_m3: points.iter().map(|p| p.volume_m3).sum(),
            confidence: None,
            warnings: Vec::new(),
            tree_points: points,
        }
    }

    #[test]
    fn toggle_highlights_and_fits() {
        let (mut viewer, mut view) = loaded();
        assert_eq!(viewer.toggle_parcel(&mut view, "0053-0049"), Ok(true));
        assert_eq!(viewer.toggle_parcel(&mut view, "0053-0050"), Ok(true));
        let calls = view.take();
        assert!(calls.contains(&Call::Style("0053-0050".into(), Style::Selected)));
        let Some(Call::Fit(last)) = calls.last() else {
            panic!("expected a fit, got {calls:?}");
        };
        assert_eq!(last.bounds, BoundingBox::new(0.0, 0.0, 3.0, 3.0));
        assert_eq!(last.max_zoom, 16);

        assert_eq!(viewer.toggle_parcel(&mut view, "0053-0050"), Ok(false));
        let calls = view.take();
        assert_eq!(calls[0], Call::Style("0053-0050".into(), Style::Default));
        let Some(Call::Fit(fit)) = calls.last() else {
            panic!("expected a fit, got {calls:?}");
        };
        assert_eq!(fit.bounds, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn unknown_parcel_is_an_error() {
        let (mut viewer, mut view) = loaded();
        assert_eq!(
            viewer.toggle_parcel(&mut view, "9999-1"),
            Err(ViewerError::UnknownParcel("9999-1".into()))
        );
        assert!(view.take().is_empty());
    }

    #[test]
    fn undo_and_clear_restore_styles() {
        let (mut viewer, mut view) = loaded();
        viewer.toggle_parcel(&mut view, "0053-0049").expect("known");
        viewer.toggle_parcel(&mut view, "0060-0001").expect("known");
        view.take();

        assert_eq!(viewer.undo_last(&mut view).as_deref(), Some("0060-0001"));
        assert_eq!(
            view.take()[0],
            Call::Style("0060-0001".into(), Style::Default)
        );

        viewer.clear_selection(&mut view);
        assert_eq!(
            view.take(),
            vec![Call::Style("0053-0049".into(), Style::Default)],
            "clearing to empty does not move the camera"
        );
        assert_eq!(viewer.undo_last(&mut view), None);
        assert!(view.take().is_empty());
    }

    #[test]
    fn selection_info_needs_a_selection() {
        let (mut viewer, mut view) = loaded();
        assert_eq!(viewer.selection_info().err(), Some(ViewerError::NoSelection));
        assert_eq!(viewer.fit_selection(&mut view), Err(ViewerError::NoSelection));
        viewer.toggle_parcel(&mut view, "0060-0001").expect("known");
        viewer.toggle_parcel(&mut view, "0053-0049").expect("known");
        let rows: Vec<String> = viewer
            .selection_info()
            .expect("two selected")
            .iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(rows, vec!["0060-0001", "0053-0049"]);
    }

    #[test]
    fn search_highlights_first_match() {
        let (mut viewer, mut view) = loaded();
        assert_eq!(viewer.search_parcel(&mut view, "0053").as_deref(), Ok("0053-0049"));
        assert_eq!(
            view.take(),
            vec![
                Call::Style("0053-0049".into(), Style::Searched),
                Call::Fit(FitRequest {
                    bounds: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
                    padding_px: 50.0,
                    max_zoom: 16,
                }),
            ]
        );
        assert_eq!(viewer.search_parcel(&mut view, "0001").as_deref(), Ok("0060-0001"));
        assert_eq!(view.take()[0], Call::Style("0053-0049".into(), Style::Default));
        assert_eq!(
            viewer.search_parcel(&mut view, "7777"),
            Err(ViewerError::NotFound("7777".into()))
        );
    }

    #[test]
    fn failed_load_leaves_parcels_empty() {
        let (mut viewer, mut view) = loaded();
        let err = viewer
            .load_parcels(&mut view, &FailingSource)
            .expect_err("offline");
        assert!(matches!(err, ViewerError::DataUnavailable(SourceError::Unavailable(_))));
        assert!(viewer.parcels().is_empty());
        assert_eq!(view.take(), vec![Call::Remove(LayerId::Parcels)]);
        assert!(matches!(
            viewer.toggle_parcel(&mut view, "0053-0049"),
            Err(ViewerError::UnknownParcel(_))
        ));
    }

    #[test]
    fn selected_analysis_request_carries_ids_and_union() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        assert_eq!(
            viewer.request_selected_analysis(&mut service),
            Err(ViewerError::NoSelection)
        );
        viewer.toggle_parcel(&mut view, "0053-0049").expect("known");
        viewer.toggle_parcel(&mut view, "0053-0050").expect("known");
        let ticket = viewer
            .request_selected_analysis(&mut service)
            .expect("selection present");
        let (sent, req) = &service.submitted[0];
        assert_eq!(*sent, ticket);
        assert_eq!(req.bbox, BoundingBox::new(0.0, 0.0, 3.0, 3.0));
        assert_eq!(req.polygon_coords, None);
        assert_eq!(
            req.selected_ids,
            Some(vec!["0053-0049".to_owned(), "0053-0050".to_owned()])
        );
    }

    #[test]
    fn selected_analysis_renders_clipped_mesh() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        viewer.toggle_parcel(&mut view, "0053-0049").expect("known");
        let ticket = viewer
            .request_selected_analysis(&mut service)
            .expect("selection present");
        view.take();

        let result = result_with(vec![tree(0.5, 0.5, 1.0), tree(4.0, 4.0, 2.0)]);
        let cells = viewer
            .apply_analysis(&mut view, ticket, result)
            .expect("fresh result")
            .cells
            .len();
        assert_eq!(cells, 1);
        assert_eq!(
            view.take(),
            vec![Call::Add(LayerId::MeshBackdrop), Call::Add(LayerId::Mesh)]
        );
        assert!(matches!(
            view.layers.get(&LayerId::MeshBackdrop),
            Some(Layer::MeshBackdrop(Backdrop::Regions(r))) if r.len() == 1
        ));
        assert_eq!(viewer.analysis().map(|r| r.tree_count), Some(2));
    }

    #[test]
    fn stale_result_changes_nothing() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        viewer.toggle_parcel(&mut view, "0053-0049").expect("known");
        let ticket = viewer
            .request_selected_analysis(&mut service)
            .expect("selection present");
        viewer.clear_selection(&mut view);
        view.take();
        let before = viewer.selection().snapshot().to_vec();

        let result = result_with(vec![tree(0.5, 0.5, 1.0)]);
        assert_eq!(
            viewer.apply_analysis(&mut view, ticket, result.clone()).err(),
            Some(ViewerError::StaleAsyncResult)
        );
        assert!(view.take().is_empty());
        assert!(viewer.mesh().is_none());
        assert_eq!(viewer.selection().snapshot(), before.as_slice());

        // Delivering twice is also stale.
        viewer.toggle_parcel(&mut view, "0053-0049").expect("known");
        assert_eq!(
            viewer.apply_analysis(&mut view, ticket, result).err(),
            Some(ViewerError::StaleAsyncResult)
        );
    }

    fn draw_rectangle(viewer: &mut Viewer, view: &mut RecordingView) -> DrawCommit {
        viewer.arm_drawing(view, ShapeKind::Rectangle);
        let a = LatLon::new(43.0, 141.0);
        let b = LatLon::new(43.01, 141.01);
        viewer
            .on_pointer_event(view, PointerEvent::new(PointerKind::Down, a, 0))
            .expect("press");
        viewer
            .on_pointer_event(view, PointerEvent::new(PointerKind::Move, b, 10))
            .expect("drag");
        viewer
            .on_pointer_event(view, PointerEvent::new(PointerKind::Up, b, 20))
            .expect("release")
            .expect("committed")
    }

    #[test]
    fn drawing_rectangle_shows_shape_and_restores_interaction() {
        let (mut viewer, mut view) = loaded();
        let commit = draw_rectangle(&mut viewer, &mut view);
        assert_eq!(commit.shape, ShapeKind::Rectangle);
        let calls = view.take();
        assert_eq!(calls[0], Call::Interaction(InteractionFlags::DRAWING));
        assert!(calls.contains(&Call::Add(LayerId::Preview)));
        assert!(calls.contains(&Call::Remove(LayerId::Preview)));
        assert!(calls.contains(&Call::Add(LayerId::DrawnShape)));
        assert_eq!(calls.last(), Some(&Call::Interaction(InteractionFlags::BROWSING)));
        assert_eq!(viewer.drawn_shape(), Some(&commit));
        assert!(!viewer.drawing().is_armed());
    }

    #[test]
    fn small_rectangle_is_reported() {
        let (mut viewer, mut view) = loaded();
        viewer.arm_drawing(&mut view, ShapeKind::Rectangle);
        let a = LatLon::new(43.0, 141.0);
        viewer
            .on_pointer_event(&mut view, PointerEvent::new(PointerKind::Down, a, 0))
            .expect("press");
        let err = viewer
            .on_pointer_event(
                &mut view,
                PointerEvent::new(PointerKind::Up, LatLon::new(43.0001, 141.0), 5),
            )
            .expect_err("too small");
        assert!(matches!(err, ViewerError::ShapeTooSmall { .. }));
        assert!(viewer.drawing().is_armed());
        assert!(!view.layers.contains_key(&LayerId::Preview));
    }

    #[test]
    fn rectangle_analysis_is_unclipped_with_bounds_backdrop() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        let commit = draw_rectangle(&mut viewer, &mut view);
        let ticket = viewer.request_drawn_analysis(&mut service, &commit);
        assert_eq!(service.submitted[0].1.polygon_coords, None);
        assert_eq!(service.submitted[0].1.selected_ids, None);

        let result = result_with(vec![tree(43.005, 141.005, 1.0), tree(50.0, 150.0, 3.0)]);
        let layer = viewer
            .apply_analysis(&mut view, ticket, result)
            .expect("fresh result");
        assert_eq!(layer.cells.len(), 2);
        assert!(matches!(
            view.layers.get(&LayerId::MeshBackdrop),
            Some(Layer::MeshBackdrop(Backdrop::Bounds(_)))
        ));
    }

    #[test]
    fn polygon_analysis_sends_outline_and_clips() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        viewer.arm_drawing(&mut view, ShapeKind::Polygon);
        let ring = [
            LatLon::new(0.0, 0.0),
            LatLon::new(0.0, 1.0),
            LatLon::new(1.0, 1.0),
        ];
        for (i, p) in ring.iter().enumerate() {
            let t = i as Millis * 1_000;
            viewer
                .on_pointer_event(&mut view, PointerEvent::new(PointerKind::Click, *p, t))
                .expect("click");
            viewer.poll(&mut view, t + 300);
        }
        viewer
            .on_pointer_event(&mut view, PointerEvent::new(PointerKind::Click, ring[2], 5_000))
            .expect("first click");
        let commit = viewer
            .on_pointer_event(&mut view, PointerEvent::new(PointerKind::Click, ring[2], 5_100))
            .expect("double click")
            .expect("committed");

        let ticket = viewer.request_drawn_analysis(&mut service, &commit);
        assert_eq!(service.submitted[0].1.polygon_coords, Some(ring.to_vec()));

        // (0.2, 0.8) is inside the triangle, (0.8, 0.2) is not.
        let result = result_with(vec![tree(0.2, 0.8, 1.0), tree(0.8, 0.2, 2.0)]);
        let layer = viewer
            .apply_analysis(&mut view, ticket, result)
            .expect("fresh result");
        assert_eq!(layer.cells.len(), 1);
    }

    #[test]
    fn cancelled_or_superseded_drawing_makes_result_stale() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        let commit = draw_rectangle(&mut viewer, &mut view);
        let first = viewer.request_drawn_analysis(&mut service, &commit);
        let second = viewer.request_drawn_analysis(&mut service, &commit);
        assert!(second > first);
        assert_eq!(
            viewer
                .apply_analysis(&mut view, first, result_with(Vec::new()))
                .err(),
            Some(ViewerError::StaleAsyncResult)
        );

        viewer.cancel_drawing(&mut view);
        assert!(viewer.drawn_shape().is_none());
        assert_eq!(
            viewer
                .apply_analysis(&mut view, second, result_with(Vec::new()))
                .err(),
            Some(ViewerError::StaleAsyncResult)
        );
    }

    #[test]
    fn single_parcel_request_carries_outline_and_registry_id() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        viewer.toggle_parcel(&mut view, "0053-0050").expect("known");
        viewer
            .request_selected_analysis(&mut service)
            .expect("selection present");
        let outline = viewer
            .parcel("0053-0050")
            .expect("loaded")
            .polygon
            .vertices()
            .to_vec();
        let req = &service.submitted[0].1;
        assert_eq!(req.mode, AnalysisMode::Map);
        assert_eq!(req.polygon_coords, Some(outline));
        assert_eq!(req.forest_registry_id.as_deref(), Some("0053-0050"));
        assert_eq!(req.selected_ids, Some(vec!["0053-0050".to_owned()]));
        assert_eq!(req.file_id, None);
    }

    #[test]
    fn failed_and_orphaned_requests_stop_pending() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        viewer.toggle_parcel(&mut view, "0053-0049").expect("known");
        let ticket = viewer
            .request_selected_analysis(&mut service)
            .expect("selection present");
        assert_eq!(viewer.pending_analyses(), 1);
        view.take();

        assert_eq!(viewer.fail_analysis(ticket, "backend returned 500"), Ok(()));
        assert_eq!(viewer.pending_analyses(), 0);
        assert!(view.take().is_empty());
        assert_eq!(
            viewer.fail_analysis(ticket, "again"),
            Err(ViewerError::StaleAsyncResult)
        );

        for _ in 0..100 {
            viewer
                .request_selected_analysis(&mut service)
                .expect("selection present");
        }
        assert_eq!(viewer.pending_analyses(), 1);
        viewer.clear_selection(&mut view);
        assert_eq!(viewer.pending_analyses(), 0);

        let commit = draw_rectangle(&mut viewer, &mut view);
        let drawn = viewer.request_drawn_analysis(&mut service, &commit);
        assert_eq!(viewer.fail_analysis(drawn, "timeout"), Ok(()));
        assert_eq!(viewer.pending_analyses(), 0);
        assert_eq!(
            viewer
                .apply_analysis(&mut view, drawn, result_with(Vec::new()))
                .err(),
            Some(ViewerError::StaleAsyncResult)
        );
    }

    #[test]
    fn newer_selection_request_supersedes_older() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        viewer.toggle_parcel(&mut view, "0053-0049").expect("known");
        let older = viewer
            .request_selected_analysis(&mut service)
            .expect("selection present");
        viewer.toggle_parcel(&mut view, "0053-0050").expect("known");
        let newer = viewer
            .request_selected_analysis(&mut service)
            .expect("selection present");

        let trees = vec![tree(0.5, 0.5, 1.0), tree(2.5, 2.5, 2.0)];
        let cells = viewer
            .apply_analysis(&mut view, newer, result_with(trees.clone()))
            .expect("fresh result")
            .cells
            .len();
        assert_eq!(cells, 2);
        view.take();

        assert_eq!(
            viewer
                .apply_analysis(&mut view, older, result_with(trees))
                .err(),
            Some(ViewerError::StaleAsyncResult)
        );
        assert!(view.take().is_empty());
        assert_eq!(viewer.mesh().map(|m| m.cells.len()), Some(2));
    }

    #[test]
    fn clear_analysis_removes_mesh_layers() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        let commit = draw_rectangle(&mut viewer, &mut view);
        let ticket = viewer.request_drawn_analysis(&mut service, &commit);
        viewer
            .apply_analysis(&mut view, ticket, result_with(vec![tree(43.005, 141.005, 1.0)]))
            .expect("fresh result");
        view.take();

        viewer.clear_analysis(&mut view);
        assert_eq!(
            view.take(),
            vec![Call::Remove(LayerId::Mesh), Call::Remove(LayerId::MeshBackdrop)]
        );
        assert!(viewer.mesh().is_none());
        assert!(viewer.analysis().is_none());
        assert!(viewer.drawn_shape().is_some());

        viewer.clear_analysis(&mut view);
        assert!(view.take().is_empty());
    }

    #[test]
    fn disarm_drops_unfinished_polygon() {
        let (mut viewer, mut view) = loaded();
        viewer.arm_drawing(&mut view, ShapeKind::Polygon);
        viewer
            .on_pointer_event(
                &mut view,
                PointerEvent::new(PointerKind::Click, LatLon::new(43.0, 141.0), 0),
            )
            .expect("click");
        viewer.poll(&mut view, 300);
        assert!(view.layers.contains_key(&LayerId::Preview));
        view.take();

        viewer.disarm_drawing(&mut view);
        assert_eq!(
            view.take(),
            vec![
                Call::Remove(LayerId::Preview),
                Call::Interaction(InteractionFlags::BROWSING),
            ]
        );
        assert!(!viewer.drawing().is_armed());
        assert_eq!(
            viewer.on_pointer_event(
                &mut view,
                PointerEvent::new(PointerKind::Click, LatLon::new(43.1, 141.1), 1_000),
            ),
            Ok(None)
        );
        assert!(view.take().is_empty());
    }

    #[test]
    fn image_and_region_fits_use_their_presets() {
        let (viewer, mut view) = loaded();
        let footprint = BoundingBox::new(43.0, 141.0, 43.02, 141.03);
        viewer.fit_image(&mut view, footprint);
        assert_eq!(
            view.take(),
            vec![Call::Fit(FitRequest {
                bounds: footprint,
                padding_px: 20.0,
                max_zoom: 18,
            })]
        );

        let outlines = [
            Polygon::from_bounding_box(&BoundingBox::new(42.0, 140.0, 43.0, 141.0)),
            Polygon::from_bounding_box(&BoundingBox::new(43.5, 141.5, 44.0, 142.0)),
        ];
        viewer.fit_region(&mut view, &outlines).expect("two outlines");
        assert_eq!(
            view.take(),
            vec![Call::Fit(FitRequest {
                bounds: BoundingBox::new(42.0, 140.0, 44.0, 142.0),
                padding_px: 50.0,
                max_zoom: 11,
            })]
        );
        assert_eq!(
            viewer.fit_region(&mut view, &[]),
            Err(ViewerError::NoSelection)
        );
        assert!(view.take().is_empty());
    }

    #[test]
    fn reset_removes_every_added_layer() {
        let (mut viewer, mut view) = loaded();
        let mut service = QueuedService::default();
        let commit = draw_rectangle(&mut viewer, &mut view);
        let ticket = viewer.request_drawn_analysis(&mut service, &commit);
        viewer
            .apply_analysis(&mut view, ticket, result_with(vec![tree(43.005, 141.005, 1.0)]))
            .expect("fresh result");
        assert!(!view.layers.is_empty());

        viewer.reset(&mut view);
        assert!(view.layers.is_empty(), "left behind: {:?}", view.layers.keys());
        assert!(viewer.parcels().is_empty());
        assert!(viewer.mesh().is_none());
    }
}
