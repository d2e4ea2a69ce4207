// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw a rectangle and a polygon, analyze each, and show the tree mesh.
//!
//! This example shows how to combine:
//! - `timberline_draw` (through the viewer) for rectangle and polygon drawing,
//! - `timberline_map` for requests, the stale-result guard and mesh layers,
//! - `timberline_mesh` for the density cells.
//!
//! The analysis backend is simulated: it places trees on a regular grid inside
//! the requested bounds.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p timberline_demos --example draw_and_analyze`

use kurbo::Rect;
use timberline_draw::{PointerEvent, PointerKind, ShapeKind};
use timberline_geo::LatLon;
use timberline_map::{
    AnalysisRequest, AnalysisResult, AnalysisService, Confidence, InteractionFlags, Layer,
    LayerId, MapView, RequestTicket, Style, Viewer, ViewerConfig,
};
use timberline_mesh::{MeshSize, TreeClass, TreeSample};
use timberline_viewport::FitRequest;

/// Prints every call instead of drawing.
struct ConsoleView;

impl MapView for ConsoleView {
    fn add_layer(&mut self, layer: Layer) {
        match &layer {
            Layer::Mesh(mesh) => println!("  + mesh: {} cells", mesh.cells.len()),
            Layer::Preview(preview) => println!("  + preview: {preview:?}"),
            other => println!("  + {:?}", other.id()),
        }
    }

    fn remove_layer(&mut self, id: LayerId) {
        println!("  - {id:?}");
    }

    fn set_style(&mut self, parcel_id: &str, style: Style) {
        println!("  style {parcel_id} -> {style:?}");
    }

    fn fit_bounds(&mut self, request: &FitRequest) {
        let r: Rect = request.bounds.to_rect();
        println!(
            "  fit lon {:.4}..{:.4} lat {:.4}..{:.4} (max zoom {})",
            r.x0, r.x1, r.y0, r.y1, request.max_zoom
        );
    }

    fn set_interaction(&mut self, flags: InteractionFlags) {
        println!("  interaction {flags:?}");
    }
}

/// Queues requests; `complete` answers them with grid-placed trees.
#[derive(Default)]
struct SimulatedBackend {
    queue: Vec<(RequestTicket, AnalysisRequest)>,
}

impl AnalysisService for SimulatedBackend {
    fn submit(&mut self, ticket: RequestTicket, request: &AnalysisRequest) {
        self.queue.push((ticket, request.clone()));
    }
}

impl SimulatedBackend {
    fn complete(&mut self) -> Vec<(RequestTicket, AnalysisResult)> {
        self.queue
            .drain(..)
            .map(|(ticket, req)| (ticket, simulate(&req)))
            .collect()
    }
}

fn simulate(req: &AnalysisRequest) -> AnalysisResult {
    const STEPS: u32 = 8;
    let b = req.bbox;
    let mut tree_points = Vec::new();
    for i in 0..STEPS {
        for j in 0..STEPS {
            let fi = f64::from(i) + 0.5;
            let fj = f64::from(j) + 0.5;
            tree_points.push(TreeSample {
                lat: b.min_lat + b.lat_span() * fi / f64::from(STEPS),
                lon: b.min_lon + b.lon_span() * fj / f64::from(STEPS),
                diameter_cm: 15.0 + f64::from((i * 7 + j * 3) % 30),
                volume_m3: 0.2 + f64::from((i * 5 + j * 11) % 10) / 10.0,
                class: if (i + j) % 5 < 3 {
                    TreeClass::Coniferous
                } else {
                    TreeClass::Broadleaf
                },
            });
        }
    }
    let area = req.area_km2();
    AnalysisResult {
        tree_count: tree_points.len() as u64,
        volume_m3: tree_points.iter().map(|t| t.volume_m3).sum(),
        confidence: Some(if !(0.01..=10.0).contains(&area) {
            Confidence::Low
        } else {
            Confidence::Medium
        }),
        warnings: vec![format!("area {area:.4} km2")],
        tree_points,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig {
        mesh_size: MeshSize::ESTIMATED,
        ..ViewerConfig::default()
    };
    let mut viewer = Viewer::new(config);
    let mut view = ConsoleView;
    let mut backend = SimulatedBackend::default();

    println!("rectangle:");
    viewer.arm_drawing(&mut view, ShapeKind::Rectangle);
    let sw = LatLon::new(43.000, 141.000);
    let ne = LatLon::new(43.004, 141.006);
    for (kind, at, t) in [
        (PointerKind::Down, sw, 0),
        (PointerKind::Move, LatLon::new(43.002, 141.003), 16),
        (PointerKind::Up, ne, 32),
    ] {
        if let Some(commit) = viewer.on_pointer_event(&mut view, PointerEvent::new(kind, at, t))? {
            viewer.request_drawn_analysis(&mut backend, &commit);
        }
    }
    for (ticket, result) in backend.complete() {
        let mesh = viewer.apply_analysis(&mut view, ticket, result)?;
        println!("  -> {} cells of {:.1} m", mesh.cells.len(), mesh.cell_size_m);
    }

    println!("polygon:");
    viewer.arm_drawing(&mut view, ShapeKind::Polygon);
    let ring = [
        LatLon::new(43.010, 141.000),
        LatLon::new(43.016, 141.002),
        LatLon::new(43.014, 141.009),
        LatLon::new(43.009, 141.007),
    ];
    let mut now = 1_000;
    for p in ring {
        viewer.on_pointer_event(&mut view, PointerEvent::new(PointerKind::Click, p, now))?;
        now += 400;
        viewer.poll(&mut view, now);
    }
    let last = ring[ring.len() - 1];
    viewer.on_pointer_event(&mut view, PointerEvent::new(PointerKind::Click, last, now))?;
    let commit = viewer
        .on_pointer_event(&mut view, PointerEvent::new(PointerKind::Click, last, now + 120))?
        .ok_or_else(|| anyhow::anyhow!("double click did not close the polygon"))?;
    viewer.request_drawn_analysis(&mut backend, &commit);
    for (ticket, result) in backend.complete() {
        let mesh = viewer.apply_analysis(&mut view, ticket, result)?;
        println!("  -> {} cells kept inside the outline", mesh.cells.len());
    }

    println!("teardown:");
    viewer.reset(&mut view);
    Ok(())
}
