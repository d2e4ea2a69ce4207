// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-select forest parcels, search, undo, and watch a stale result drop.
//!
//! Parcels are read from an inline GeoJSON collection shaped like the forest
//! registry export. A selection is sent for analysis, then cleared before the
//! answer arrives, so the viewer discards the late result.
//!
//! Run:
//! - `RUST_LOG=info cargo run -p timberline_demos --example parcel_selection`

use serde_json::json;
use timberline_map::{
    AnalysisRequest, AnalysisResult, AnalysisService, GeoJsonSource, InteractionFlags, Layer,
    LayerId, MapView, RequestTicket, Style, Viewer, ViewerConfig, ViewerError,
};
use timberline_viewport::FitRequest;

#[derive(Default)]
struct TallyView {
    restyles: usize,
    fits: Vec<FitRequest>,
}

impl MapView for TallyView {
    fn add_layer(&mut self, layer: Layer) {
        log::info!("show {:?}", layer.id());
    }

    fn remove_layer(&mut self, id: LayerId) {
        log::info!("hide {id:?}");
    }

    fn set_style(&mut self, parcel_id: &str, style: Style) {
        self.restyles += 1;
        println!("  {parcel_id}: {style:?}");
    }

    fn fit_bounds(&mut self, request: &FitRequest) {
        self.fits.push(*request);
    }

    fn set_interaction(&mut self, _: InteractionFlags) {}
}

#[derive(Default)]
struct Outbox(Vec<(RequestTicket, AnalysisRequest)>);

impl AnalysisService for Outbox {
    fn submit(&mut self, ticket: RequestTicket, request: &AnalysisRequest) {
        self.0.push((ticket, request.clone()));
    }
}

fn square(lon: f64, lat: f64, size: f64) -> serde_json::Value {
    json!([[
        [lon, lat],
        [lon + size, lat],
        [lon + size, lat + size],
        [lon, lat + size],
        [lon, lat]
    ]])
}

fn registry() -> String {
    let feature = |rinban: &str, shouhan: &str, lon: f64, lat: f64| {
        json!({
            "type": "Feature",
            "properties": { "林班": rinban, "小班": shouhan, "GISAREA": 2.4 },
            "geometry": { "type": "Polygon", "coordinates": square(lon, lat, 0.004) }
        })
    };
    json!({
        "type": "FeatureCollection",
        "features": [
            feature("0053", "0049", 141.300, 43.000),
            feature("0053", "0050", 141.305, 43.000),
            feature("0054", "0001", 141.310, 43.006),
        ]
    })
    .to_string()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut viewer = Viewer::new(ViewerConfig::default());
    let mut view = TallyView::default();
    let loaded = viewer.load_parcels(&mut view, &GeoJsonSource::new(registry()))?;
    println!("loaded {loaded} parcels");

    println!("search 0054:");
    let hit = viewer.search_parcel(&mut view, "0054")?;
    println!("  found {hit}");

    println!("select:");
    for id in ["0053-0049", "0053-0050", "0054-0001"] {
        viewer.toggle_parcel(&mut view, id)?;
    }
    if let Some(last) = view.fits.last() {
        println!("  camera on {:?}", last.bounds);
    }

    println!("undo:");
    let undone = viewer.undo_last(&mut view);
    println!("  removed {undone:?}");

    for parcel in viewer.selection_info()? {
        let a = &parcel.attributes;
        println!(
            "  {} compartment {} sub {} area {:?} ha",
            parcel.id(),
            a.compartment,
            a.subcompartment,
            a.area_ha
        );
    }

    let mut outbox = Outbox::default();
    viewer.request_selected_analysis(&mut outbox)?;
    let (ticket, request) = outbox.0.remove(0);
    println!("request body: {}", request.to_json()?);

    println!("clear before the answer arrives:");
    viewer.clear_selection(&mut view);
    let late = AnalysisResult::from_json(r#"{ "tree_count": 0, "volume_m3": 0.0 }"#)?;
    match viewer.apply_analysis(&mut view, ticket, late) {
        Err(ViewerError::StaleAsyncResult) => println!("  late result dropped"),
        Err(other) => return Err(other.into()),
        Ok(_) => anyhow::bail!("stale result was applied"),
    }

    match viewer.selection_info() {
        Err(ViewerError::NoSelection) => println!("selection is empty"),
        other => anyhow::bail!("unexpected {other:?}"),
    }
    println!("{} restyles, {} camera moves", view.restyles, view.fits.len());
    Ok(())
}
