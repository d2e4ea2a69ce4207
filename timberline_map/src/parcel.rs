// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forest parcels and where they come from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use timberline_geo::{LatLon, Polygon};

use crate::error::SourceError;

/// GeoJSON property holding the compartment number.
pub const COMPARTMENT_PROPERTY: &str = "林班";
/// GeoJSON property holding the sub-compartment number.
pub const SUBCOMPARTMENT_PROPERTY: &str = "小班";
/// GeoJSON property holding the registry key code.
pub const KEYCODE_PROPERTY: &str = "KEYCODE";
/// GeoJSON property holding the mapped area in hectares.
pub const AREA_PROPERTY: &str = "GISAREA";

/// Registry attributes of a forest parcel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelAttributes {
    /// Compartment number.
    pub compartment: String,
    /// Sub-compartment number within the compartment.
    pub subcompartment: String,
    /// Forest registry key code, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keycode: Option<String>,
    /// Mapped area in hectares, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_ha: Option<f64>,
}

/// A selectable forest parcel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    /// Registry attributes.
    pub attributes: ParcelAttributes,
    /// Outline.
    pub polygon: Polygon,
}

impl Parcel {
    /// Build a parcel.
    pub fn new(attributes: ParcelAttributes, polygon: Polygon) -> Self {
        Self {
            attributes,
            polygon,
        }
    }

    /// The selection id, `"{compartment}-{subcompartment}"`.
    pub fn id(&self) -> String {
        format!(
            "{}-{}",
            self.attributes.compartment, self.attributes.subcompartment
        )
    }

    /// Whether `query` names this parcel by id, compartment or sub-compartment.
    pub fn matches(&self, query: &str) -> bool {
        self.id() == query
            || self.attributes.compartment == query
            || self.attributes.subcompartment == query
    }
}

/// Anything that can supply the parcel set.
pub trait ParcelSource {
    /// Load every parcel.
    fn load(&self) -> Result<Vec<Parcel>, SourceError>;
}

impl ParcelSource for [Parcel] {
    fn load(&self) -> Result<Vec<Parcel>, SourceError> {
        Ok(self.to_vec())
    }
}

impl ParcelSource for Vec<Parcel> {
    fn load(&self) -> Result<Vec<Parcel>, SourceError> {
        Ok(self.clone())
    }
}

/// Parcels from a GeoJSON `FeatureCollection` of forest registry sub-compartments.
///
/// Each feature needs [`COMPARTMENT_PROPERTY`] and [`SUBCOMPARTMENT_PROPERTY`]
/// properties and a `Polygon` or `MultiPolygon` geometry. Only the outer ring
/// of the first polygon is kept, and a closing vertex that repeats the first
/// one is dropped. Features that lack either are skipped with a warning.
#[derive(Clone, Debug)]
pub struct GeoJsonSource {
    text: String,
}

impl GeoJsonSource {
    /// Wrap GeoJSON text; parsing happens in [`ParcelSource::load`].
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ParcelSource for GeoJsonSource {
    fn load(&self) -> Result<Vec<Parcel>, SourceError> {
        parcels_from_geojson(&self.text)
    }
}

/// Parse a GeoJSON `FeatureCollection`; see [`GeoJsonSource`].
pub fn parcels_from_geojson(text: &str) -> Result<Vec<Parcel>, SourceError> {
    let root: Value = serde_json::from_str(text)?;
    let features = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Malformed("missing \"features\" array".into()))?;

    let mut parcels = Vec::with_capacity(features.len());
    for (i, feature) in features.iter().enumerate() {
        match parcel_from_feature(feature) {
            Some(parcel) => parcels.push(parcel),
            None => log::warn!("skipping parcel feature {i}: missing attributes or geometry"),
        }
    }
    Ok(parcels)
}

fn parcel_from_feature(feature: &Value) -> Option<Parcel> {
    let props = feature.get("properties")?;
    let attributes = ParcelAttributes {
        compartment: property_string(props.get(COMPARTMENT_PROPERTY)?)?,
        subcompartment: property_string(props.get(SUBCOMPARTMENT_PROPERTY)?)?,
        keycode: props.get(KEYCODE_PROPERTY).and_then(property_string),
        area_ha: props.get(AREA_PROPERTY).and_then(property_number),
    };
    let ring = outer_ring(feature.get("geometry")?)?;
    let polygon = Polygon::new(ring).ok()?;
    Some(Parcel::new(attributes, polygon))
}

/// Registry numbers arrive as either strings or numbers.
fn property_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn property_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn outer_ring(geometry: &Value) -> Option<Vec<LatLon>> {
    let coords = geometry.get("coordinates")?;
    let ring = match geometry.get("type")?.as_str()? {
        "Polygon" => coords.get(0)?,
        "MultiPolygon" => coords.get(0)?.get(0)?,
        _ => return None,
    };
    let mut out = ring
        .as_array()?
        .iter()
        .map(|pos| {
            // GeoJSON positions are [lon, lat].
            let lon = pos.get(0)?.as_f64()?;
            let lat = pos.get(1)?.as_f64()?;
            Some(LatLon::new(lat, lon))
        })
        .collect::<Option<Vec<_>>>()?;
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    Some(out)
}
