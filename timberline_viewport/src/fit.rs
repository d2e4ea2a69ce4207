// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use timberline_geo::{BoundingBox, Region};

/// Padding and zoom ceiling for a fit.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitOptions {
    /// Inset in device pixels kept clear on every side.
    pub padding_px: f64,
    /// Highest zoom level the map may reach when fitting.
    pub max_zoom: u8,
}

impl FitOptions {
    /// Selected parcels or a searched parcel.
    pub const SELECTION: Self = Self {
        padding_px: 50.0,
        max_zoom: 16,
    };

    /// A single aerial image footprint.
    pub const IMAGE: Self = Self {
        padding_px: 20.0,
        max_zoom: 18,
    };

    /// An administrative region such as a municipality.
    pub const REGION: Self = Self {
        padding_px: 50.0,
        max_zoom: 11,
    };
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::SELECTION
    }
}

/// What the map should show after a fit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FitRequest {
    /// Bounds to bring into view.
    pub bounds: BoundingBox,
    /// Inset in device pixels.
    pub padding_px: f64,
    /// Zoom ceiling.
    pub max_zoom: u8,
}

/// Failure to produce a fit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FitError {
    /// There was nothing to fit.
    NoSelection,
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSelection => f.write_str("nothing to fit"),
        }
    }
}

impl core::error::Error for FitError {}

/// Componentwise min/max over `boxes`.
pub fn union_bounds<I>(boxes: I) -> Result<BoundingBox, FitError>
where
    I: IntoIterator<Item = BoundingBox>,
{
    boxes
        .into_iter()
        .reduce(BoundingBox::union)
        .ok_or(FitError::NoSelection)
}

/// Build a fit request enclosing every region in `regions`.
pub fn fit<R: Region>(regions: &[R], options: FitOptions) -> Result<FitRequest, FitError> {
    let bounds = union_bounds(regions.iter().map(Region::bounding_box))?;
    Ok(FitRequest {
        bounds,
        padding_px: options.padding_px,
        max_zoom: options.max_zoom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use timberline_geo::{LatLon, Polygon};

    #[test]
    fn union_is_componentwise() {
        let u = union_bounds([
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            BoundingBox::new(2.0, 2.0, 3.0, 3.0),
        ]);
        assert_eq!(u, Ok(BoundingBox::new(0.0, 0.0, 3.0, 3.0)));
    }

    #[test]
    fn empty_input_is_no_selection() {
        assert_eq!(union_bounds([]), Err(FitError::NoSelection));
        let none: [Polygon; 0] = [];
        assert_eq!(fit(&none, FitOptions::SELECTION), Err(FitError::NoSelection));
    }

    #[test]
    fn fit_carries_options() {
        let tri = Polygon::new(vec![
            LatLon::new(43.0, 141.0),
            LatLon::new(43.2, 141.1),
            LatLon::new(43.1, 141.3),
        ])
        .expect("three vertices");
        let req = fit(&[tri], FitOptions::IMAGE).expect("one region");
        assert_eq!(req.bounds, BoundingBox::new(43.0, 141.0, 43.2, 141.3));
        assert_eq!(req.padding_px, 20.0);
        assert_eq!(req.max_zoom, 18);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let boxes = [
            BoundingBox::new(1.0, 1.0, 2.0, 2.0),
            BoundingBox::new(-1.0, 0.0, 0.5, 0.5),
        ];
        let before = boxes;
        let req = fit(&boxes, FitOptions::REGION).expect("two regions");
        assert_eq!(boxes, before);
        assert_eq!(req.bounds, BoundingBox::new(-1.0, 0.0, 2.0, 2.0));
        assert_eq!(req.max_zoom, 11);
    }
}
