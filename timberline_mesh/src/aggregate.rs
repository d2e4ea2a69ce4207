// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use timberline_geo::distance::{axis_separation_m, lat_degrees_for, lon_degrees_for};
use timberline_geo::{BoundingBox, Region};

use crate::types::{MeshCell, MeshLayer, MeshSize, TreeSample};

/// Opacity of the lowest-volume cell.
pub const MIN_OPACITY: f64 = 0.4;
/// Opacity of the highest-volume cell.
pub const MAX_OPACITY: f64 = 0.95;

/// Volume ratio used for every sample when all volumes are equal.
const FLAT_RATIO: f64 = 0.5;

/// Resolve a [`MeshSize`] to meters for `samples`.
///
/// Non-positive or non-finite sizes fall back to
/// [`MeshSize::DEFAULT_ESTIMATE_FALLBACK_M`].
pub fn resolve_cell_size(size: MeshSize, samples: &[TreeSample]) -> f64 {
    let meters = match size {
        MeshSize::Fixed(m) => m,
        MeshSize::Estimated { fallback } => match samples {
            [first, second, ..] => {
                let (ns, ew) = axis_separation_m(first.position(), second.position());
                let estimate = ns.max(ew);
                if estimate > 0.0 { estimate } else { fallback }
            }
            _ => fallback,
        },
    };
    if meters.is_finite() && meters > 0.0 {
        meters
    } else {
        log::warn!(
            "unusable mesh size {meters} m, using {} m",
            MeshSize::DEFAULT_ESTIMATE_FALLBACK_M
        );
        MeshSize::DEFAULT_ESTIMATE_FALLBACK_M
    }
}

/// Opacity for `volume` within `[min, max]`.
pub fn opacity_for(volume: f64, min: f64, max: f64) -> f64 {
    let ratio = if max > min {
        (volume - min) / (max - min)
    } else {
        FLAT_RATIO
    };
    MIN_OPACITY + (MAX_OPACITY - MIN_OPACITY) * ratio
}

/// Aggregate `samples` into a mesh clipped to `boundaries`.
///
/// Every sample yields one cell centered on it, with a uniform step pair
/// derived from `size` and the mean sample latitude. A cell is kept when its
/// center lies inside at least one boundary; an empty `boundaries` slice keeps
/// every cell. Opacity scales with volume across all samples, including
/// those whose cells were clipped away.
///
/// Cells come back in sample order. Each call recomputes from scratch.
pub fn aggregate<R: Region>(samples: &[TreeSample], size: MeshSize, boundaries: &[R]) -> MeshLayer {
    if samples.is_empty() {
        return MeshLayer::default();
    }

    let cell_size_m = resolve_cell_size(size, samples);
    let avg_lat = samples.iter().map(|s| s.lat).sum::<f64>() / samples.len() as f64;
    let lat_step = lat_degrees_for(cell_size_m);
    let lon_step = lon_degrees_for(cell_size_m, avg_lat);

    let (min_volume, max_volume) = samples.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), s| (lo.min(s.volume_m3), hi.max(s.volume_m3)),
    );

    let mut backdrop: Option<BoundingBox> = None;
    let mut cells = Vec::with_capacity(samples.len());
    for sample in samples {
        let center = sample.position();
        let bounds = BoundingBox::centered(center, lat_step, lon_step);
        backdrop = Some(backdrop.map_or(bounds, |b| b.union(bounds)));

        if !boundaries.is_empty() && !boundaries.iter().any(|r| r.contains_point(center)) {
            continue;
        }
        cells.push(MeshCell {
            bounds,
            count: 1,
            volume_m3: sample.volume_m3,
            dominant_class: sample.class,
            opacity: opacity_for(sample.volume_m3, min_volume, max_volume),
        });
    }

    log::debug!(
        "mesh: {}/{} samples kept, {cell_size_m:.1} m cells, {min_volume:.2}..{max_volume:.2} m3",
        cells.len(),
        samples.len(),
    );

    MeshLayer {
        cells,
        backdrop,
        cell_size_m,
        lat_step,
        lon_step,
    }
}
