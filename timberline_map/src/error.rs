// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use timberline_draw::DrawError;
use timberline_viewport::FitError;

/// Failure to load parcels from a [`ParcelSource`](crate::ParcelSource).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceError {
    /// The source could not be reached or read.
    Unavailable(String),
    /// The data was read but could not be understood.
    Malformed(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(why) => write!(f, "parcel source unavailable: {why}"),
            Self::Malformed(why) => write!(f, "malformed parcel data: {why}"),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Failure to parse a [`ViewerConfig`](crate::ViewerConfig).
#[derive(Debug)]
pub struct ConfigError(serde_json::Error);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid viewer config: {}", self.0)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self(err)
    }
}

/// Everything a [`Viewer`](crate::Viewer) operation can report.
///
/// None of these are fatal: the viewer is left in a consistent state and the
/// host may simply tell the user and carry on.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerError {
    /// A rectangle drag was shorter than the minimum distance.
    ShapeTooSmall {
        /// Anchor-to-release distance in meters.
        distance_m: f64,
    },
    /// A polygon was closed with fewer than three vertices.
    InvalidShape {
        /// Vertices collected so far.
        vertices: usize,
    },
    /// The operation needs at least one selected parcel.
    NoSelection,
    /// An analysis result arrived for a request that no longer applies.
    StaleAsyncResult,
    /// Parcel data could not be loaded.
    DataUnavailable(SourceError),
    /// No parcel matched a search query.
    NotFound(String),
    /// A parcel id is not in the loaded parcel set.
    UnknownParcel(String),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeTooSmall { distance_m } => write!(
                f,
                "the drawn rectangle is too small ({distance_m:.1} m); drag over a larger area"
            ),
            Self::InvalidShape { vertices } => write!(
                f,
                "a polygon needs at least 3 vertices, only {vertices} placed"
            ),
            Self::NoSelection => f.write_str("no parcel is selected"),
            Self::StaleAsyncResult => {
                f.write_str("analysis result no longer matches the selection")
            }
            Self::DataUnavailable(err) => write!(f, "parcel data unavailable: {err}"),
            Self::NotFound(query) => write!(f, "no parcel matches \"{query}\""),
            Self::UnknownParcel(id) => write!(f, "unknown parcel \"{id}\""),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DataUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DrawError> for ViewerError {
    fn from(err: DrawError) -> Self {
        match err {
            DrawError::ShapeTooSmall { distance_m } => Self::ShapeTooSmall { distance_m },
            DrawError::InvalidShape { vertices } => Self::InvalidShape { vertices },
        }
    }
}

impl From<FitError> for ViewerError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::NoSelection => Self::NoSelection,
        }
    }
}

impl From<SourceError> for ViewerError {
    fn from(err: SourceError) -> Self {
        Self::DataUnavailable(err)
    }
}
