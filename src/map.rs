// src/map.rs

use serde::Serialize;

use crate::coordinate::{Coordinate, Region};

/// The map widget, as seen from the controller.
pub trait MapDisplay: Send + Sync {
    /// Moves the camera to `region`. Fire-and-forget: the animation is not awaited.
    fn animate_to_region(&self, region: Region);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    /// The current map center.
    Center,
    /// The most recent successful search result.
    SearchResult,
}

/// A pin the map widget should render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub coordinate: Coordinate,
}
