//! Owned model of the overlay map: coordinates, icons, markers and layer
//! groups. Front ends render from these types; the renderers in
//! [`crate::markers`] only ever produce them.

pub mod layer;
pub mod marker;

pub use layer::{LayerGroup, MarkerEvent, MarkerId};
pub use marker::{ContextMenuItem, Icon, IconSet, MapAction, Marker, MarkerOptions};

use serde::{Deserialize, Serialize};

/// Zoom level the game's continent coordinates are expressed at.
pub const DEFAULT_MAX_ZOOM: u8 = 7;

pub type Coord = [f64; 2];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Simple (flat) CRS projection, unprojecting continent pixels at the max zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    max_zoom: u8,
}

impl Projection {
    pub fn new(max_zoom: u8) -> Self {
        Self { max_zoom }
    }

    pub fn to_lat_lng(&self, coord: Coord) -> LatLng {
        let scale = f64::from(1u32 << self.max_zoom.min(31));
        LatLng::new(-coord[1] / scale, coord[0] / scale)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ZOOM)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
}

impl Viewport {
    pub fn new(center: LatLng) -> Self {
        Self { center }
    }

    pub fn apply(&mut self, action: &MapAction) {
        match action {
            MapAction::PanTo(target) => {
                tracing::debug!("Panning viewport to {:?}", target);
                self.center = *target;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_unprojects_at_max_zoom() {
        let projection = Projection::default();
        let ll = projection.to_lat_lng([256.0, 128.0]);
        assert_eq!(ll, LatLng::new(-1.0, 2.0));
    }

    #[test]
    fn pan_action_moves_viewport() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0));
        viewport.apply(&MapAction::PanTo(LatLng::new(-3.5, 7.25)));
        assert_eq!(viewport.center, LatLng::new(-3.5, 7.25));
    }
}
