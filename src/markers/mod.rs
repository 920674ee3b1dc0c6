pub mod connections;
pub mod resource;
pub mod travel;

pub use connections::{build_travel_paths, RawConnections};
pub use resource::{render_resource_markers, ResourceData, ResourceLayerKind};
pub use travel::{render_travel_markers, TravelPaths};
