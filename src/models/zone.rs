use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::map::Coord;

// Drop-down value meaning "nothing selected"
pub const PLACEHOLDER_ZONE: u32 = 0;
const PLACEHOLDER_LABEL: &str = "{Select a Zone}";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ZoneRect {
    pub map_id: i64,
    pub name: String,
    pub continent_rect: [Coord; 2],
    #[serde(default = "default_world_zone")]
    pub world_zone: bool,
}

fn default_world_zone() -> bool {
    true
}

impl ZoneRect {
    pub fn contains(&self, pos: Coord) -> bool {
        let [[x1, y1], [x2, y2]] = self.continent_rect;
        x1 <= pos[0] && pos[0] <= x2 && y1 <= pos[1] && pos[1] <= y2
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ZoneIndex {
    pub zones: Vec<ZoneRect>,
}

impl ZoneIndex {
    pub fn new(zones: Vec<ZoneRect>) -> Self {
        Self { zones }
    }

    /// First world zone whose rectangle contains `pos`. Non-world maps
    /// (instances, cities overlapping zones) are passed over.
    pub fn find_zone(&self, pos: Coord) -> Option<&ZoneRect> {
        for zone in self.zones.iter().filter(|z| z.contains(pos)) {
            if zone.world_zone {
                tracing::debug!("Found map {} for position {:?}", zone.map_id, pos);
                return Some(zone);
            }
            tracing::debug!("Found non-world-zone map {} for position {:?}", zone.map_id, pos);
        }
        None
    }

    pub fn names(&self) -> HashMap<u32, String> {
        self.zones
            .iter()
            .filter(|z| z.world_zone)
            .filter_map(|z| u32::try_from(z.map_id).ok().map(|id| (id, z.name.to_string())))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub current_map_id: Option<u32>,
    pub zone_names: HashMap<u32, String>,
}

impl PlayerState {
    pub fn new(zone_names: HashMap<u32, String>) -> Self {
        Self {
            current_map_id: None,
            zone_names,
        }
    }

    pub fn zone_name(&self, map_id: u32) -> Option<&str> {
        self.zone_names.get(&map_id).map(String::as_str)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ZoneOption {
    pub value: u32,
    pub label: String,
}

/// Choices for the zone drop-down: the placeholder first, then every zone
/// sorted by name.
pub fn zone_options(zone_names: &HashMap<u32, String>) -> Vec<ZoneOption> {
    let mut options = vec![ZoneOption {
        value: PLACEHOLDER_ZONE,
        label: PLACEHOLDER_LABEL.to_string(),
    }];
    let mut zones: Vec<(&u32, &String)> = zone_names.iter().collect();
    zones.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)));
    options.extend(zones.into_iter().map(|(id, name)| ZoneOption {
        value: *id,
        label: name.to_string(),
    }));
    options
}
