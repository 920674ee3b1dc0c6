use serde::{Deserialize, Serialize};

use super::travel::{TravelCategory, TravelEndpoint, TravelPathPair, TravelPaths};
use crate::map::Coord;
use crate::models::zone::ZoneIndex;

const UNKNOWN_ZONE: &str = "Unknown";
const UNKNOWN_MAP_ID: i64 = -1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawLaunchpad {
    pub c: [Coord; 2],
}

/// Gateway connections as published by the resource site: bare coordinate
/// pairs with no titles or zone info.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RawConnections {
    #[serde(default)]
    pub interborders: Vec<[Coord; 2]>,
    #[serde(default)]
    pub interzones: Vec<[Coord; 2]>,
    #[serde(default)]
    pub intrazones: Vec<[Coord; 2]>,
    #[serde(default)]
    pub launchpads: Vec<RawLaunchpad>,
}

struct Style {
    title_prefix: &'static str,
    icon_a: &'static str,
    icon_b: &'static str,
}

fn style(category: TravelCategory) -> Style {
    match category {
        TravelCategory::Interborders => Style {
            title_prefix: "Zone Portal",
            icon_a: "interborder",
            icon_b: "interborder",
        },
        TravelCategory::Interzones => Style {
            title_prefix: "Asura Gate",
            icon_a: "asura_gate",
            icon_b: "asura_gate",
        },
        TravelCategory::Intrazones => Style {
            title_prefix: "Zone Transport",
            icon_a: "skritt_tunnel",
            icon_b: "skritt_tunnel",
        },
        TravelCategory::Launchpads => Style {
            title_prefix: "Launch Pad",
            icon_a: "launchpad",
            icon_b: "launchpad_target",
        },
    }
}

fn locate(zones: &ZoneIndex, pos: Coord) -> (i64, String) {
    match zones.find_zone(pos) {
        Some(zone) => (zone.map_id, zone.name.to_string()),
        None => {
            tracing::warn!("Could not find map for {:?}", pos);
            (UNKNOWN_MAP_ID, UNKNOWN_ZONE.to_string())
        }
    }
}

fn build_pair(category: TravelCategory, ends: [Coord; 2], zones: &ZoneIndex) -> TravelPathPair {
    let style = style(category);
    let (id_a, name_a) = locate(zones, ends[0]);
    let (id_b, name_b) = locate(zones, ends[1]);

    let (title_a, title_b) = if name_a == name_b {
        (style.title_prefix.to_string(), style.title_prefix.to_string())
    } else {
        (
            format!("{} to {}", style.title_prefix, name_b),
            format!("{} to {}", style.title_prefix, name_a),
        )
    };

    let mut end_a = TravelEndpoint::new(ends[0], title_a, style.icon_a);
    end_a.map_id = Some(id_a);
    end_a.map_name = Some(name_a);
    let mut end_b = TravelEndpoint::new(ends[1], title_b, style.icon_b);
    end_b.map_id = Some(id_b);
    end_b.map_name = Some(name_b);
    TravelPathPair { end_a, end_b }
}

/// Titles and classifies raw gateway connections by the zones they join.
pub fn build_travel_paths(raw: &RawConnections, zones: &ZoneIndex) -> TravelPaths {
    let mut paths = TravelPaths::default();
    for category in TravelCategory::ALL {
        let pairs: Vec<[Coord; 2]> = match category {
            TravelCategory::Interborders => raw.interborders.clone(),
            TravelCategory::Interzones => raw.interzones.clone(),
            TravelCategory::Intrazones => raw.intrazones.clone(),
            TravelCategory::Launchpads => raw.launchpads.iter().map(|l| l.c).collect(),
        };
        tracing::debug!("Building travel path info for {} {}", pairs.len(), category);
        *paths.category_mut(category) = pairs
            .into_iter()
            .map(|ends| build_pair(category, ends, zones))
            .collect();
    }
    paths
}
