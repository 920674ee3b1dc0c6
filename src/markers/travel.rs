use serde::{Deserialize, Serialize};

use crate::map::{
    ContextMenuItem, Coord, Icon, IconSet, LatLng, LayerGroup, MapAction, Marker, MarkerEvent,
    MarkerId, MarkerOptions, Projection,
};

pub const TRAVEL_LAYER: &str = "travel";
const PAN_TO_OTHER_END: &str = "Pan to Other End";

#[derive(strum_macros::Display, Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TravelCategory {
    // Zone portals
    #[strum(serialize = "interborders")]
    Interborders,
    // Asura gates
    #[strum(serialize = "interzones")]
    Interzones,
    #[strum(serialize = "intrazones")]
    Intrazones,
    #[strum(serialize = "launchpads")]
    Launchpads,
}

impl TravelCategory {
    pub const ALL: [TravelCategory; 4] = [
        TravelCategory::Interborders,
        TravelCategory::Interzones,
        TravelCategory::Intrazones,
        TravelCategory::Launchpads,
    ];
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TravelEndpoint {
    pub coord: Option<Coord>,
    #[serde(default)]
    pub title: String,
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_name: Option<String>,
}

impl TravelEndpoint {
    pub fn new(coord: Coord, title: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            coord: Some(coord),
            title: title.into(),
            icon: Some(icon.into()),
            map_id: None,
            map_name: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TravelPathPair {
    pub end_a: TravelEndpoint,
    pub end_b: TravelEndpoint,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TravelPaths {
    #[serde(default)]
    pub interborders: Vec<TravelPathPair>,
    #[serde(default)]
    pub interzones: Vec<TravelPathPair>,
    #[serde(default)]
    pub intrazones: Vec<TravelPathPair>,
    #[serde(default)]
    pub launchpads: Vec<TravelPathPair>,
}

impl TravelPaths {
    pub fn category(&self, category: TravelCategory) -> &[TravelPathPair] {
        match category {
            TravelCategory::Interborders => &self.interborders,
            TravelCategory::Interzones => &self.interzones,
            TravelCategory::Intrazones => &self.intrazones,
            TravelCategory::Launchpads => &self.launchpads,
        }
    }

    pub fn category_mut(&mut self, category: TravelCategory) -> &mut Vec<TravelPathPair> {
        match category {
            TravelCategory::Interborders => &mut self.interborders,
            TravelCategory::Interzones => &mut self.interzones,
            TravelCategory::Intrazones => &mut self.intrazones,
            TravelCategory::Launchpads => &mut self.launchpads,
        }
    }

    pub fn pair_count(&self) -> usize {
        TravelCategory::ALL
            .iter()
            .map(|c| self.category(*c).len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPair {
    pub category: TravelCategory,
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TravelReport {
    pub rendered_pairs: usize,
    pub skipped: Vec<SkippedPair>,
}

#[derive(Debug)]
pub struct TravelLayer {
    pub group: LayerGroup,
    pub report: TravelReport,
}

struct ResolvedEnd {
    position: LatLng,
    title: String,
    icon: Icon,
    highlighted: Icon,
}

fn resolve_end(end: &TravelEndpoint, icons: &IconSet, projection: &Projection) -> Result<ResolvedEnd, String> {
    let coord = end
        .coord
        .ok_or_else(|| format!("endpoint '{}' has no coord", end.title))?;
    let icon_name = end
        .icon
        .as_deref()
        .ok_or_else(|| format!("endpoint '{}' has no icon", end.title))?;
    let icon = icons
        .get(icon_name)
        .ok_or_else(|| format!("unknown icon '{}'", icon_name))?
        .clone();
    let highlighted = match icons.highlighted(icon_name) {
        Some(h) => h.clone(),
        None => {
            tracing::warn!("No highlighted variant for icon {}, hover keeps base icon", icon_name);
            icon.clone()
        }
    };
    Ok(ResolvedEnd {
        position: projection.to_lat_lng(coord),
        title: end.title.to_string(),
        icon,
        highlighted,
    })
}

fn endpoint_marker(end: &ResolvedEnd, other_end: LatLng) -> Marker {
    Marker::new(
        end.position,
        MarkerOptions::titled(end.title.to_string(), end.icon.clone()).with_context_menu(vec![
            ContextMenuItem {
                index: 0,
                text: end.title.to_string(),
                action: None,
            },
            ContextMenuItem {
                index: 1,
                text: PAN_TO_OTHER_END.to_string(),
                action: Some(MapAction::PanTo(other_end)),
            },
        ]),
    )
}

// Hovering `source` bounces `other` with `source`'s highlighted icon; leaving
// puts back `other`'s own icon.
fn link_hover(group: &mut LayerGroup, source: MarkerId, other: MarkerId, highlighted: &Icon, original: &Icon) {
    let highlighted = highlighted.clone();
    group.on(source, MarkerEvent::PointerEnter, move |markers| {
        if let Some(m) = markers.get_mut(other.index()) {
            m.set_icon(highlighted.clone());
            m.bounce();
        }
    });
    let original = original.clone();
    group.on(source, MarkerEvent::PointerLeave, move |markers| {
        if let Some(m) = markers.get_mut(other.index()) {
            m.stop_bouncing();
            m.set_icon(original.clone());
        }
    });
}

/// Builds the shared travel layer: two cross-linked markers per valid pair.
pub fn render_travel_markers(paths: &TravelPaths, icons: &IconSet, projection: &Projection) -> TravelLayer {
    tracing::info!("Adding travel layer from {} pairs", paths.pair_count());
    let mut group = LayerGroup::new(TRAVEL_LAYER);
    let mut report = TravelReport::default();

    for category in TravelCategory::ALL {
        for (index, pair) in paths.category(category).iter().enumerate() {
            let resolved = resolve_end(&pair.end_a, icons, projection)
                .and_then(|a| resolve_end(&pair.end_b, icons, projection).map(|b| (a, b)));
            let (a, b) = match resolved {
                Ok(ends) => ends,
                Err(reason) => {
                    tracing::warn!("Skipping {} pair {}: {}", category, index, reason);
                    report.skipped.push(SkippedPair {
                        category,
                        index,
                        reason,
                    });
                    continue;
                }
            };

            let id_a = group.add_marker(endpoint_marker(&a, b.position));
            let id_b = group.add_marker(endpoint_marker(&b, a.position));
            link_hover(&mut group, id_a, id_b, &a.highlighted, &b.icon);
            link_hover(&mut group, id_b, id_a, &b.highlighted, &a.icon);
            report.rendered_pairs += 1;
        }
    }

    tracing::debug!(
        "Travel layer has {} markers, skipped {} pairs",
        group.len(),
        report.skipped.len()
    );
    TravelLayer { group, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Viewport;

    fn icons() -> IconSet {
        IconSet::new()
            .with_pair("asura_gate", "/img")
            .with_pair("launchpad", "/img")
            .with_pair("launchpad_target", "/img")
    }

    fn gate_pair() -> TravelPathPair {
        TravelPathPair {
            end_a: TravelEndpoint::new([1280.0, 2560.0], "Asura Gate to Lion's Arch", "asura_gate"),
            end_b: TravelEndpoint::new([6400.0, 640.0], "Asura Gate to Rata Sum", "asura_gate"),
        }
    }

    #[test]
    fn renders_two_markers_per_pair_in_one_group() {
        let mut paths = TravelPaths::default();
        paths.interzones.push(gate_pair());
        paths.launchpads.push(TravelPathPair {
            end_a: TravelEndpoint::new([10.0, 10.0], "Launch Pad", "launchpad"),
            end_b: TravelEndpoint::new([20.0, 20.0], "Launch Pad", "launchpad_target"),
        });

        let layer = render_travel_markers(&paths, &icons(), &Projection::default());
        assert_eq!(layer.group.name(), TRAVEL_LAYER);
        assert_eq!(layer.group.len(), 4);
        assert_eq!(layer.report.rendered_pairs, 2);
        assert!(layer.report.skipped.is_empty());
    }

    #[test]
    fn context_menu_pans_to_the_other_end() {
        let mut paths = TravelPaths::default();
        paths.interzones.push(gate_pair());
        let projection = Projection::default();
        let layer = render_travel_markers(&paths, &icons(), &projection);

        let a = &layer.group.markers()[0];
        assert_eq!(a.options.context_menu[0].text, "Asura Gate to Lion's Arch");
        assert_eq!(a.options.context_menu[1].text, "Pan to Other End");

        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0));
        viewport.apply(a.context_action(1).unwrap());
        assert_eq!(viewport.center, projection.to_lat_lng([6400.0, 640.0]));
        assert!(a.context_action(0).is_none());
    }

    #[test]
    fn hover_highlights_and_restores_partner() {
        let mut paths = TravelPaths::default();
        paths.launchpads.push(TravelPathPair {
            end_a: TravelEndpoint::new([10.0, 10.0], "Launch Pad", "launchpad"),
            end_b: TravelEndpoint::new([20.0, 20.0], "Launch Pad", "launchpad_target"),
        });
        let icons = icons();
        let mut layer = render_travel_markers(&paths, &icons, &Projection::default());
        let group = &mut layer.group;
        let ids: Vec<MarkerId> = group.ids().collect();
        let (a, b) = (ids[0], ids[1]);

        group.fire(a, MarkerEvent::PointerEnter);
        let partner = group.marker(b).unwrap();
        assert_eq!(partner.icon(), icons.highlighted("launchpad").unwrap());
        assert!(partner.is_bouncing());
        assert!(!group.marker(a).unwrap().is_bouncing());

        group.fire(a, MarkerEvent::PointerLeave);
        let partner = group.marker(b).unwrap();
        assert_eq!(partner.icon(), icons.get("launchpad_target").unwrap());
        assert!(!partner.is_bouncing());

        group.fire(b, MarkerEvent::PointerEnter);
        assert_eq!(
            group.marker(a).unwrap().icon(),
            icons.highlighted("launchpad_target").unwrap()
        );
        group.fire(b, MarkerEvent::PointerLeave);
        assert_eq!(group.marker(a).unwrap().icon(), icons.get("launchpad").unwrap());
    }

    #[test]
    fn repeated_hovers_leave_launchpad_target_intact() {
        let mut paths = TravelPaths::default();
        paths.launchpads.push(TravelPathPair {
            end_a: TravelEndpoint::new([10.0, 10.0], "Launch Pad", "launchpad"),
            end_b: TravelEndpoint::new([20.0, 20.0], "Launch Pad", "launchpad_target"),
        });
        let icons = icons();
        let mut layer = render_travel_markers(&paths, &icons, &Projection::default());
        let ids: Vec<MarkerId> = layer.group.ids().collect();

        for _ in 0..3 {
            layer.group.fire(ids[0], MarkerEvent::PointerEnter);
            layer.group.fire(ids[0], MarkerEvent::PointerLeave);
        }
        let target = layer.group.marker(ids[1]).unwrap();
        assert_eq!(target.icon(), icons.get("launchpad_target").unwrap());
        assert_eq!(target.options.title, "Launch Pad");
    }

    #[test]
    fn malformed_pairs_are_skipped() {
        let mut paths = TravelPaths::default();
        let mut no_coord = gate_pair();
        no_coord.end_b.coord = None;
        let mut bad_icon = gate_pair();
        bad_icon.end_a.icon = Some("teleporter".to_string());
        paths.interborders.push(no_coord);
        paths.intrazones.push(bad_icon);
        paths.interzones.push(gate_pair());

        let layer = render_travel_markers(&paths, &icons(), &Projection::default());
        assert_eq!(layer.group.len(), 2);
        assert_eq!(layer.report.skipped.len(), 2);
        assert_eq!(layer.report.skipped[0].category, TravelCategory::Interborders);
        assert_eq!(layer.report.skipped[1].category, TravelCategory::Intrazones);
    }

    #[test]
    fn parses_dataset_json() {
        let json = r#"{
            "interborders": [
                {"end_a": {"coord": [1, 2], "title": "Zone Portal", "icon": "interborder"},
                 "end_b": {"coord": [3, 4], "title": "Zone Portal", "icon": "interborder"}}
            ],
            "launchpads": []
        }"#;
        let paths: TravelPaths = serde_json::from_str(json).unwrap();
        assert_eq!(paths.interborders.len(), 1);
        assert!(paths.interzones.is_empty());
        assert_eq!(paths.interborders[0].end_b.coord, Some([3.0, 4.0]));
    }
}
