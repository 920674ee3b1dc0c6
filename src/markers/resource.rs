use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::map::{Coord, Icon, IconSet, LayerGroup, Marker, MarkerOptions, Projection};

#[derive(strum_macros::Display, Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ResourceType {
    Metal,
    Plant,
    Wood,
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Metal" => Ok(ResourceType::Metal),
            "Plant" => Ok(ResourceType::Plant),
            "Wood" => Ok(ResourceType::Wood),
            other => Err(format!("unknown resource type {}", other)),
        }
    }
}

#[derive(strum_macros::Display, Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ResourceLayerKind {
    Metal,
    RichMetal,
    Plant,
    RichPlant,
    Wood,
    RichWood,
}

impl ResourceLayerKind {
    pub const ALL: [ResourceLayerKind; 6] = [
        ResourceLayerKind::Metal,
        ResourceLayerKind::RichMetal,
        ResourceLayerKind::Plant,
        ResourceLayerKind::RichPlant,
        ResourceLayerKind::Wood,
        ResourceLayerKind::RichWood,
    ];

    pub fn regular(kind: ResourceType) -> Self {
        match kind {
            ResourceType::Metal => ResourceLayerKind::Metal,
            ResourceType::Plant => ResourceLayerKind::Plant,
            ResourceType::Wood => ResourceLayerKind::Wood,
        }
    }

    pub fn rich(kind: ResourceType) -> Self {
        match kind {
            ResourceType::Metal => ResourceLayerKind::RichMetal,
            ResourceType::Plant => ResourceLayerKind::RichPlant,
            ResourceType::Wood => ResourceLayerKind::RichWood,
        }
    }
}

#[derive(strum_macros::Display, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Rarity {
    Rich,
    Permanent,
    Hotspot,
    Regular,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Rich, Rarity::Permanent, Rarity::Hotspot, Rarity::Regular];

    pub fn title_prefix(&self) -> &'static str {
        match self {
            Rarity::Rich => "Rich ",
            Rarity::Permanent => "Permanent ",
            Rarity::Hotspot => "probable ",
            Rarity::Regular => "possible ",
        }
    }

    /// Permanent nodes share the rich layer with Rich nodes.
    pub fn layer_for(&self, kind: ResourceType) -> ResourceLayerKind {
        match self {
            Rarity::Rich | Rarity::Permanent => ResourceLayerKind::rich(kind),
            Rarity::Hotspot | Rarity::Regular => ResourceLayerKind::regular(kind),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ResourceNode {
    pub c: Option<Coord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    pub name_en: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub item: String,
    #[serde(rename = "Rich", default)]
    pub rich: Vec<ResourceNode>,
    #[serde(rename = "Permanent", default)]
    pub permanent: Vec<ResourceNode>,
    #[serde(rename = "Hotspot", default)]
    pub hotspot: Vec<ResourceNode>,
    #[serde(rename = "Regular", default)]
    pub regular: Vec<ResourceNode>,
}

impl ResourceEntry {
    pub fn nodes(&self, rarity: Rarity) -> &[ResourceNode] {
        match rarity {
            Rarity::Rich => &self.rich,
            Rarity::Permanent => &self.permanent,
            Rarity::Hotspot => &self.hotspot,
            Rarity::Regular => &self.regular,
        }
    }

    /// Tooltip title without the rarity prefix. Only wood gets its type
    /// spelled out ("Green Wood", but not "Mithril Metal").
    pub fn base_title(&self) -> String {
        if self.kind == ResourceType::Wood.to_string() {
            format!("{} {} node ({})", self.name_en, self.kind, self.item)
        } else {
            format!("{} node ({})", self.name_en, self.item)
        }
    }
}

pub type ResourceData = BTreeMap<String, ResourceEntry>;

#[derive(Debug)]
pub struct ResourceLayers {
    groups: HashMap<ResourceLayerKind, LayerGroup>,
    pub skipped_entries: Vec<String>,
}

impl ResourceLayers {
    fn empty() -> Self {
        Self {
            groups: ResourceLayerKind::ALL
                .iter()
                .map(|kind| (*kind, LayerGroup::hidden(kind.to_string())))
                .collect(),
            skipped_entries: Vec::new(),
        }
    }

    pub fn group(&self, kind: ResourceLayerKind) -> &LayerGroup {
        &self.groups[&kind]
    }

    pub fn set_visible(&mut self, kind: ResourceLayerKind, visible: bool) {
        if let Some(group) = self.groups.get_mut(&kind) {
            group.set_visible(visible);
        }
    }

    pub fn total_markers(&self) -> usize {
        self.groups.values().map(LayerGroup::len).sum()
    }

    fn add_nodes(&mut self, kind: ResourceLayerKind, nodes: &[ResourceNode], title: &str, icon: &Icon, projection: &Projection) {
        let Some(group) = self.groups.get_mut(&kind) else {
            return;
        };
        for node in nodes {
            if let Some(coord) = node.c {
                group.add_marker(Marker::new(
                    projection.to_lat_lng(coord),
                    MarkerOptions::titled(title, icon.clone()),
                ));
            }
        }
    }
}

/// Sorts every node of every resource into its (initially hidden) layer.
pub fn render_resource_markers(data: &ResourceData, icons: &IconSet, projection: &Projection) -> ResourceLayers {
    tracing::info!("Adding resource layers from {} resources", data.len());
    let mut layers = ResourceLayers::empty();

    for (key, resource) in data {
        let kind: ResourceType = match resource.kind.parse() {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!("Skipping resource {}: unknown type {}", key, resource.kind);
                layers.skipped_entries.push(key.to_string());
                continue;
            }
        };
        let Some(icon) = icons.get(&resource.kind) else {
            tracing::warn!("Skipping resource {}: no icon for {}", key, resource.kind);
            layers.skipped_entries.push(key.to_string());
            continue;
        };

        let title = resource.base_title();
        for rarity in Rarity::ALL {
            let nodes = resource.nodes(rarity);
            if nodes.is_empty() {
                continue;
            }
            let prefixed = format!("{}{}", rarity.title_prefix(), title);
            layers.add_nodes(rarity.layer_for(kind), nodes, &prefixed, icon, projection);
        }
    }

    tracing::debug!("Resource layers hold {} markers", layers.total_markers());
    layers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: &str, item: &str) -> ResourceEntry {
        ResourceEntry {
            name_en: name.to_string(),
            kind: kind.to_string(),
            item: item.to_string(),
            rich: vec![],
            permanent: vec![],
            hotspot: vec![],
            regular: vec![],
        }
    }

    fn node(x: f64, y: f64) -> ResourceNode {
        ResourceNode { c: Some([x, y]) }
    }

    #[test]
    fn rich_mithril_lands_in_rich_metal() {
        let json = r#"{"mithril": {"name_en": "Mithril", "type": "Metal", "item": "Mithril Ore",
                       "Rich": [{"c": [100, 200]}]}}"#;
        let data: ResourceData = serde_json::from_str(json).unwrap();
        let layers = render_resource_markers(&data, &IconSet::standard("/img"), &Projection::default());

        let rich = layers.group(ResourceLayerKind::RichMetal);
        assert_eq!(rich.len(), 1);
        assert_eq!(rich.markers()[0].title(), "Rich Mithril node (Mithril Ore)");
        assert_eq!(layers.total_markers(), 1);
    }

    #[test]
    fn only_wood_titles_spell_out_the_type() {
        assert_eq!(
            entry("Green", "Wood", "Green Wood Log").base_title(),
            "Green Wood node (Green Wood Log)"
        );
        let metal = entry("Iron", "Metal", "Iron Ore").base_title();
        assert_eq!(metal, "Iron node (Iron Ore)");
        assert!(!metal.contains("Wood"));
        assert!(!entry("Omnomberry", "Plant", "Omnomberry")
            .base_title()
            .contains(" Wood node ("));
    }

    #[test]
    fn tiers_map_to_layers_with_prefixes() {
        let mut wood = entry("Ancient", "Wood", "Ancient Wood Log");
        wood.permanent = vec![node(1.0, 1.0)];
        wood.hotspot = vec![node(2.0, 2.0)];
        wood.regular = vec![node(3.0, 3.0), ResourceNode { c: None }];
        let data = ResourceData::from([("ancient".to_string(), wood)]);

        let layers = render_resource_markers(&data, &IconSet::standard("/img"), &Projection::default());
        let rich = layers.group(ResourceLayerKind::RichWood);
        assert_eq!(rich.len(), 1);
        assert_eq!(rich.markers()[0].title(), "Permanent Ancient Wood node (Ancient Wood Log)");

        let titles: Vec<&str> = layers
            .group(ResourceLayerKind::Wood)
            .markers()
            .iter()
            .map(|m| m.title())
            .collect();
        assert_eq!(
            titles,
            vec![
                "probable Ancient Wood node (Ancient Wood Log)",
                "possible Ancient Wood node (Ancient Wood Log)",
            ]
        );
    }

    #[test]
    fn groups_start_hidden_and_unknown_types_are_skipped() {
        let mut gem = entry("Ruby", "Gem", "Ruby");
        gem.regular = vec![node(1.0, 1.0)];
        let data = ResourceData::from([("ruby".to_string(), gem)]);
        let mut layers = render_resource_markers(&data, &IconSet::standard("/img"), &Projection::default());

        assert_eq!(layers.skipped_entries, vec!["ruby".to_string()]);
        assert_eq!(layers.total_markers(), 0);
        for kind in ResourceLayerKind::ALL {
            assert!(layers.group(kind).is_hidden());
        }
        layers.set_visible(ResourceLayerKind::Plant, true);
        assert!(!layers.group(ResourceLayerKind::Plant).is_hidden());
    }
}
