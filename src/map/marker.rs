use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::LatLng;

const HIGHLIGHT_SUFFIX: &str = "_highlighted";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: String,
    pub url: String,
}

impl Icon {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct IconSet {
    icons: HashMap<String, Icon>,
}

impl IconSet {
    pub fn new() -> Self {
        IconSet::default()
    }

    pub fn insert(&mut self, icon: Icon) {
        self.icons.insert(icon.name.to_string(), icon);
    }

    pub fn get(&self, name: &str) -> Option<&Icon> {
        self.icons.get(name)
    }

    /// The highlighted variant of `name`, i.e. the icon named `<name>_highlighted`.
    pub fn highlighted(&self, name: &str) -> Option<&Icon> {
        self.icons.get(&format!("{}{}", name, HIGHLIGHT_SUFFIX))
    }

    pub fn with_pair(mut self, name: &str, base_url: &str) -> Self {
        self.insert(Icon::new(name, format!("{}/{}.png", base_url, name)));
        let highlighted = format!("{}{}", name, HIGHLIGHT_SUFFIX);
        self.insert(Icon::new(
            highlighted.to_string(),
            format!("{}/{}.png", base_url, highlighted),
        ));
        self
    }

    /// Icons the travel and resource layers expect to find.
    pub fn standard(base_url: &str) -> Self {
        [
            "interborder",
            "asura_gate",
            "skritt_tunnel",
            "launchpad",
            "launchpad_target",
            "Metal",
            "Plant",
            "Wood",
        ]
        .iter()
        .fold(IconSet::new(), |set, name| set.with_pair(name, base_url))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum MapAction {
    PanTo(LatLng),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContextMenuItem {
    pub index: u32,
    pub text: String,
    pub action: Option<MapAction>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub title: String,
    pub alt: String,
    pub rise_on_hover: bool,
    pub icon: Icon,
    pub context_menu: Vec<ContextMenuItem>,
}

impl MarkerOptions {
    /// Title and alt text share the same string, as the overlay always does.
    pub fn titled(title: impl Into<String>, icon: Icon) -> Self {
        let title = title.into();
        Self {
            alt: title.to_string(),
            title,
            rise_on_hover: true,
            icon,
            context_menu: Vec::new(),
        }
    }

    pub fn with_context_menu(mut self, items: Vec<ContextMenuItem>) -> Self {
        self.context_menu = items;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub options: MarkerOptions,
    icon: Icon,
    bouncing: bool,
}

impl Marker {
    pub fn new(position: LatLng, options: MarkerOptions) -> Self {
        Self {
            position,
            icon: options.icon.clone(),
            options,
            bouncing: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.options.title
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn set_icon(&mut self, icon: Icon) {
        self.icon = icon;
    }

    pub fn is_bouncing(&self) -> bool {
        self.bouncing
    }

    pub fn bounce(&mut self) {
        self.bouncing = true;
    }

    pub fn stop_bouncing(&mut self) {
        self.bouncing = false;
    }

    pub fn context_action(&self, index: u32) -> Option<&MapAction> {
        self.options
            .context_menu
            .iter()
            .find(|item| item.index == index)
            .and_then(|item| item.action.as_ref())
    }
}
