use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Marker;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(usize);

impl MarkerId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerEvent {
    PointerEnter,
    PointerLeave,
}

/// Handlers receive every marker of the group so they can act on a partner.
pub type MarkerHandler = Box<dyn Fn(&mut [Marker]) + Send + Sync>;

/// A named set of markers that is shown or hidden as a unit.
pub struct LayerGroup {
    name: String,
    markers: Vec<Marker>,
    handlers: HashMap<(MarkerId, MarkerEvent), Vec<MarkerHandler>>,
    hidden: bool,
}

impl LayerGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
            handlers: HashMap::new(),
            hidden: false,
        }
    }

    pub fn hidden(name: impl Into<String>) -> Self {
        let mut group = LayerGroup::new(name);
        group.hidden = true;
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_marker(&mut self, marker: Marker) -> MarkerId {
        self.markers.push(marker);
        MarkerId(self.markers.len() - 1)
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = MarkerId> {
        (0..self.markers.len()).map(MarkerId)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.hidden = !visible;
    }

    pub fn on<F>(&mut self, id: MarkerId, event: MarkerEvent, handler: F)
    where
        F: Fn(&mut [Marker]) + Send + Sync + 'static,
    {
        self.handlers
            .entry((id, event))
            .or_default()
            .push(Box::new(handler));
    }

    /// Runs the handlers registered for `event` on `id`; returns how many ran.
    pub fn fire(&mut self, id: MarkerId, event: MarkerEvent) -> usize {
        match self.handlers.get(&(id, event)) {
            Some(handlers) => {
                for handler in handlers {
                    handler(&mut self.markers);
                }
                handlers.len()
            }
            None => 0,
        }
    }
}

impl std::fmt::Debug for LayerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerGroup")
            .field("name", &self.name)
            .field("markers", &self.markers.len())
            .field("handlers", &self.handlers.len())
            .field("hidden", &self.hidden)
            .finish()
    }
}
