use serde::{Deserialize, Serialize};

use crate::{events::InteractionEvent, geometry_utils::ScreenPoint};

/// Opaque handle to a visual element, as understood by the scene
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ElementRef(pub usize);

/// What the engine needs from the render surface: hit-testing, and a channel to
/// publish interaction events on. All coordinates are viewport ("client") space.
pub trait SceneAdapter {
    fn element_at(&self, client_x: f32, client_y: f32) -> Option<ElementRef>;

    fn is_interactable(&self, element: ElementRef) -> bool;

    fn publish(&mut self, event: InteractionEvent);

    fn interactable_at(&self, point: &ScreenPoint) -> Option<ElementRef> {
        self.element_at(point.client_x, point.client_y)
            .filter(|e| self.is_interactable(*e))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_interactable")]
    pub interactable: bool,
}

fn default_interactable() -> bool {
    true
}

impl SceneElement {
    pub fn new(id: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        SceneElement {
            id,
            x,
            y,
            width,
            height,
            interactable: true,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// A flat scene of axis-aligned rectangles; later elements are drawn on top.
/// Published events are buffered until drained.
#[derive(Debug, Default)]
pub struct RectScene {
    elements: Vec<SceneElement>,
    published: Vec<InteractionEvent>,
}

impl RectScene {
    pub fn new(elements: &[SceneElement]) -> Self {
        RectScene {
            elements: Vec::from(elements),
            published: Vec::new(),
        }
    }

    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    pub fn events(&self) -> &[InteractionEvent] {
        &self.published
    }

    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.published)
    }
}

impl SceneAdapter for RectScene {
    fn element_at(&self, client_x: f32, client_y: f32) -> Option<ElementRef> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.contains(client_x, client_y))
            .map(|e| ElementRef(e.id))
    }

    fn is_interactable(&self, element: ElementRef) -> bool {
        self.elements
            .iter()
            .any(|e| e.id == element.0 && e.interactable)
    }

    fn publish(&mut self, event: InteractionEvent) {
        self.published.push(event);
    }
}
