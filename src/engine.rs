use anyhow::Result;
use indexmap::IndexMap;
use log::{debug, warn};

use crate::{
    engine_config::{EngineConfig, GestureBindings},
    events::InteractionEvent,
    geometry_utils::{to_screen_point, ScreenPoint, SurfaceGeometry},
    hands::{Handedness, HandObservation},
    scene::SceneAdapter,
    systems::{click::ClickGesture, view_transform::ViewTransform, Systems},
    Point2D,
};

/// Where a drag/pan-zoom gesture instance was sent when it began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrabRoute {
    Drag,
    ViewTransform,
}

#[derive(Debug, Clone)]
struct LatchedRoute {
    label: String,
    route: GrabRoute,
}

/// Runs every gesture system once per frame, in a fixed order (hover, click,
/// drag, pan/zoom), and publishes the resulting events to the scene.
pub struct GestureEngine {
    bindings: GestureBindings,
    min_confidence: f32,
    surface: SurfaceGeometry,
    systems: Systems,
    grab_routes: IndexMap<Handedness, LatchedRoute>,
}

impl GestureEngine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(GestureEngine {
            bindings: config.gestures.clone(),
            min_confidence: config.min_confidence,
            surface: config.surface,
            systems: Systems::new(config),
            grab_routes: IndexMap::new(),
        })
    }

    pub fn view_transform(&self) -> ViewTransform {
        self.systems.view_transform.transform()
    }

    /// Takes effect from the next frame
    pub fn set_surface(&mut self, surface: SurfaceGeometry) {
        debug!("Surface resized to {:?}", surface);
        self.surface = surface;
    }

    pub fn systems(&self) -> &Systems {
        &self.systems
    }

    /// Process one frame of recognizer output. Returns the number of events published.
    pub fn process_frame<S: SceneAdapter + ?Sized>(
        &mut self,
        hands: &[HandObservation],
        timestamp_ms: u64,
        scene: &mut S,
    ) -> usize {
        let present = self.accept_hands(hands);
        let mut events = Vec::new();

        self.update_hover(&present, &*scene, timestamp_ms, &mut events);
        self.update_clicks(&present, &*scene, timestamp_ms, &mut events);
        self.update_grabs(&present, &*scene, timestamp_ms, &mut events);

        publish_all(scene, events)
    }

    /// Drive every hand to its terminal state (closing hovers and drags) and stop
    /// any pan/zoom. The current view transform is kept.
    pub fn reset<S: SceneAdapter + ?Sized>(&mut self, timestamp_ms: u64, scene: &mut S) -> usize {
        let mut events = Vec::new();
        for hand in Handedness::ALL {
            events.extend(self.systems.hover_tracker.flush(hand, timestamp_ms));
            self.systems.click_disambiguator.reset(hand);
            events.extend(self.systems.drag_controller.release(hand, timestamp_ms));
        }
        self.grab_routes.clear();
        self.systems.view_transform.reset();
        publish_all(scene, events)
    }

    /// Drop hands the systems cannot use, and keep at most one per handedness
    fn accept_hands<'a>(
        &self,
        hands: &'a [HandObservation],
    ) -> IndexMap<Handedness, &'a HandObservation> {
        let mut present: IndexMap<Handedness, &HandObservation> = IndexMap::new();
        for hand in hands {
            if !hand.is_well_formed() {
                warn!(
                    "Ignoring {:?} hand with {} landmarks (or non-finite values)",
                    hand.handedness,
                    hand.landmarks.len()
                );
                continue;
            }
            if hand.confidence < self.min_confidence {
                continue;
            }
            let keep_existing = present
                .get(&hand.handedness)
                .is_some_and(|existing| existing.confidence >= hand.confidence);
            if keep_existing {
                debug!(
                    "Duplicate {:?} hand in frame; keeping the more confident one",
                    hand.handedness
                );
            } else {
                present.insert(hand.handedness, hand);
            }
        }
        present
    }

    fn pointer_point(&self, hand: &HandObservation) -> Option<ScreenPoint> {
        hand.pointer_tip()
            .map(|tip| to_screen_point(tip, &self.surface))
    }

    fn update_hover<S: SceneAdapter + ?Sized>(
        &mut self,
        present: &IndexMap<Handedness, &HandObservation>,
        scene: &S,
        timestamp_ms: u64,
        events: &mut Vec<InteractionEvent>,
    ) {
        for hand in Handedness::ALL {
            let observation = present.get(&hand);
            let pointer = observation
                .filter(|o| o.has_label(&self.bindings.pointer))
                .and_then(|o| self.pointer_point(o));
            let area = observation.filter(|o| o.has_label(&self.bindings.area));

            let hover = &mut self.systems.hover_tracker;
            if let Some(point) = pointer {
                events.extend(hover.update_pointer(hand, point, scene, timestamp_ms));
            } else if let Some(o) = area {
                let fingertips: Vec<ScreenPoint> = o
                    .fingertips()
                    .iter()
                    .map(|l| to_screen_point(l, &self.surface))
                    .collect();
                events.extend(hover.update_area(
                    hand,
                    &fingertips,
                    &self.surface,
                    scene,
                    timestamp_ms,
                ));
            } else {
                events.extend(hover.flush(hand, timestamp_ms));
            }
        }
    }

    fn update_clicks<S: SceneAdapter + ?Sized>(
        &mut self,
        present: &IndexMap<Handedness, &HandObservation>,
        scene: &S,
        timestamp_ms: u64,
        events: &mut Vec<InteractionEvent>,
    ) {
        for hand in Handedness::ALL {
            let observed = present
                .get(&hand)
                .and_then(|o| self.pointer_point(o).map(|p| (*o, p)));
            match observed {
                Some((o, point)) => {
                    let gesture = if o.has_label(&self.bindings.select) {
                        ClickGesture::Select
                    } else if o.has_label(&self.bindings.pointer) {
                        ClickGesture::Pointer
                    } else {
                        ClickGesture::Other
                    };
                    events.extend(self.systems.click_disambiguator.update(
                        hand,
                        gesture,
                        point,
                        scene,
                        timestamp_ms,
                    ));
                }
                None => self.systems.click_disambiguator.reset(hand),
            }
        }
    }

    fn update_grabs<S: SceneAdapter + ?Sized>(
        &mut self,
        present: &IndexMap<Handedness, &HandObservation>,
        scene: &S,
        timestamp_ms: u64,
        events: &mut Vec<InteractionEvent>,
    ) {
        let mut view_hands: Vec<(Handedness, Point2D)> = Vec::new();

        for hand in Handedness::ALL {
            let observed = present
                .get(&hand)
                .and_then(|o| self.pointer_point(o).map(|p| (*o, p)));
            let route = observed.and_then(|(o, point)| self.route_grab(o, &point, scene));

            match (route, observed) {
                (Some(GrabRoute::Drag), Some((_, point))) => {
                    events.extend(self.systems.drag_controller.update(
                        hand,
                        point,
                        scene,
                        timestamp_ms,
                    ));
                }
                (Some(GrabRoute::ViewTransform), Some((_, point))) => {
                    events.extend(self.systems.drag_controller.release(hand, timestamp_ms));
                    view_hands.push((hand, point.view_position(&self.surface)));
                }
                _ => {
                    if route.is_none() {
                        self.grab_routes.swap_remove(&hand);
                    }
                    events.extend(self.systems.drag_controller.release(hand, timestamp_ms));
                }
            }
        }

        events.extend(
            self.systems
                .view_transform
                .update(&view_hands, timestamp_ms),
        );
    }

    /// Latch drag vs. pan/zoom for the lifetime of a gesture instance, based on
    /// whether it began over an interactable element. Returns None when the hand
    /// is not making either gesture (or is making the drag gesture over nothing).
    fn route_grab<S: SceneAdapter + ?Sized>(
        &mut self,
        observation: &HandObservation,
        point: &ScreenPoint,
        scene: &S,
    ) -> Option<GrabRoute> {
        let hand = observation.handedness;
        let is_drag = observation.has_label(&self.bindings.drag);
        let is_pan_zoom = observation.has_label(&self.bindings.pan_zoom);
        if !is_drag && !is_pan_zoom {
            return None;
        }

        if let Some(latched) = self.grab_routes.get(&hand) {
            if latched.label == observation.gesture_label {
                return Some(latched.route);
            }
        }

        let route = if is_drag && scene.interactable_at(point).is_some() {
            GrabRoute::Drag
        } else if is_pan_zoom {
            GrabRoute::ViewTransform
        } else {
            return None;
        };
        debug!(
            "{:?} \"{}\" gesture routed to {:?}",
            hand, observation.gesture_label, route
        );
        self.grab_routes.insert(
            hand,
            LatchedRoute {
                label: observation.gesture_label.clone(),
                route,
            },
        );
        Some(route)
    }
}

fn publish_all<S: SceneAdapter + ?Sized>(scene: &mut S, events: Vec<InteractionEvent>) -> usize {
    let count = events.len();
    for event in events {
        scene.publish(event);
    }
    count
}
