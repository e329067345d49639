use indexmap::IndexMap;
use log::debug;

use crate::{
    events::{InteractionEvent, InteractionKind},
    geometry_utils::ScreenPoint,
    hands::Handedness,
    scene::{ElementRef, SceneAdapter},
};

#[derive(Debug, Clone, Copy, Default)]
enum DragState {
    #[default]
    Idle,
    Active {
        element: ElementRef,
        start: ScreenPoint,
        last: ScreenPoint,
    },
}

/// Direct manipulation: the element under the fingertip when the drag gesture
/// begins stays bound to the hand until the gesture ends
#[derive(Default)]
pub struct DragController {
    hands: IndexMap<Handedness, DragState>,
}

impl DragController {
    pub fn new() -> Self {
        DragController::default()
    }

    /// Called every frame the hand holds the drag gesture
    pub fn update<S: SceneAdapter + ?Sized>(
        &mut self,
        hand: Handedness,
        point: ScreenPoint,
        scene: &S,
        timestamp_ms: u64,
    ) -> Option<InteractionEvent> {
        let state = self.hands.entry(hand).or_default();
        match state {
            DragState::Idle => {
                let element = scene.interactable_at(&point)?;
                debug!("{:?} drag start on {:?}", hand, element);
                *state = DragState::Active {
                    element,
                    start: point,
                    last: point,
                };
                Some(InteractionEvent::pointer(
                    InteractionKind::PointerDown,
                    timestamp_ms,
                    hand,
                    point,
                    Some(element),
                ))
            }
            DragState::Active { element, last, .. } => {
                // No hit-test here; the drag never slips to another element
                *last = point;
                Some(InteractionEvent::pointer(
                    InteractionKind::PointerMove,
                    timestamp_ms,
                    hand,
                    point,
                    Some(*element),
                ))
            }
        }
    }

    /// The drag gesture ended or the hand was lost
    pub fn release(&mut self, hand: Handedness, timestamp_ms: u64) -> Option<InteractionEvent> {
        let state = self.hands.get_mut(&hand)?;
        match std::mem::take(state) {
            DragState::Idle => None,
            DragState::Active {
                element,
                start,
                last,
            } => {
                debug!(
                    "{:?} drag end on {:?}, moved ({}, {})",
                    hand,
                    element,
                    last.client_x - start.client_x,
                    last.client_y - start.client_y
                );
                Some(InteractionEvent::pointer(
                    InteractionKind::PointerUp,
                    timestamp_ms,
                    hand,
                    last,
                    Some(element),
                ))
            }
        }
    }

    pub fn dragging(&self, hand: Handedness) -> Option<ElementRef> {
        match self.hands.get(&hand) {
            Some(DragState::Active { element, .. }) => Some(*element),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry_utils::SurfaceGeometry,
        scene::{RectScene, SceneElement},
    };

    fn at(x: f32, y: f32) -> ScreenPoint {
        ScreenPoint::from_client(x, y, &SurfaceGeometry::default())
    }

    fn scene() -> RectScene {
        RectScene::new(&[
            SceneElement::new(1, 0., 0., 50., 50.),
            SceneElement::new(2, 100., 0., 50., 50.),
        ])
    }

    #[test]
    fn test_drag_does_not_slip() {
        let scene = scene();
        let mut drag = DragController::new();
        let hand = Handedness::Right;

        let down = drag.update(hand, at(10., 10.), &scene, 0).unwrap();
        assert_eq!(down.kind, InteractionKind::PointerDown);
        assert_eq!(down.target, Some(ElementRef(1)));

        // Passing over element 2 keeps dragging element 1
        for (i, x) in [60., 110., 300.].iter().enumerate() {
            let moved = drag.update(hand, at(*x, 10.), &scene, 16 * (i as u64 + 1)).unwrap();
            assert_eq!(moved.kind, InteractionKind::PointerMove);
            assert_eq!(moved.target, Some(ElementRef(1)));
            assert_eq!(moved.point, Some(at(*x, 10.)));
        }

        let up = drag.release(hand, 100).unwrap();
        assert_eq!(up.kind, InteractionKind::PointerUp);
        assert_eq!(up.target, Some(ElementRef(1)));
        assert_eq!(up.point, Some(at(300., 10.)));

        assert!(drag.release(hand, 116).is_none());
        assert_eq!(drag.dragging(hand), None);
    }

    #[test]
    fn test_idle_over_empty_space() {
        let scene = scene();
        let mut drag = DragController::new();
        assert!(drag.update(Handedness::Left, at(70., 10.), &scene, 0).is_none());
        assert!(drag.release(Handedness::Left, 16).is_none());

        // Moving onto an element later still starts a drag
        let down = drag.update(Handedness::Left, at(10., 10.), &scene, 32).unwrap();
        assert_eq!(down.kind, InteractionKind::PointerDown);
    }

    #[test]
    fn test_two_hands_independent() {
        let scene = scene();
        let mut drag = DragController::new();
        drag.update(Handedness::Left, at(10., 10.), &scene, 0);
        drag.update(Handedness::Right, at(110., 10.), &scene, 0);
        assert_eq!(drag.dragging(Handedness::Left), Some(ElementRef(1)));
        assert_eq!(drag.dragging(Handedness::Right), Some(ElementRef(2)));

        let up = drag.release(Handedness::Left, 16).unwrap();
        assert_eq!(up.target, Some(ElementRef(1)));
        assert_eq!(drag.dragging(Handedness::Right), Some(ElementRef(2)));
    }
}
