use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::{
    events::{InteractionEvent, InteractionKind},
    geometry_utils::{grid_points_in_circle, min_enclosing_circle, ScreenPoint, SurfaceGeometry},
    hands::Handedness,
    scene::{ElementRef, SceneAdapter},
    Point2D,
};

#[derive(Debug, Clone, Default)]
enum HoverState {
    #[default]
    Idle,
    /// Single fingertip cursor. `hovered` is only ever set for interactable
    /// elements, i.e. those which were sent a pointerover.
    Pointer {
        last_hit: Option<ElementRef>,
        hovered: Option<ElementRef>,
        point: ScreenPoint,
    },
    /// Every interactable element under the circle spanned by the fingertips
    Area {
        hovered: IndexSet<ElementRef>,
        center: ScreenPoint,
    },
}

pub struct HoverTracker {
    grid_size: usize,
    hands: IndexMap<Handedness, HoverState>,
}

impl HoverTracker {
    pub fn new(grid_size: usize) -> Self {
        HoverTracker {
            grid_size,
            hands: IndexMap::new(),
        }
    }

    /// Pointer hover: hit-test at the fingertip, and emit out/over when the
    /// element under it changes
    pub fn update_pointer<S: SceneAdapter + ?Sized>(
        &mut self,
        hand: Handedness,
        point: ScreenPoint,
        scene: &S,
        timestamp_ms: u64,
    ) -> Vec<InteractionEvent> {
        let mut events = Vec::new();

        let (last_hit, mut hovered) = match self.take_state(hand) {
            HoverState::Pointer {
                last_hit, hovered, ..
            } => (last_hit, hovered),
            other => {
                events.extend(close(hand, other, timestamp_ms));
                (None, None)
            }
        };

        let hit = scene.element_at(point.client_x, point.client_y);
        if hit != last_hit {
            if let Some(previous) = hovered.take() {
                debug!("{:?} pointer left {:?}", hand, previous);
                events.push(InteractionEvent::pointer(
                    InteractionKind::PointerOut,
                    timestamp_ms,
                    hand,
                    point,
                    Some(previous),
                ));
            }
            if let Some(element) = hit.filter(|e| scene.is_interactable(*e)) {
                debug!("{:?} pointer entered {:?}", hand, element);
                events.push(InteractionEvent::pointer(
                    InteractionKind::PointerOver,
                    timestamp_ms,
                    hand,
                    point,
                    Some(element),
                ));
                hovered = Some(element);
            }
        }

        self.hands.insert(
            hand,
            HoverState::Pointer {
                last_hit: hit,
                hovered,
                point,
            },
        );
        events
    }

    /// Area hover: sample a grid inside the smallest circle around the fingertips,
    /// and diff the resulting set of elements against the previous frame
    pub fn update_area<S: SceneAdapter + ?Sized>(
        &mut self,
        hand: Handedness,
        fingertips: &[ScreenPoint],
        surface: &SurfaceGeometry,
        scene: &S,
        timestamp_ms: u64,
    ) -> Vec<InteractionEvent> {
        let mut events = Vec::new();

        let (previous, previous_center) = match self.take_state(hand) {
            HoverState::Area { hovered, center } => (hovered, Some(center)),
            other => {
                events.extend(close(hand, other, timestamp_ms));
                (IndexSet::new(), None)
            }
        };

        let points: Vec<Point2D> = fingertips.iter().map(|p| p.client_position()).collect();
        let circle = match min_enclosing_circle(&points) {
            Some(c) if c.radius > 0. => c,
            _ => {
                // Nothing sensible to hover with; drain whatever was hovered
                if let Some(center) = previous_center {
                    events.extend(close(
                        hand,
                        HoverState::Area {
                            hovered: previous,
                            center,
                        },
                        timestamp_ms,
                    ));
                }
                return events;
            }
        };

        let center = ScreenPoint::from_client(circle.center.0, circle.center.1, surface);
        let current: IndexSet<ElementRef> = grid_points_in_circle(&circle, self.grid_size)
            .iter()
            .filter_map(|(x, y)| scene.element_at(*x, *y))
            .filter(|e| scene.is_interactable(*e))
            .collect();

        for exited in previous.difference(&current) {
            events.push(InteractionEvent::pointer(
                InteractionKind::PointerOut,
                timestamp_ms,
                hand,
                center,
                Some(*exited),
            ));
        }
        for entered in current.difference(&previous) {
            events.push(InteractionEvent::pointer(
                InteractionKind::PointerOver,
                timestamp_ms,
                hand,
                center,
                Some(*entered),
            ));
        }
        if !events.is_empty() {
            debug!("{:?} area hover now over {:?}", hand, current);
        }

        self.hands.insert(
            hand,
            HoverState::Area {
                hovered: current,
                center,
            },
        );
        events
    }

    /// The hand stopped hovering (gesture changed or hand lost): close every
    /// outstanding pointerover
    pub fn flush(&mut self, hand: Handedness, timestamp_ms: u64) -> Vec<InteractionEvent> {
        let state = self.take_state(hand);
        close(hand, state, timestamp_ms)
    }

    /// Elements currently sent a pointerover (and no pointerout yet) by this hand
    pub fn hovered(&self, hand: Handedness) -> Vec<ElementRef> {
        match self.hands.get(&hand) {
            Some(HoverState::Pointer {
                hovered: Some(e), ..
            }) => vec![*e],
            Some(HoverState::Area { hovered, .. }) => hovered.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    fn take_state(&mut self, hand: Handedness) -> HoverState {
        std::mem::take(self.hands.entry(hand).or_default())
    }
}

fn close(hand: Handedness, state: HoverState, timestamp_ms: u64) -> Vec<InteractionEvent> {
    let out = |point: ScreenPoint, element: ElementRef| {
        InteractionEvent::pointer(
            InteractionKind::PointerOut,
            timestamp_ms,
            hand,
            point,
            Some(element),
        )
    };
    match state {
        HoverState::Idle => Vec::new(),
        HoverState::Pointer { hovered, point, .. } => {
            hovered.map(|e| out(point, e)).into_iter().collect()
        }
        HoverState::Area { hovered, center } => {
            if !hovered.is_empty() {
                debug!("{:?} area hover cleared", hand);
            }
            hovered.into_iter().map(|e| out(center, e)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RectScene, SceneElement};

    fn at(x: f32, y: f32) -> ScreenPoint {
        ScreenPoint::from_client(x, y, &SurfaceGeometry::default())
    }

    fn scene() -> RectScene {
        let mut label = SceneElement::new(3, 200., 0., 50., 50.);
        label.interactable = false;
        RectScene::new(&[
            SceneElement::new(1, 0., 0., 50., 50.),
            SceneElement::new(2, 100., 0., 50., 50.),
            label,
        ])
    }

    fn kinds(events: &[InteractionEvent]) -> Vec<(InteractionKind, Option<ElementRef>)> {
        events.iter().map(|e| (e.kind, e.target)).collect()
    }

    #[test]
    fn test_pointer_enter_and_leave() {
        let scene = scene();
        let mut hover = HoverTracker::new(8);
        let hand = Handedness::Right;

        let events = hover.update_pointer(hand, at(10., 10.), &scene, 0);
        assert_eq!(
            kinds(&events),
            vec![(InteractionKind::PointerOver, Some(ElementRef(1)))]
        );

        // Same element: nothing new
        assert!(hover.update_pointer(hand, at(20., 20.), &scene, 16).is_empty());

        let events = hover.update_pointer(hand, at(110., 10.), &scene, 32);
        assert_eq!(
            kinds(&events),
            vec![
                (InteractionKind::PointerOut, Some(ElementRef(1))),
                (InteractionKind::PointerOver, Some(ElementRef(2)))
            ]
        );

        let events = hover.update_pointer(hand, at(80., 10.), &scene, 48);
        assert_eq!(
            kinds(&events),
            vec![(InteractionKind::PointerOut, Some(ElementRef(2)))]
        );
        assert!(hover.hovered(hand).is_empty());
    }

    #[test]
    fn test_pointer_ignores_non_interactable() {
        let scene = scene();
        let mut hover = HoverTracker::new(8);
        let hand = Handedness::Left;

        hover.update_pointer(hand, at(10., 10.), &scene, 0);
        let events = hover.update_pointer(hand, at(210., 10.), &scene, 16);
        assert_eq!(
            kinds(&events),
            vec![(InteractionKind::PointerOut, Some(ElementRef(1)))]
        );
        // Moving off the label emits nothing at all
        assert!(hover.update_pointer(hand, at(300., 10.), &scene, 32).is_empty());
    }

    #[test]
    fn test_flush_closes_pointer() {
        let scene = scene();
        let mut hover = HoverTracker::new(8);
        hover.update_pointer(Handedness::Left, at(10., 10.), &scene, 0);
        hover.update_pointer(Handedness::Right, at(110., 10.), &scene, 0);

        let events = hover.flush(Handedness::Left, 16);
        assert_eq!(
            kinds(&events),
            vec![(InteractionKind::PointerOut, Some(ElementRef(1)))]
        );
        assert!(hover.flush(Handedness::Left, 32).is_empty());
        assert_eq!(hover.hovered(Handedness::Right), vec![ElementRef(2)]);
    }

    #[test]
    fn test_area_set_difference() {
        let scene = scene();
        let mut hover = HoverTracker::new(8);
        let hand = Handedness::Right;
        let surface = SurfaceGeometry::default();

        // Circle spanning both element 1 and element 2
        let wide = [at(20., 20.), at(130., 20.), at(75., 40.)];
        let events = hover.update_area(hand, &wide, &surface, &scene, 0);
        let mut entered: Vec<ElementRef> = events.iter().filter_map(|e| e.target).collect();
        entered.sort();
        assert!(events.iter().all(|e| e.kind == InteractionKind::PointerOver));
        assert_eq!(entered, vec![ElementRef(1), ElementRef(2)]);

        // Shrink onto element 2 only
        let narrow = [at(110., 10.), at(130., 30.)];
        let events = hover.update_area(hand, &narrow, &surface, &scene, 16);
        assert_eq!(
            kinds(&events),
            vec![(InteractionKind::PointerOut, Some(ElementRef(1)))]
        );
        assert_eq!(hover.hovered(hand), vec![ElementRef(2)]);
    }

    #[test]
    fn test_area_degenerate_circle_drains() {
        let scene = scene();
        let mut hover = HoverTracker::new(8);
        let hand = Handedness::Right;
        let surface = SurfaceGeometry::default();

        hover.update_area(hand, &[at(110., 10.), at(130., 30.)], &surface, &scene, 0);
        assert_eq!(hover.hovered(hand), vec![ElementRef(2)]);

        let collapsed = [at(120., 20.), at(120., 20.)];
        let events = hover.update_area(hand, &collapsed, &surface, &scene, 16);
        assert_eq!(
            kinds(&events),
            vec![(InteractionKind::PointerOut, Some(ElementRef(2)))]
        );
        assert!(hover.hovered(hand).is_empty());
    }

    #[test]
    fn test_switching_mode_flushes() {
        let scene = scene();
        let mut hover = HoverTracker::new(8);
        let hand = Handedness::Left;
        let surface = SurfaceGeometry::default();

        hover.update_pointer(hand, at(10., 10.), &scene, 0);
        // Area far away from everything: the pointer hover must still be closed
        let far_away = [at(400., 400.), at(420., 420.)];
        let events = hover.update_area(hand, &far_away, &surface, &scene, 16);
        assert_eq!(
            kinds(&events),
            vec![(InteractionKind::PointerOut, Some(ElementRef(1)))]
        );

        hover.update_area(hand, &[at(110., 10.), at(130., 30.)], &surface, &scene, 32);
        let events = hover.update_pointer(hand, at(400., 400.), &scene, 48);
        assert_eq!(
            kinds(&events),
            vec![(InteractionKind::PointerOut, Some(ElementRef(2)))]
        );
    }
}
