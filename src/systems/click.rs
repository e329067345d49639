use indexmap::IndexMap;
use log::debug;

use crate::{
    events::{InteractionEvent, InteractionKind},
    geometry_utils::ScreenPoint,
    hands::Handedness,
    scene::{ElementRef, SceneAdapter},
};

/// How the current gesture label of a hand relates to clicking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickGesture {
    Select,
    Pointer,
    Other,
}

#[derive(Debug, Clone, Copy, Default)]
enum ClickState {
    #[default]
    Idle,
    PotentialClick {
        start_ms: u64,
        element: ElementRef,
        point: ScreenPoint,
    },
}

/// Select is armed by the select gesture over an element and confirmed by relaxing
/// back to the pointer gesture, over the same element, within the click window
pub struct ClickDisambiguator {
    window_ms: u64,
    hands: IndexMap<Handedness, ClickState>,
}

impl ClickDisambiguator {
    pub fn new(window_ms: u64) -> Self {
        ClickDisambiguator {
            window_ms,
            hands: IndexMap::new(),
        }
    }

    pub fn update<S: SceneAdapter + ?Sized>(
        &mut self,
        hand: Handedness,
        gesture: ClickGesture,
        point: ScreenPoint,
        scene: &S,
        timestamp_ms: u64,
    ) -> Option<InteractionEvent> {
        let state = self.hands.entry(hand).or_default();

        match (*state, gesture) {
            (ClickState::Idle, ClickGesture::Select) => {
                if let Some(element) = scene.interactable_at(&point) {
                    debug!("{:?} potential click on {:?}", hand, element);
                    *state = ClickState::PotentialClick {
                        start_ms: timestamp_ms,
                        element,
                        point,
                    };
                }
                None
            }
            (ClickState::Idle, _) => None,
            // Still pinching; the window is only judged on release, so a long
            // pinch cannot re-arm itself
            (ClickState::PotentialClick { .. }, ClickGesture::Select) => None,
            (
                ClickState::PotentialClick {
                    start_ms,
                    element,
                    point: start_point,
                },
                ClickGesture::Pointer,
            ) => {
                *state = ClickState::Idle;
                // A clock running backwards cannot confirm anything
                let elapsed = timestamp_ms.checked_sub(start_ms);
                let under = scene.element_at(point.client_x, point.client_y);
                if elapsed.is_some_and(|ms| ms <= self.window_ms) && under == Some(element) {
                    debug!("{:?} select on {:?} after {:?}ms", hand, element, elapsed);
                    Some(InteractionEvent::pointer(
                        InteractionKind::PointerSelect,
                        timestamp_ms,
                        hand,
                        start_point,
                        Some(element),
                    ))
                } else {
                    debug!(
                        "{:?} click on {:?} abandoned; {:?}ms, now over {:?}",
                        hand, element, elapsed, under
                    );
                    None
                }
            }
            (ClickState::PotentialClick { element, .. }, ClickGesture::Other) => {
                debug!("{:?} click on {:?} abandoned by gesture change", hand, element);
                *state = ClickState::Idle;
                None
            }
        }
    }

    pub fn reset(&mut self, hand: Handedness) {
        if let Some(state) = self.hands.get_mut(&hand) {
            *state = ClickState::Idle;
        }
    }

    pub fn is_pending(&self, hand: Handedness) -> bool {
        matches!(
            self.hands.get(&hand),
            Some(ClickState::PotentialClick { .. })
        )
    }
}
