use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    events::{InteractionEvent, InteractionKind},
    geometry_utils::{distance_points, midpoint},
    hands::Handedness,
    Point2D,
};

/// Pan/zoom applied by the scene to its visualisation content:
/// `view = content * scale + (x, y)`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform {
            scale: 1.,
            x: 0.,
            y: 0.,
        }
    }
}

impl ViewTransform {
    pub fn to_content(&self, view: &Point2D) -> Point2D {
        ((view.0 - self.x) / self.scale, (view.1 - self.y) / self.scale)
    }

    pub fn to_view(&self, content: &Point2D) -> Point2D {
        (content.0 * self.scale + self.x, content.1 * self.scale + self.y)
    }
}

pub struct ViewTransformSettings {
    pub min_scale: f32,
    pub max_scale: f32,
    pub handoff_threshold: f32,
}

#[derive(Debug, Clone, Copy, Default)]
enum ViewGesture {
    #[default]
    Idle,
    Panning {
        hand: Handedness,
        reference: Point2D,
        /// Set when this pan took over from a zoom; holds the position of the
        /// remaining hand at that moment
        handoff_from: Option<Point2D>,
    },
    Zooming {
        last_distance: f32,
        fixed_point: Point2D,
    },
}

/// One shared state machine for both hands: one hand pans, two hands zoom around
/// the content point under their midpoint
pub struct ViewTransformCoordinator {
    settings: ViewTransformSettings,
    transform: ViewTransform,
    state: ViewGesture,
}

impl ViewTransformCoordinator {
    pub fn new(settings: ViewTransformSettings) -> Self {
        ViewTransformCoordinator {
            settings,
            transform: ViewTransform::default(),
            state: ViewGesture::Idle,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ViewGesture::Idle)
    }

    /// True while a single hand is panning right after a zoom and has not yet moved
    /// clear of where the other hand dropped out
    pub fn is_handing_off(&self) -> bool {
        matches!(
            self.state,
            ViewGesture::Panning {
                handoff_from: Some(_),
                ..
            }
        )
    }

    /// `hands` are the hands currently routed to pan/zoom, with their positions in
    /// view space (already mirrored, so a delta can be applied as-is)
    pub fn update(
        &mut self,
        hands: &[(Handedness, Point2D)],
        timestamp_ms: u64,
    ) -> Option<InteractionEvent> {
        match hands {
            [] => {
                self.reset();
                None
            }
            [(hand, position)] => self.pan(*hand, *position, timestamp_ms),
            [(_, a), (_, b), ..] => self.zoom(a, b, timestamp_ms),
        }
    }

    pub fn reset(&mut self) {
        if !self.is_idle() {
            debug!("View transform gesture ended at {:?}", self.transform);
        }
        self.state = ViewGesture::Idle;
    }

    fn pan(
        &mut self,
        hand: Handedness,
        position: Point2D,
        timestamp_ms: u64,
    ) -> Option<InteractionEvent> {
        match self.state {
            ViewGesture::Panning {
                hand: panning_hand,
                reference,
                handoff_from,
            } if panning_hand == hand => {
                self.transform.x += position.0 - reference.0;
                self.transform.y += position.1 - reference.1;
                // Still just after a zoom until the hand leaves its handoff position
                let still_handing_off = handoff_from.filter(|origin| {
                    distance_points(origin, &position) <= self.settings.handoff_threshold
                });
                if handoff_from.is_some() && still_handing_off.is_none() {
                    debug!("{:?} pan has taken over from zoom", hand);
                }
                self.state = ViewGesture::Panning {
                    hand,
                    reference: position,
                    handoff_from: still_handing_off,
                };
                Some(InteractionEvent::transform(
                    InteractionKind::Drag,
                    timestamp_ms,
                    Some(hand),
                    self.transform,
                ))
            }
            ViewGesture::Zooming { .. } => {
                // The other hand just dropped out. Its absence moves the midpoint,
                // so re-seed from here and leave the transform exactly as it was.
                debug!("Zoom handed off to {:?} pan", hand);
                self.state = ViewGesture::Panning {
                    hand,
                    reference: position,
                    handoff_from: Some(position),
                };
                Some(InteractionEvent::transform(
                    InteractionKind::Drag,
                    timestamp_ms,
                    Some(hand),
                    self.transform,
                ))
            }
            _ => {
                debug!("{:?} pan start", hand);
                self.state = ViewGesture::Panning {
                    hand,
                    reference: position,
                    handoff_from: None,
                };
                None
            }
        }
    }

    fn zoom(&mut self, a: &Point2D, b: &Point2D, timestamp_ms: u64) -> Option<InteractionEvent> {
        let current_distance = distance_points(a, b);
        let center = midpoint(a, b);

        match self.state {
            ViewGesture::Zooming {
                last_distance,
                fixed_point,
            } => {
                if current_distance <= 0. {
                    return None;
                }
                if last_distance <= 0. {
                    self.state = ViewGesture::Zooming {
                        last_distance: current_distance,
                        fixed_point,
                    };
                    return None;
                }

                let scale = (self.transform.scale * (current_distance / last_distance))
                    .clamp(self.settings.min_scale, self.settings.max_scale);
                self.transform = ViewTransform {
                    scale,
                    x: center.0 - fixed_point.0 * scale,
                    y: center.1 - fixed_point.1 * scale,
                };
                self.state = ViewGesture::Zooming {
                    last_distance: current_distance,
                    fixed_point,
                };
                Some(InteractionEvent::transform(
                    InteractionKind::Zoom,
                    timestamp_ms,
                    None,
                    self.transform,
                ))
            }
            _ => {
                let fixed_point = self.transform.to_content(&center);
                debug!("Zoom start; content point {:?} anchored", fixed_point);
                self.state = ViewGesture::Zooming {
                    last_distance: current_distance,
                    fixed_point,
                };
                None
            }
        }
    }
}
