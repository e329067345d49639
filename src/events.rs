use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    geometry_utils::ScreenPoint, hands::Handedness, scene::ElementRef,
    systems::view_transform::ViewTransform,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    PointerOver,
    PointerOut,
    PointerSelect,
    PointerDown,
    PointerMove,
    PointerUp,
    Drag,
    Zoom,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 8] = [
        InteractionKind::PointerOver,
        InteractionKind::PointerOut,
        InteractionKind::PointerSelect,
        InteractionKind::PointerDown,
        InteractionKind::PointerMove,
        InteractionKind::PointerUp,
        InteractionKind::Drag,
        InteractionKind::Zoom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointerOver => "pointerover",
            Self::PointerOut => "pointerout",
            Self::PointerSelect => "pointerselect",
            Self::PointerDown => "pointerdown",
            Self::PointerMove => "pointermove",
            Self::PointerUp => "pointerup",
            Self::Drag => "drag",
            Self::Zoom => "zoom",
        }
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InteractionKind::ALL
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown interaction kind \"{}\"", s))
    }
}

/// One interaction, as published to the scene. Pointer kinds carry a `point`,
/// drag/zoom carry the full `transform` after the update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<Handedness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ElementRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<ScreenPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<ViewTransform>,
}

impl InteractionEvent {
    pub fn pointer(
        kind: InteractionKind,
        timestamp_ms: u64,
        hand: Handedness,
        point: ScreenPoint,
        target: Option<ElementRef>,
    ) -> Self {
        InteractionEvent {
            kind,
            timestamp_ms,
            hand: Some(hand),
            target,
            point: Some(point),
            transform: None,
        }
    }

    pub fn transform(
        kind: InteractionKind,
        timestamp_ms: u64,
        hand: Option<Handedness>,
        transform: ViewTransform,
    ) -> Self {
        InteractionEvent {
            kind,
            timestamp_ms,
            hand,
            target: None,
            point: None,
            transform: Some(transform),
        }
    }
}

/// Subscription by event kind and/or target element. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    kinds: Vec<InteractionKind>,
    target: Option<ElementRef>,
}

impl EventFilter {
    pub fn new() -> Self {
        EventFilter::default()
    }

    pub fn kinds(mut self, kinds: &[InteractionKind]) -> Self {
        self.kinds = Vec::from(kinds);
        self
    }

    pub fn target(mut self, target: Option<ElementRef>) -> Self {
        self.target = target;
        self
    }

    pub fn matches(&self, event: &InteractionEvent) -> bool {
        let kind_ok = self.kinds.is_empty() || self.kinds.contains(&event.kind);
        let target_ok = match self.target {
            Some(t) => event.target == Some(t),
            None => true,
        };
        kind_ok && target_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: InteractionKind, target: Option<ElementRef>) -> InteractionEvent {
        let point = ScreenPoint {
            x: 1.,
            y: 2.,
            client_x: 3.,
            client_y: 2.,
        };
        InteractionEvent::pointer(kind, 10, Handedness::Right, point, target)
    }

    #[test]
    fn test_kind_names() {
        for kind in InteractionKind::ALL {
            assert_eq!(kind.as_str().parse::<InteractionKind>(), Ok(kind));
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }
        assert_eq!(
            "PointerSelect".parse::<InteractionKind>(),
            Ok(InteractionKind::PointerSelect)
        );
        assert!("tap".parse::<InteractionKind>().is_err());
    }

    #[test]
    fn test_filter() {
        let over_a = sample(InteractionKind::PointerOver, Some(ElementRef(1)));
        let out_b = sample(InteractionKind::PointerOut, Some(ElementRef(2)));

        assert!(EventFilter::new().matches(&over_a));

        let only_over = EventFilter::new().kinds(&[InteractionKind::PointerOver]);
        assert!(only_over.matches(&over_a));
        assert!(!only_over.matches(&out_b));

        let only_b = EventFilter::new().target(Some(ElementRef(2)));
        assert!(!only_b.matches(&over_a));
        assert!(only_b.matches(&out_b));

        let zoom = InteractionEvent::transform(
            InteractionKind::Zoom,
            5,
            None,
            ViewTransform::default(),
        );
        assert!(!only_b.matches(&zoom));
    }

    #[test]
    fn test_serialise_skips_empty_fields() {
        let text = serde_json::to_string(&sample(InteractionKind::PointerDown, None)).unwrap();
        assert!(text.contains("\"kind\":\"pointerdown\""));
        assert!(text.contains("\"clientX\":3.0"));
        assert!(!text.contains("transform"));
        assert!(!text.contains("target"));
    }
}
