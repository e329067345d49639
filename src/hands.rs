use serde::{Deserialize, Serialize};

/// Landmarks per hand, as produced by the recognizer
pub const LANDMARK_COUNT: usize = 21;

pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Fixed processing order for per-hand systems within one frame
    pub const ALL: [Handedness; 2] = [Handedness::Left, Handedness::Right];
}

/// Normalised landmark position; x and y are in the range [0;1] relative
/// to the camera frame
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HandObservation {
    pub handedness: Handedness,
    pub gesture_label: String,
    pub confidence: f32,
    pub landmarks: Vec<Landmark>,
}

/// Everything the recognizer reported for a single video frame
pub type HandFrame = Vec<HandObservation>;

/// A recorded frame, as stored by capture tools and consumed by `gesture-replay`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimedHandFrame {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub hands: HandFrame,
}

impl HandObservation {
    pub fn new(
        handedness: Handedness,
        gesture_label: &str,
        confidence: f32,
        landmarks: Vec<Landmark>,
    ) -> Self {
        HandObservation {
            handedness,
            gesture_label: String::from(gesture_label),
            confidence,
            landmarks,
        }
    }

    /// A hand is usable only with the full landmark set and no NaN/inf coordinates
    pub fn is_well_formed(&self) -> bool {
        self.landmarks.len() == LANDMARK_COUNT && self.landmarks.iter().all(|l| l.is_finite())
    }

    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// The index fingertip acts as the cursor for pointer, select, drag and pan/zoom
    pub fn pointer_tip(&self) -> Option<&Landmark> {
        self.landmark(INDEX_TIP)
    }

    pub fn fingertips(&self) -> Vec<Landmark> {
        FINGERTIPS
            .iter()
            .filter_map(|i| self.landmark(*i).copied())
            .collect()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.gesture_label == label
    }
}
