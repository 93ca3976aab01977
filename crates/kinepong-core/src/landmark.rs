//! Landmarks and player records
//!
//! Everything here is rebuilt from scratch on every frame. Nothing is
//! retained across frames except the latest snapshot held by consumers.

use std::collections::BTreeMap;
use std::fmt;

use crate::Point2;

/// Body side tag carried by hand and foot landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Parse a wire tag. Case-insensitive, surrounding whitespace ignored.
    pub fn from_tag(tag: &str) -> Option<Side> {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("left") {
            Some(Side::Left)
        } else if tag.eq_ignore_ascii_case("right") {
            Some(Side::Right)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limb family a landmark was reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limb {
    Hand,
    Foot,
}

/// The four control channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkClass {
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
}

impl LandmarkClass {
    /// All classes in channel order
    pub fn all() -> &'static [LandmarkClass] {
        &[
            LandmarkClass::LeftHand,
            LandmarkClass::RightHand,
            LandmarkClass::LeftFoot,
            LandmarkClass::RightFoot,
        ]
    }

    pub fn new(limb: Limb, side: Side) -> Self {
        match (limb, side) {
            (Limb::Hand, Side::Left) => LandmarkClass::LeftHand,
            (Limb::Hand, Side::Right) => LandmarkClass::RightHand,
            (Limb::Foot, Side::Left) => LandmarkClass::LeftFoot,
            (Limb::Foot, Side::Right) => LandmarkClass::RightFoot,
        }
    }

    pub fn limb(self) -> Limb {
        match self {
            LandmarkClass::LeftHand | LandmarkClass::RightHand => Limb::Hand,
            LandmarkClass::LeftFoot | LandmarkClass::RightFoot => Limb::Foot,
        }
    }

    pub fn side(self) -> Side {
        match self {
            LandmarkClass::LeftHand | LandmarkClass::LeftFoot => Side::Left,
            LandmarkClass::RightHand | LandmarkClass::RightFoot => Side::Right,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LandmarkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LandmarkClass::LeftHand => "left_hand",
            LandmarkClass::RightHand => "right_hand",
            LandmarkClass::LeftFoot => "left_foot",
            LandmarkClass::RightFoot => "right_foot",
        };
        f.write_str(name)
    }
}

/// One tracked body point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// Normalized camera-space position. Not guaranteed to be in [0,1].
    pub position: Point2,
    /// Primary confidence score
    pub visibility: f32,
    /// Secondary confidence. Parsed and carried, never used for gating.
    pub presence: f32,
    /// Side tag; `None` means the landmark is ambiguous
    pub side: Option<Side>,
}

impl Landmark {
    pub const DEFAULT_CONFIDENCE: f32 = 1.0;

    pub fn new(x: f32, y: f32) -> Self {
        Landmark {
            position: Point2::new(x, y),
            visibility: Self::DEFAULT_CONFIDENCE,
            presence: Self::DEFAULT_CONFIDENCE,
            side: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_presence(mut self, presence: f32) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }
}

/// Scalar JSON-like value kept from the `body` descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    Number(f64),
    Text(String),
    Flag(bool),
    /// Nested arrays/objects, kept in compact textual form
    Raw(String),
    Null,
}

/// Opaque torso descriptor forwarded to observers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyDescriptor {
    /// Present when the descriptor itself carries x/y
    pub center: Option<Landmark>,
    pub fields: BTreeMap<String, BodyValue>,
}

impl BodyDescriptor {
    pub fn get(&self, key: &str) -> Option<&BodyValue> {
        self.fields.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key) {
            Some(BodyValue::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Everything extracted for one player in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub hands: Vec<Landmark>,
    pub feet: Vec<Landmark>,
    pub head: Option<Landmark>,
    pub body: Option<BodyDescriptor>,
}

impl PlayerRecord {
    pub fn new() -> Self {
        PlayerRecord::default()
    }

    /// Landmarks reported under a limb family
    pub fn limb(&self, limb: Limb) -> &[Landmark] {
        match limb {
            Limb::Hand => &self.hands,
            Limb::Foot => &self.feet,
        }
    }

    /// Number of hand and foot landmarks
    pub fn landmark_count(&self) -> usize {
        self.hands.len() + self.feet.len()
    }
}
