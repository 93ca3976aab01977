//! Control targets - the four paddle channels
//!
//! A target is `None` until the first time its class resolves. A resolved
//! target at the world origin is `Some((0, 0))`, never confused with unset.

use crate::{LandmarkClass, WorldPoint};

/// Resolved paddle targets in world coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlTargets {
    pub left_hand: Option<WorldPoint>,
    pub right_hand: Option<WorldPoint>,
    pub left_foot: Option<WorldPoint>,
    pub right_foot: Option<WorldPoint>,
}

impl ControlTargets {
    pub fn new() -> Self {
        ControlTargets::default()
    }

    pub fn get(&self, class: LandmarkClass) -> Option<WorldPoint> {
        match class {
            LandmarkClass::LeftHand => self.left_hand,
            LandmarkClass::RightHand => self.right_hand,
            LandmarkClass::LeftFoot => self.left_foot,
            LandmarkClass::RightFoot => self.right_foot,
        }
    }

    pub fn set(&mut self, class: LandmarkClass, point: WorldPoint) {
        let slot = match class {
            LandmarkClass::LeftHand => &mut self.left_hand,
            LandmarkClass::RightHand => &mut self.right_hand,
            LandmarkClass::LeftFoot => &mut self.left_foot,
            LandmarkClass::RightFoot => &mut self.right_foot,
        };
        *slot = Some(point);
    }

    /// Number of channels that have ever resolved
    pub fn resolved_count(&self) -> usize {
        LandmarkClass::all()
            .iter()
            .filter(|class| self.get(**class).is_some())
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LandmarkClass, Option<WorldPoint>)> + '_ {
        LandmarkClass::all().iter().map(move |class| (*class, self.get(*class)))
    }
}
