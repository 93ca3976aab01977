//! Landmark resolution
//!
//! Per frame, each of the four classes picks at most one landmark: the
//! side-tagged candidate with the highest visibility. Untagged landmarks are
//! ambiguous and never resolve. Winners are clamped to [0,1] and scaled to
//! world size with no vertical flip.

use kinepong_core::{ControlTargets, Landmark, LandmarkClass, PlayerRecord, WorldPoint};

/// World dimensions used for coordinate scaling
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolverConfig {
    pub world_width: f32,
    pub world_height: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            world_width: 1920.0,
            world_height: 1080.0,
        }
    }
}

/// Winners for one frame. `None` means no candidate this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResolvedTargets {
    slots: [Option<WorldPoint>; 4],
}

impl ResolvedTargets {
    pub fn get(&self, class: LandmarkClass) -> Option<WorldPoint> {
        self.slots[class.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Landmark resolver
#[derive(Clone, Debug, Default)]
pub struct LandmarkResolver {
    config: ResolverConfig,
}

impl LandmarkResolver {
    pub fn new(config: ResolverConfig) -> Self {
        LandmarkResolver { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Map a normalized landmark position into world space
    pub fn to_world(&self, landmark: &Landmark) -> WorldPoint {
        let p = landmark.position.clamp_unit();
        WorldPoint::new(p.x * self.config.world_width, p.y * self.config.world_height)
    }

    /// Best candidate for one class, by visibility. Ties keep the earlier one.
    pub fn select<'a>(&self, player: &'a PlayerRecord, class: LandmarkClass) -> Option<&'a Landmark> {
        let side = class.side();
        player
            .limb(class.limb())
            .iter()
            .filter(|lm| lm.side == Some(side))
            .fold(None, |best: Option<&Landmark>, lm| match best {
                Some(b) if lm.visibility <= b.visibility => Some(b),
                _ => Some(lm),
            })
    }

    /// Resolve all four classes for one player
    pub fn resolve(&self, player: &PlayerRecord) -> ResolvedTargets {
        let mut resolved = ResolvedTargets::default();
        for class in LandmarkClass::all() {
            resolved.slots[class.index()] = self.select(player, *class).map(|lm| self.to_world(lm));
        }
        resolved
    }

    /// Apply a frame's winners; classes without a winner keep their value
    pub fn apply(targets: &mut ControlTargets, resolved: &ResolvedTargets) {
        for class in LandmarkClass::all() {
            if let Some(point) = resolved.get(*class) {
                targets.set(*class, point);
            }
        }
    }

    /// Resolve and apply in one step. Returns the number of classes updated.
    pub fn update(&self, targets: &mut ControlTargets, player: &PlayerRecord) -> usize {
        let resolved = self.resolve(player);
        Self::apply(targets, &resolved);
        resolved.count()
    }
}
