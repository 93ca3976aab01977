//! Pose extraction
//!
//! Walks a decoded document and produces player records. Missing keys and
//! wrong shapes are treated as absent at every level; a landmark whose
//! numeric fields fail coercion is skipped on its own without affecting its
//! siblings. Confidence gating for hands and feet happens here.

use serde_json::Value;
use tracing::debug;

use kinepong_core::{BodyDescriptor, BodyValue, Landmark, Limb, PlayerRecord, Point2, Side};

use crate::{FieldAccess, NumberField, Object, PoseDocument};

/// Default hand gate: kept only when `visibility > 0.1`
pub const DEFAULT_HAND_MIN_VISIBILITY: f32 = 0.1;

/// Default foot gate: kept only when `visibility > 0.05`.
/// Foot tracking upstream is noisier so feet are trusted at lower confidence.
pub const DEFAULT_FOOT_MIN_VISIBILITY: f32 = 0.05;

/// Extractor configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractorConfig {
    pub hand_min_visibility: f32,
    pub foot_min_visibility: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            hand_min_visibility: DEFAULT_HAND_MIN_VISIBILITY,
            foot_min_visibility: DEFAULT_FOOT_MIN_VISIBILITY,
        }
    }
}

impl ExtractorConfig {
    pub fn min_visibility(&self, limb: Limb) -> f32 {
        match limb {
            Limb::Hand => self.hand_min_visibility,
            Limb::Foot => self.foot_min_visibility,
        }
    }
}

/// Why a landmark entry was not turned into a [`Landmark`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry is not a mapping
    NotAMapping,
    /// `x` or `y` missing
    MissingCoordinate,
    /// A numeric field failed coercion
    InvalidNumber(&'static str),
}

/// Per-frame extraction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub hands_kept: u32,
    pub feet_kept: u32,
    /// Entries that were not mappings or lacked coordinates
    pub skipped_shape: u32,
    /// Entries with a numeric field that failed coercion
    pub skipped_invalid: u32,
    /// Entries at or below the limb's visibility gate
    pub dropped_low_confidence: u32,
    /// `players` entries that were not mappings
    pub skipped_players: u32,
}

/// Result of extracting one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Records for the mapping entries of `players`, in order
    pub players: Vec<PlayerRecord>,
    /// `players` key existed and held an array
    pub players_key_present: bool,
    /// Length of the raw `players` array, mapping or not
    pub raw_player_count: usize,
    /// `players[0]` was a mapping
    pub first_is_mapping: bool,
    pub stats: ExtractStats,
}

impl Extraction {
    /// Entries in the `players` array, including ones that were skipped
    pub fn player_count(&self) -> usize {
        self.raw_player_count
    }

    /// The player that drives the control channels. Only `players[0]`
    /// qualifies; a non-mapping first entry leaves the channels untouched.
    pub fn primary(&self) -> Option<&PlayerRecord> {
        if self.first_is_mapping {
            self.players.first()
        } else {
            None
        }
    }
}

/// Pose extractor
#[derive(Debug, Clone, Default)]
pub struct PoseExtractor {
    config: ExtractorConfig,
}

impl PoseExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        PoseExtractor { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract all players from a decoded frame
    pub fn extract(&self, doc: &PoseDocument) -> Extraction {
        let mut extraction = Extraction::default();

        let Some(entries) = doc.get_array("players") else {
            debug!("frame has no players array");
            return extraction;
        };
        extraction.players_key_present = true;
        extraction.raw_player_count = entries.len();
        extraction.first_is_mapping = entries.first().is_some_and(|entry| entry.is_object());

        for entry in entries {
            let Some(player) = entry.as_object() else {
                extraction.stats.skipped_players += 1;
                continue;
            };
            let record = self.extract_player(player, &mut extraction.stats);
            extraction.players.push(record);
        }

        debug!(
            players = extraction.raw_player_count,
            records = extraction.players.len(),
            hands = extraction.stats.hands_kept,
            feet = extraction.stats.feet_kept,
            dropped = extraction.stats.dropped_low_confidence,
            skipped = extraction.stats.skipped_shape + extraction.stats.skipped_invalid,
            "frame extracted"
        );
        extraction
    }

    fn extract_player(&self, player: &Object, stats: &mut ExtractStats) -> PlayerRecord {
        let hands = self.extract_limb(player, "hands", Limb::Hand, stats);
        let feet = self.extract_limb(player, "feet", Limb::Foot, stats);

        let head = player
            .get_object("head")
            .and_then(|head| parse_landmark(head).ok());

        let body = player.get_object("body").map(parse_body);

        PlayerRecord {
            hands,
            feet,
            head,
            body,
        }
    }

    fn extract_limb(
        &self,
        player: &Object,
        key: &str,
        limb: Limb,
        stats: &mut ExtractStats,
    ) -> Vec<Landmark> {
        let Some(entries) = player.get_array(key) else {
            return Vec::new();
        };
        let gate = self.config.min_visibility(limb);

        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            let parsed = match entry.as_object() {
                Some(obj) => parse_landmark(obj),
                None => Err(SkipReason::NotAMapping),
            };

            match parsed {
                Ok(landmark) if landmark.visibility > gate => {
                    match limb {
                        Limb::Hand => stats.hands_kept += 1,
                        Limb::Foot => stats.feet_kept += 1,
                    }
                    kept.push(landmark);
                }
                Ok(landmark) => {
                    stats.dropped_low_confidence += 1;
                    debug!(?limb, visibility = landmark.visibility, "landmark below gate");
                }
                Err(SkipReason::InvalidNumber(field)) => {
                    stats.skipped_invalid += 1;
                    debug!(?limb, field, "landmark skipped: numeric coercion failed");
                }
                Err(_) => stats.skipped_shape += 1,
            }
        }
        kept
    }
}

/// Parse a single landmark mapping.
///
/// `x` and `y` are required; `visibility` and `presence` default to 1.0;
/// `side` defaults to absent. Any present numeric field that fails
/// coercion rejects the landmark.
pub fn parse_landmark(obj: &Object) -> Result<Landmark, SkipReason> {
    let x = required(obj, "x")?;
    let y = required(obj, "y")?;
    let visibility = optional(obj, "visibility")?;
    let presence = optional(obj, "presence")?;
    let side = obj.get_str("side").and_then(Side::from_tag);

    Ok(Landmark {
        position: Point2::new(x, y),
        visibility,
        presence,
        side,
    })
}

fn required(obj: &Object, key: &'static str) -> Result<f32, SkipReason> {
    match obj.get_number(key) {
        NumberField::Value(v) => Ok(v),
        NumberField::Absent => Err(SkipReason::MissingCoordinate),
        NumberField::Invalid => Err(SkipReason::InvalidNumber(key)),
    }
}

fn optional(obj: &Object, key: &'static str) -> Result<f32, SkipReason> {
    obj.get_number(key)
        .or_default(Landmark::DEFAULT_CONFIDENCE)
        .ok_or(SkipReason::InvalidNumber(key))
}

fn parse_body(obj: &Object) -> BodyDescriptor {
    let fields = obj
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => BodyValue::Null,
                Value::Bool(b) => BodyValue::Flag(*b),
                Value::Number(n) => n.as_f64().map_or(BodyValue::Null, BodyValue::Number),
                Value::String(s) => BodyValue::Text(s.clone()),
                nested => BodyValue::Raw(nested.to_string()),
            };
            (key.clone(), value)
        })
        .collect();

    BodyDescriptor {
        center: parse_landmark(obj).ok(),
        fields,
    }
}
