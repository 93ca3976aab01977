//! Pose frame builders
//!
//! Produce wire JSON the way a pose server would, plus the malformed
//! variants the pipeline must survive.

use serde_json::{json, Map, Value};

/// One landmark entry
#[derive(Clone, Debug)]
pub struct LandmarkJson {
    fields: Map<String, Value>,
}

/// Landmark at normalized `(x, y)` with no optional fields
pub fn landmark(x: f64, y: f64) -> LandmarkJson {
    let mut fields = Map::new();
    fields.insert("x".into(), json!(x));
    fields.insert("y".into(), json!(y));
    LandmarkJson { fields }
}

impl LandmarkJson {
    pub fn visibility(self, v: f64) -> Self {
        self.field("visibility", json!(v))
    }

    pub fn presence(self, p: f64) -> Self {
        self.field("presence", json!(p))
    }

    pub fn side(self, side: &str) -> Self {
        self.field("side", json!(side))
    }

    pub fn left(self) -> Self {
        self.side("left")
    }

    pub fn right(self) -> Self {
        self.side("right")
    }

    /// Set or replace any field, including with a wrong-typed value
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// One `players` entry
#[derive(Clone, Debug, Default)]
pub struct PlayerJson {
    hands: Option<Vec<Value>>,
    feet: Option<Vec<Value>>,
    head: Option<Value>,
    body: Option<Value>,
}

pub fn player() -> PlayerJson {
    PlayerJson::default()
}

impl PlayerJson {
    pub fn hand(mut self, lm: LandmarkJson) -> Self {
        self.hands.get_or_insert_with(Vec::new).push(lm.into_value());
        self
    }

    pub fn foot(mut self, lm: LandmarkJson) -> Self {
        self.feet.get_or_insert_with(Vec::new).push(lm.into_value());
        self
    }

    /// Raw entry in `hands`, for shape errors
    pub fn raw_hand(mut self, value: Value) -> Self {
        self.hands.get_or_insert_with(Vec::new).push(value);
        self
    }

    pub fn head(mut self, lm: LandmarkJson) -> Self {
        self.head = Some(lm.into_value());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn into_value(self) -> Value {
        let mut fields = Map::new();
        if let Some(hands) = self.hands {
            fields.insert("hands".into(), Value::Array(hands));
        }
        if let Some(feet) = self.feet {
            fields.insert("feet".into(), Value::Array(feet));
        }
        if let Some(head) = self.head {
            fields.insert("head".into(), head);
        }
        if let Some(body) = self.body {
            fields.insert("body".into(), body);
        }
        Value::Object(fields)
    }
}

/// Frame text with the given players
pub fn frame(players: impl IntoIterator<Item = PlayerJson>) -> String {
    let players: Vec<Value> = players.into_iter().map(PlayerJson::into_value).collect();
    json!({ "players": players }).to_string()
}

/// `{"players": []}`
pub fn empty_frame() -> String {
    frame(Vec::new())
}

/// Frame with no `players` key
pub fn no_players_frame() -> String {
    json!({ "timestamp": 0 }).to_string()
}

/// One player with a single side-tagged left hand
pub fn left_hand_frame(x: f64, y: f64, visibility: f64) -> String {
    frame([player().hand(landmark(x, y).visibility(visibility).left())])
}

/// Payloads the decoder must reject
pub fn malformed_frames() -> Vec<String> {
    vec![
        String::new(),
        "   ".to_string(),
        "{\"players\": [".to_string(),
        "not json".to_string(),
        "[1, 2, 3]".to_string(),
        "\"players\"".to_string(),
        "null".to_string(),
    ]
}
