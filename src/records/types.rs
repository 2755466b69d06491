use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// One nutrition entry from the offline export.
///
/// The stored JSON object is kept untouched and is exactly what clients get
/// back. The few fields ranking looks at are read out once, when the record
/// is parsed, into [`SearchKeys`].
#[derive(Debug, Clone, PartialEq)]
pub struct FoodRecord {
    fields: Map<String, Value>,
    keys: SearchKeys,
}

/// Lowercased name and brand text plus the calorie flag.
///
/// Missing or non-text values become empty strings, which never match a
/// normalized query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchKeys {
    pub name_kor: String,
    pub name_eng: String,
    pub brand: String,
    pub has_calories: bool,
}

impl FoodRecord {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let keys = SearchKeys {
            name_kor: lowered(fields.get("name_kor")),
            name_eng: lowered(fields.get("name_eng")),
            brand: lowered(fields.get("brand")),
            has_calories: number(fields.get("calories")).is_some_and(|c| c != 0.0),
        };

        Self { fields, keys }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> &SearchKeys {
        &self.keys
    }

    /// `id` as text. Numbers print in decimal; anything else is empty.
    pub fn id(&self) -> String {
        text(self.fields.get("id")).unwrap_or_default()
    }

    /// Calories as a number, accepting numeric strings.
    pub fn calories(&self) -> Option<f64> {
        number(self.fields.get("calories"))
    }

    /// True when the record carries a usable calorie value (present, non-zero).
    pub fn has_calories(&self) -> bool {
        self.keys.has_calories
    }
}

impl Serialize for FoodRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FoodRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_fields)
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lowered(value: Option<&Value>) -> String {
    text(value).map(|s| s.to_lowercase()).unwrap_or_default()
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}
