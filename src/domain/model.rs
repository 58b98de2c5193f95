use crate::constants::{
    ANIMAL_ID, DATETIME_INTAKE, DATETIME_OUTCOME, DEFAULT_INTAKE_COLLECTION,
    DEFAULT_OUTCOME_COLLECTION, INTAKE_SUFFIX, OUTCOME_SUFFIX, UNKNOWN,
};
use crate::utils::timestamp::{parse_timestamp, render_timestamp};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A document exactly as the store returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    pub data: Map<String, Value>,
}

impl RawRecord {
    /// Returns `None` unless `value` is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(data) => Some(Self { data }),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Intake,
    Outcome,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::Outcome => "outcome",
        }
    }

    pub fn timestamp_field(self) -> &'static str {
        match self {
            Self::Intake => DATETIME_INTAKE,
            Self::Outcome => DATETIME_OUTCOME,
        }
    }

    /// Appended to a column that exists on both sides of the join.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Intake => INTAKE_SUFFIX,
            Self::Outcome => OUTCOME_SUFFIX,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionNames {
    pub intake: String,
    pub outcome: String,
}

impl CollectionNames {
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Intake => &self.intake,
            EntityKind::Outcome => &self.outcome,
        }
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            intake: DEFAULT_INTAKE_COLLECTION.to_string(),
            outcome: DEFAULT_OUTCOME_COLLECTION.to_string(),
        }
    }
}

/// Equality conditions over top-level document fields. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    conditions: Map<String, Value>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &Map<String, Value> {
        &self.conditions
    }

    pub fn matches(&self, record: &RawRecord) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            record
                .data
                .get(field)
                .is_some_and(|actual| values_equal(actual, expected))
        })
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(conditions: Map<String, Value>) -> Self {
        Self { conditions }
    }
}

// 7 and 7.0 are the same number to the store.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

/// Per-entity filters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFilters {
    pub intake: Filter,
    pub outcome: Filter,
}

impl RunFilters {
    pub fn for_kind(&self, kind: EntityKind) -> &Filter {
        match kind {
            EntityKind::Intake => &self.intake,
            EntityKind::Outcome => &self.outcome,
        }
    }
}

/// A cell value after normalization.
///
/// `Unknown` is the explicit sentinel written by enrichment; `Null` only exists
/// between loading and enrichment.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Unknown,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Text(n.to_string())),
            Value::String(s) => Self::Text(s.clone()),
            nested => Self::Text(nested.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Null | Self::Unknown)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view; numeric text is accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Timestamp view; timestamp text is parsed.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            Self::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Unknown => f.write_str(UNKNOWN),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(ts) => f.write_str(&render_timestamp(ts)),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Unknown => serializer.serialize_str(UNKNOWN),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Timestamp(ts) => serializer.serialize_str(&render_timestamp(ts)),
        }
    }
}

/// One row keyed by canonical column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    pub data: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.data.insert(column.into(), value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.data.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: FieldValue) {
        self.data.insert(column.into(), value);
    }

    /// The animal identifier, if present as text.
    pub fn id(&self) -> Option<&str> {
        self.get(ANIMAL_ID).and_then(FieldValue::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        RawRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_filter_all_matches_everything() {
        assert!(Filter::all().matches(&raw(json!({"animal_id": "A1"}))));
        assert!(Filter::all().matches(&RawRecord::default()));
    }

    #[test]
    fn test_filter_equality() {
        let filter = Filter::all().where_eq("animal_type", "Dog").where_eq("age", 3);
        assert!(filter.matches(&raw(json!({"animal_type": "Dog", "age": 3.0}))));
        assert!(!filter.matches(&raw(json!({"animal_type": "Cat", "age": 3}))));
        assert!(!filter.matches(&raw(json!({"animal_type": "Dog"}))));
    }

    #[test]
    fn test_field_value_from_json() {
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(&json!(12)), FieldValue::Integer(12));
        assert_eq!(FieldValue::from_json(&json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from_json(&json!("x")), FieldValue::text("x"));
        assert_eq!(
            FieldValue::from_json(&json!(["a", 1])),
            FieldValue::text(r#"["a",1]"#)
        );
    }

    #[test]
    fn test_field_value_rendering() {
        assert_eq!(FieldValue::Unknown.to_string(), "unknown");
        assert_eq!(FieldValue::Float(1.0).to_string(), "1.0");
        assert_eq!(FieldValue::Bool(false).to_string(), "false");
        assert_eq!(serde_json::to_value(FieldValue::Unknown).unwrap(), json!("unknown"));
        assert_eq!(serde_json::to_value(FieldValue::Null).unwrap(), json!(null));
    }

    #[test]
    fn test_numeric_text_coerces() {
        assert_eq!(FieldValue::text(" 104 ").as_f64(), Some(104.0));
        assert_eq!(FieldValue::text("ten").as_f64(), None);
        assert_eq!(FieldValue::Unknown.as_f64(), None);
    }

    #[test]
    fn test_record_id_requires_text() {
        let record = Record::new().with(ANIMAL_ID, FieldValue::text("A1"));
        assert_eq!(record.id(), Some("A1"));
        let numeric = Record::new().with(ANIMAL_ID, FieldValue::Integer(1));
        assert_eq!(numeric.id(), None);
    }
}
