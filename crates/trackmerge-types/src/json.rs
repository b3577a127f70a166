//! JSON interop.
//!
//! JSON has no absent marker: absent mapping entries are skipped and absent
//! sequence elements become `null`, as are non-finite numbers.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number};

use crate::error::{TypeError, TypeResult};
use crate::node::{Mapping, Sequence};
use crate::value::Value;

impl Value {
    /// Parse a JSON document into fresh nodes.
    pub fn from_json_str(s: &str) -> TypeResult<Value> {
        serde_json::from_str::<serde_json::Value>(s)
            .map(Value::from)
            .map_err(|e| TypeError::Json(e.to_string()))
    }

    /// Snapshot the tree as a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Absent | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Sequence(s) => serde_json::Value::Array(s.to_vec().iter().map(Value::to_json).collect()),
            Self::Mapping(m) => {
                let mut map = Map::new();
                for (key, value) in m.entries() {
                    if !value.is_absent() {
                        map.insert(key, value.to_json());
                    }
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Value::from).collect::<Sequence>())
            }
            serde_json::Value::Object(map) => Self::Mapping(Mapping::from_entries(
                map.into_iter().map(|(k, v)| (k, Value::from(v))),
            )),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent | Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Self::Number(_) => serializer.serialize_unit(),
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(s) => {
                let items = s.to_vec();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(m) => {
                let entries: Vec<_> = m
                    .entries()
                    .into_iter()
                    .filter(|(_, v)| !v.is_absent())
                    .collect();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in &entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_builds_fresh_nodes() {
        let v = Value::from(json!({"a": [1, {"b": null}], "c": "x"}));
        let m = v.as_mapping().unwrap();
        assert_eq!(m.keys(), vec!["a", "c"]);
        let a = m.get("a");
        assert_eq!(a.as_sequence().unwrap().len(), 2);
        assert!(a.get_field("1").get_field("b").is_null());
    }

    #[test]
    fn to_json_skips_absent_fields() {
        let m = Mapping::from_entries([("a", Value::from(1)), ("gone", Value::Absent)]);
        assert_eq!(Value::from(m).to_json(), json!({"a": 1.0}));
    }

    #[test]
    fn to_json_nulls_absent_elements_and_nan() {
        let s = Sequence::from_vec(vec![Value::Absent, Value::from(f64::NAN), Value::from(2)]);
        assert_eq!(Value::from(s).to_json(), json!([null, null, 2.0]));
    }

    #[test]
    fn serialize_matches_to_json() {
        let v = Value::from(json!({"list": [1, true, "s", null], "nested": {"k": 2}}));
        let via_serde = serde_json::to_value(&v).unwrap();
        assert_eq!(via_serde, v.to_json());
    }

    #[test]
    fn deserialize_from_str() {
        let v: Value = serde_json::from_str(r#"{"id": 3, "tags": ["a"]}"#).unwrap();
        assert_eq!(v, Value::from(json!({"id": 3, "tags": ["a"]})));
    }

    #[test]
    fn from_json_str_reports_errors() {
        assert!(Value::from_json_str("[1, 2]").is_ok());
        assert!(matches!(Value::from_json_str("{nope"), Err(TypeError::Json(_))));
    }

    #[test]
    fn integer_numbers_compare_equal_after_conversion() {
        assert_eq!(Value::from(json!(5)), Value::from(5));
    }
}
