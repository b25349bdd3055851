use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{EncodeOptions, Error, Result};

/// Dict entries in document order; the encoder sorts keys on output.
pub type Map = IndexMap<String, Value>;

/// A decoded NestedText document. All scalars are strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    String(String),
    List(Vec<Value>),
    Dict(Map),
}

impl Value {
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub const fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Map> {
        match self {
            Value::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is a dict.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict().and_then(|map| map.get(key))
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::String(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text =
            crate::encode_to_string(self, &EncodeOptions::default()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Dict(map)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Dict(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Dict(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = Error;

    /// Numbers and booleans become their textual form; `null` has no NestedText shape.
    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Err(Error::schema("unable to encode null value")),
            serde_json::Value::Bool(b) => Ok(Value::String(b.to_string())),
            serde_json::Value::Number(n) => Ok(Value::String(n.to_string())),
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| Ok((key, Value::try_from(value)?)))
                .collect::<Result<Map>>()
                .map(Value::Dict),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, sequence or string-keyed map")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Dict(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[rstest::rstest]
    fn test_accessors() {
        let value = Value::from_iter([
            ("name", Value::from("Ada")),
            ("tags", Value::from_iter([Value::from("a"), Value::from("b")])),
        ]);
        assert!(value.is_dict());
        assert_eq!(value.get("name").and_then(Value::as_str), Some("Ada"));
        assert_eq!(value.get("tags").and_then(Value::as_list).map(Vec::len), Some(2));
        assert!(value.get("missing").is_none());
        assert!(Value::from("x").get("x").is_none());
    }

    #[rstest::rstest]
    fn test_json_conversion_stringifies_scalars() {
        let value = Value::try_from(json!({"n": 3, "ok": true, "xs": [1.5, "a"]})).unwrap();
        assert_eq!(value.get("n"), Some(&Value::from("3")));
        assert_eq!(value.get("ok"), Some(&Value::from("true")));
        assert_eq!(
            value.get("xs"),
            Some(&Value::from_iter([Value::from("1.5"), Value::from("a")]))
        );
    }

    #[rstest::rstest]
    fn test_json_null_is_schema_error() {
        let err = Value::try_from(json!({"a": null})).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Schema);
    }

    #[rstest::rstest]
    fn test_into_json_keeps_document_order() {
        let value = Value::from_iter([("b", "1"), ("a", "2")]);
        let json = serde_json::Value::from(value);
        assert_eq!(serde_json::to_string(&json).unwrap(), r#"{"b":"1","a":"2"}"#);
    }

    #[rstest::rstest]
    fn test_serde_roundtrip_through_json() {
        let value = Value::from_iter([("list", Value::from_iter([Value::from("x")]))]);
        let text = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }

    #[rstest::rstest]
    fn test_display_renders_nestedtext() {
        let value = Value::from_iter([("a", "Hello")]);
        assert_eq!(value.to_string(), "a: Hello\n");
    }
}
