//! Tagged value union and the Rust types that map onto it.

use serde::{Deserialize, Serialize};

use super::kind::Kind;
use crate::error::PropertyError;

/// A published value. One variant per [`Kind`].
///
/// JSON form is `{"type": "<type string>", "value": ...}`; raw bytes travel
/// base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    #[serde(rename = "boolean")]
    Bool(bool),
    #[serde(rename = "int")]
    Int(i64),
    #[serde(rename = "float")]
    Float(f32),
    #[serde(rename = "double")]
    Double(f64),
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "raw")]
    Raw(#[serde(with = "raw_base64")] Vec<u8>),
    #[serde(rename = "boolean[]")]
    BoolArray(Vec<bool>),
    #[serde(rename = "int[]")]
    IntArray(Vec<i64>),
    #[serde(rename = "float[]")]
    FloatArray(Vec<f32>),
    #[serde(rename = "double[]")]
    DoubleArray(Vec<f64>),
    #[serde(rename = "string[]")]
    StringArray(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Double(_) => Kind::Double,
            Self::String(_) => Kind::String,
            Self::Raw(_) => Kind::Raw,
            Self::BoolArray(_) => Kind::BoolArray,
            Self::IntArray(_) => Kind::IntArray,
            Self::FloatArray(_) => Kind::FloatArray,
            Self::DoubleArray(_) => Kind::DoubleArray,
            Self::StringArray(_) => Kind::StringArray,
        }
    }

    /// Infer a value from untyped JSON.
    ///
    /// Integers become `Int`, other numbers `Double`, homogeneous arrays the
    /// matching array kind (an empty array is a `DoubleArray`). Null, objects
    /// and mixed arrays have no kind.
    pub fn from_json(json: serde_json::Value) -> Result<Self, PropertyError> {
        use serde_json::Value as Json;

        match json {
            Json::Bool(b) => Ok(Self::Bool(b)),
            Json::Number(n) => Ok(n.as_i64().map_or_else(|| Self::Double(n.as_f64().unwrap_or(f64::NAN)), Self::Int)),
            Json::String(s) => Ok(Self::String(s)),
            Json::Array(items) => array_from_json(items),
            Json::Null => Err(PropertyError::UnsupportedKind { found: "null".to_string() }),
            Json::Object(_) => Err(PropertyError::UnsupportedKind { found: "object".to_string() }),
        }
    }
}

fn array_from_json(items: Vec<serde_json::Value>) -> Result<Value, PropertyError> {
    if items.is_empty() {
        return Ok(Value::DoubleArray(Vec::new()));
    }

    if let Some(bools) = items.iter().map(serde_json::Value::as_bool).collect::<Option<Vec<_>>>() {
        return Ok(Value::BoolArray(bools));
    }
    if let Some(ints) = items.iter().map(serde_json::Value::as_i64).collect::<Option<Vec<_>>>() {
        return Ok(Value::IntArray(ints));
    }
    if let Some(doubles) = items.iter().map(serde_json::Value::as_f64).collect::<Option<Vec<_>>>() {
        return Ok(Value::DoubleArray(doubles));
    }
    if let Some(strings) = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
    {
        return Ok(Value::StringArray(strings));
    }

    Err(PropertyError::UnsupportedKind { found: "mixed array".to_string() })
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// A Rust type that maps onto exactly one [`Kind`].
pub trait PropertyType: Sized + Send + Sync + 'static {
    const KIND: Kind;

    fn into_value(self) -> Value;

    /// `None` when `value` is of another kind.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! property_type {
    ($ty:ty, $variant:ident) => {
        impl PropertyType for $ty {
            const KIND: Kind = Kind::$variant;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

property_type!(bool, Bool);
property_type!(i64, Int);
property_type!(f32, Float);
property_type!(f64, Double);
property_type!(String, String);
property_type!(Vec<u8>, Raw);
property_type!(Vec<bool>, BoolArray);
property_type!(Vec<i64>, IntArray);
property_type!(Vec<f32>, FloatArray);
property_type!(Vec<f64>, DoubleArray);
property_type!(Vec<String>, StringArray);

mod raw_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_form_is_tagged() {
        let json = serde_json::to_value(Value::Double(0.5)).unwrap();
        assert_eq!(json, json!({"type": "double", "value": 0.5}));

        let parsed: Value = serde_json::from_value(json!({"type": "string[]", "value": ["a", "b"]})).unwrap();
        assert_eq!(parsed, Value::StringArray(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_raw_travels_as_base64() {
        let json = serde_json::to_value(Value::Raw(vec![0xde, 0xad, 0xbe, 0xef])).unwrap();
        assert_eq!(json, json!({"type": "raw", "value": "3q2+7w=="}));

        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), Kind::Raw);

        let bad = serde_json::from_value::<Value>(json!({"type": "raw", "value": "***"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_from_json_infers_kinds() {
        assert_eq!(Value::from_json(json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(Value::from_json(json!(3)).unwrap(), Value::Int(3));
        assert_eq!(Value::from_json(json!(1.25)).unwrap(), Value::Double(1.25));
        assert_eq!(Value::from_json(json!([1, 2])).unwrap(), Value::IntArray(vec![1, 2]));
        assert_eq!(Value::from_json(json!([1, 2.5])).unwrap(), Value::DoubleArray(vec![1.0, 2.5]));
        assert_eq!(Value::from_json(json!([])).unwrap(), Value::DoubleArray(vec![]));
        assert_eq!(Value::from_json(json!([false])).unwrap(), Value::BoolArray(vec![false]));
    }

    #[test]
    fn test_from_json_rejects_kindless_values() {
        for json in [json!(null), json!({"a": 1}), json!([1, "x"])] {
            let err = Value::from_json(json).unwrap_err();
            assert!(matches!(err, PropertyError::UnsupportedKind { .. }));
        }
    }

    #[test]
    fn test_property_type_rejects_other_kinds() {
        assert_eq!(f64::from_value(Value::Double(2.0)), Some(2.0));
        assert_eq!(f64::from_value(Value::String("2.0".to_string())), None);
        assert_eq!(<Vec<String>>::KIND, Kind::StringArray);
        assert_eq!(Value::from(7_i64).kind(), Kind::Int);
    }
}
