use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Flattens the typed field values into a plain JSON object.
    pub fn into_json(self) -> Map<String, Value> {
        self.fields
            .into_iter()
            .map(|(k, v)| (k, v.into_json()))
            .collect()
    }
}

/// Typed field value as the document REST API encodes it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl FieldValue {
    pub fn into_json(self) -> Value {
        match self {
            FieldValue::NullValue(()) => Value::Null,
            FieldValue::BooleanValue(b) => Value::Bool(b),
            // int64 travels as a decimal string
            FieldValue::IntegerValue(s) => match s.parse::<i64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => Value::String(s),
            },
            FieldValue::DoubleValue(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            FieldValue::TimestampValue(s)
            | FieldValue::StringValue(s)
            | FieldValue::BytesValue(s)
            | FieldValue::ReferenceValue(s) => Value::String(s),
            FieldValue::GeoPointValue(p) => serde_json::json!({
                "latitude": p.latitude,
                "longitude": p.longitude,
            }),
            FieldValue::ArrayValue(a) => {
                Value::Array(a.values.into_iter().map(FieldValue::into_json).collect())
            }
            FieldValue::MapValue(m) => Value::Object(
                m.fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_user_document() {
        let json = r#"{
            "name": "projects/p/databases/(default)/documents/users/u1",
            "fields": {
                "fcmToken": { "stringValue": "tok123" },
                "name": { "stringValue": "Asha" },
                "role": { "stringValue": "resident" },
                "flatNumber": { "integerValue": "101" },
                "lastSeen": { "timestampValue": "2024-05-01T10:00:00Z" },
                "muted": { "booleanValue": false },
                "deviceInfo": { "nullValue": null }
            },
            "createTime": "2024-05-01T10:00:00Z",
            "updateTime": "2024-05-01T10:00:00Z"
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();
        let fields = doc.into_json();

        assert_eq!(fields["fcmToken"], "tok123");
        assert_eq!(fields["flatNumber"], 101);
        assert_eq!(fields["muted"], false);
        assert_eq!(fields["deviceInfo"], Value::Null);
        assert_eq!(fields["lastSeen"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_nested_values_flatten() {
        let json = r#"{
            "fields": {
                "tags": { "arrayValue": { "values": [
                    { "stringValue": "a" },
                    { "doubleValue": 1.5 }
                ] } },
                "address": { "mapValue": { "fields": {
                    "wing": { "stringValue": "A" }
                } } },
                "empty": { "arrayValue": {} }
            }
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();
        let fields = doc.into_json();

        assert_eq!(fields["tags"], json!(["a", 1.5]));
        assert_eq!(fields["address"], json!({ "wing": "A" }));
        assert_eq!(fields["empty"], json!([]));
    }

    #[test]
    fn test_document_without_fields() {
        let doc: Document = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(doc.into_json().is_empty());
    }
}
