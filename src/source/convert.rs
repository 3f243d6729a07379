//! BSON → JSON conversion for exported documents
//!
//! Uses the simplified representation: ObjectIds become hex strings, dates
//! become RFC 3339 strings and Decimal128 becomes a number where it fits.

use chrono::{DateTime as ChronoDateTime, SecondsFormat, Utc};
use mongodb::bson::{Bson, Document as BsonDocument};
use serde_json::{Map, Number, Value};

/// Convert a BSON document into a JSON object
pub fn document_to_json(doc: &BsonDocument) -> Value {
    let map: Map<String, Value> = doc
        .iter()
        .map(|(key, value)| (key.clone(), bson_to_json(value)))
        .collect();
    Value::Object(map)
}

/// Convert a single BSON value
pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::String(s) => Value::String(s.clone()),
        Bson::Int32(n) => Value::Number((*n).into()),
        Bson::Int64(n) => Value::Number((*n).into()),
        Bson::Double(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(datetime_to_rfc3339(dt.timestamp_millis())),
        Bson::Decimal128(d) => {
            let s = d.to_string();
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::String(s))
        }
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => other.clone().into_relaxed_extjson(),
    }
}

fn datetime_to_rfc3339(millis: i64) -> String {
    ChronoDateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

/// Convert a JSON id into BSON for use in a query filter
///
/// Integral numbers become Int64 so they match ids stored as either Int32 or
/// Int64; everything else goes through the relaxed extended JSON parser.
pub fn json_to_bson(value: &Value) -> Option<Bson> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Bson::Int64)
            .or_else(|| n.as_f64().map(Bson::Double)),
        Value::String(s) => Some(Bson::String(s.clone())),
        Value::Bool(b) => Some(Bson::Boolean(*b)),
        Value::Null => None,
        other => Bson::try_from(other.clone()).ok(),
    }
}
