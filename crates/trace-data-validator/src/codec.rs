//! JSON codec for trace fields and records.
//!
//! Field wire format: either a bare JSON value or a tagged object.
//!
//! ```json
//! null                                      // wildcard
//! 42, 1.5, "text", [ ... ]                  // bare integer/float/string/array
//! { "type": "integer", "value": 42 }        // or "int"; value may be hex text
//! { "type": "float", "value": 1.5 }         // or "floating_point"
//! { "type": "string", "value": "text" }
//! { "type": "enum", "label": "RUNNING", "value": 3 }
//! { "type": "array", "elements": [ ... ] }  // or "sequence"
//! { "type": "struct", "fields": [ { "name": "a", "value": ... } ] }
//! ```
//!
//! Record wire format: an object carrying `packet-header`/`packet-context`
//! is packet info; anything else is an event with optional `header`,
//! `stream-context`, `context` and `payload`.

use indexmap::IndexMap;
use serde_json::{json, Map, Number, Value};

use crate::error::DecodeError;
use crate::field::Field;
use crate::record::{Event, PacketInfo, Record};

// ── Decode ──────────────────────────────────────────────────────────────────

/// Decode one field-JSON value into a [`Field`].
pub fn decode_field(value: &Value) -> Result<Field, DecodeError> {
    match value {
        Value::Null => Ok(Field::Ignore),
        Value::Number(n) => decode_bare_number(n),
        Value::String(s) => Ok(Field::String(s.clone())),
        Value::Array(items) => Ok(Field::Array(decode_elements(items)?)),
        Value::Object(obj) => match obj.get("type") {
            Some(tag) => decode_tagged(tag, obj),
            None => Err(DecodeError::UnsupportedValue("object without `type`")),
        },
        Value::Bool(_) => Err(DecodeError::UnsupportedValue("boolean")),
    }
}

fn decode_bare_number(n: &Number) -> Result<Field, DecodeError> {
    if let Some(v) = integer_from_number(n) {
        return Ok(Field::Integer(v));
    }
    n.as_f64()
        .map(Field::Float)
        .ok_or(DecodeError::UnsupportedValue("number"))
}

fn decode_elements(items: &[Value]) -> Result<Vec<Field>, DecodeError> {
    items.iter().map(decode_field).collect()
}

fn decode_tagged(tag: &Value, obj: &Map<String, Value>) -> Result<Field, DecodeError> {
    let tag = match tag.as_str() {
        Some(t) => t,
        None => return Err(DecodeError::UnknownFieldType(tag.to_string())),
    };

    match tag {
        "integer" | "int" => {
            let value = require(obj, "integer", "value")?;
            Ok(Field::Integer(decode_integer(value)?))
        }
        "float" | "floating_point" => require(obj, "float", "value")?
            .as_f64()
            .map(Field::Float)
            .ok_or(DecodeError::InvalidValue {
                kind: "float",
                key: "value",
            }),
        "string" => require(obj, "string", "value")?
            .as_str()
            .map(|s| Field::String(s.to_string()))
            .ok_or(DecodeError::InvalidValue {
                kind: "string",
                key: "value",
            }),
        "enum" => require(obj, "enum", "label")?
            .as_str()
            .map(|s| Field::Enum(s.to_string()))
            .ok_or(DecodeError::InvalidValue {
                kind: "enum",
                key: "label",
            }),
        "array" | "sequence" => {
            let elements = require(obj, "array", "elements")?.as_array().ok_or(
                DecodeError::InvalidValue {
                    kind: "array",
                    key: "elements",
                },
            )?;
            Ok(Field::Array(decode_elements(elements)?))
        }
        "struct" => decode_struct(require(obj, "struct", "fields")?),
        other => Err(DecodeError::UnknownFieldType(other.to_string())),
    }
}

fn require<'a>(
    obj: &'a Map<String, Value>,
    kind: &'static str,
    key: &'static str,
) -> Result<&'a Value, DecodeError> {
    obj.get(key).ok_or(DecodeError::MissingKey { kind, key })
}

fn decode_integer(value: &Value) -> Result<i128, DecodeError> {
    match value {
        Value::String(text) => parse_hex_integer(text),
        Value::Number(n) => integer_from_number(n).ok_or(DecodeError::InvalidValue {
            kind: "integer",
            key: "value",
        }),
        _ => Err(DecodeError::InvalidValue {
            kind: "integer",
            key: "value",
        }),
    }
}

/// Integral JSON numbers, signed or unsigned 64-bit.
fn integer_from_number(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Parse base-16 text with an optional sign and optional `0x` prefix.
///
/// The value must fit in an `i128`, which covers every signed and unsigned
/// 64-bit value without aliasing between them.
pub fn parse_hex_integer(text: &str) -> Result<i128, DecodeError> {
    let invalid = || DecodeError::InvalidHexInteger(text.to_string());

    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .unwrap_or(rest);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let magnitude = u128::from_str_radix(digits, 16).map_err(|_| invalid())?;

    if negative {
        0i128.checked_sub_unsigned(magnitude).ok_or_else(invalid)
    } else {
        i128::try_from(magnitude).map_err(|_| invalid())
    }
}

/// Decode the `fields` of a struct, given as a `[{name, value}]` list or as an
/// object.
///
/// Duplicate names are rejected in the list form. In the object form the JSON
/// parser has already collapsed duplicate keys (the last one wins), so they
/// cannot be detected here.
fn decode_struct(fields: &Value) -> Result<Field, DecodeError> {
    let mut members: IndexMap<String, Field> = IndexMap::new();
    let mut insert = |name: &str, value: &Value| -> Result<(), DecodeError> {
        let decoded = decode_field(value)?;
        if members.insert(name.to_string(), decoded).is_some() {
            return Err(DecodeError::DuplicateStructField(name.to_string()));
        }
        Ok(())
    };

    match fields {
        Value::Array(entries) => {
            for entry in entries {
                let entry = entry.as_object().ok_or(DecodeError::InvalidValue {
                    kind: "struct",
                    key: "fields",
                })?;
                let name = require(entry, "struct member", "name")?
                    .as_str()
                    .ok_or(DecodeError::InvalidValue {
                        kind: "struct member",
                        key: "name",
                    })?;
                insert(name, require(entry, "struct member", "value")?)?;
            }
        }
        Value::Object(map) => {
            for (name, value) in map {
                insert(name, value)?;
            }
        }
        _ => {
            return Err(DecodeError::InvalidValue {
                kind: "struct",
                key: "fields",
            })
        }
    }

    Ok(Field::Struct(members))
}

/// Decode one top-level entry into a packet-info or event [`Record`].
pub fn classify(entry: &Value) -> Result<Record, DecodeError> {
    let obj = entry
        .as_object()
        .ok_or(DecodeError::EntryNotAnObject(value_kind(entry)))?;

    if obj.contains_key("packet-header") || obj.contains_key("packet-context") {
        return Ok(Record::PacketInfo(PacketInfo {
            header: decode_key(obj, "packet-header")?,
            context: decode_key(obj, "packet-context")?,
        }));
    }

    Ok(Record::Event(Event {
        header: decode_key(obj, "header")?,
        stream_context: decode_key(obj, "stream-context")?,
        context: decode_key(obj, "context")?,
        payload: decode_key(obj, "payload")?,
    }))
}

fn decode_key(obj: &Map<String, Value>, key: &str) -> Result<Option<Field>, DecodeError> {
    obj.get(key).map(decode_field).transpose()
}

/// Decode a whole trace document (a JSON array of entries).
pub fn decode_records(document: &Value) -> Result<Vec<Record>, DecodeError> {
    let entries = document.as_array().ok_or(DecodeError::NotAnArray)?;
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            classify(entry).map_err(|err| DecodeError::AtEntry {
                index,
                source: Box::new(err),
            })
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Encode ──────────────────────────────────────────────────────────────────

/// Encode a [`Field`] into its tagged JSON form. `Ignore` becomes `null`.
pub fn encode_field(field: &Field) -> Value {
    match field {
        Field::Ignore => Value::Null,
        Field::Integer(v) => json!({ "type": "integer", "value": encode_integer(*v) }),
        Field::Float(v) => json!({ "type": "float", "value": v }),
        Field::String(v) => json!({ "type": "string", "value": v }),
        Field::Enum(label) => json!({ "type": "enum", "label": label }),
        Field::Array(elements) => {
            let elements: Vec<Value> = elements.iter().map(encode_field).collect();
            json!({ "type": "array", "elements": elements })
        }
        Field::Struct(members) => {
            let fields: Vec<Value> = members
                .iter()
                .map(|(name, value)| json!({ "name": name, "value": encode_field(value) }))
                .collect();
            json!({ "type": "struct", "fields": fields })
        }
    }
}

/// JSON number when the value fits 64 bits, hex text otherwise.
fn encode_integer(v: i128) -> Value {
    if let Ok(n) = i64::try_from(v) {
        return Value::from(n);
    }
    if let Ok(n) = u64::try_from(v) {
        return Value::from(n);
    }
    let magnitude = format!("{:x}", v.unsigned_abs());
    Value::String(if v < 0 {
        format!("-{magnitude}")
    } else {
        magnitude
    })
}

/// Encode a [`Record`] into its entry object; absent parts are omitted.
pub fn encode_record(record: &Record) -> Value {
    let mut obj = Map::new();
    let mut put = |key: &str, field: Option<&Field>| {
        if let Some(field) = field {
            obj.insert(key.to_string(), encode_field(field));
        }
    };

    match record {
        Record::PacketInfo(info) => {
            for (key, field) in info.parts() {
                put(key, field);
            }
        }
        Record::Event(event) => {
            for (key, field) in event.parts() {
                put(key, field);
            }
        }
    }

    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::equal;

    #[test]
    fn null_is_ignore() {
        assert!(decode_field(&json!(null)).unwrap().is_ignore());
    }

    #[test]
    fn bare_scalars() {
        assert!(matches!(decode_field(&json!(5)).unwrap(), Field::Integer(5)));
        assert!(matches!(decode_field(&json!(-5)).unwrap(), Field::Integer(-5)));
        assert!(matches!(decode_field(&json!(2.5)).unwrap(), Field::Float(v) if v == 2.5));
        assert!(matches!(decode_field(&json!("s")).unwrap(), Field::String(ref s) if s == "s"));
    }

    #[test]
    fn hex_integer() {
        let f = decode_field(&json!({"type": "integer", "value": "ff"})).unwrap();
        assert!(matches!(f, Field::Integer(255)));
        assert_eq!(parse_hex_integer("0x10").unwrap(), 16);
        assert_eq!(parse_hex_integer("-1A").unwrap(), -26);
        assert_eq!(
            parse_hex_integer("ffffffffffffffff").unwrap(),
            i128::from(u64::MAX)
        );
        assert_eq!(
            parse_hex_integer("-8000000000000000").unwrap(),
            i128::from(i64::MIN)
        );
        assert_eq!(
            parse_hex_integer("-80000000000000000000000000000000").unwrap(),
            i128::MIN
        );
    }

    #[test]
    fn hex_integer_rejects_garbage() {
        for bad in ["", "0x", "xyz", "-+1", "1 2", "100000000000000000000000000000000", "80000000000000000000000000000000", "-80000000000000000000000000000001"] {
            assert_eq!(
                parse_hex_integer(bad),
                Err(DecodeError::InvalidHexInteger(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn large_unsigned_number_stays_unsigned() {
        let f = decode_field(&json!({"type": "int", "value": u64::MAX})).unwrap();
        assert!(matches!(f, Field::Integer(v) if v == i128::from(u64::MAX)));
        let bare = decode_field(&json!(u64::MAX)).unwrap();
        assert!(matches!(bare, Field::Integer(v) if v == i128::from(u64::MAX)));
    }

    #[test]
    fn integer_outside_64_bits_encodes_as_hex() {
        let big = Field::Integer(i128::from(u64::MAX) + 1);
        assert_eq!(
            encode_field(&big),
            json!({"type": "integer", "value": "10000000000000000"})
        );
        let small = Field::Integer(i128::MIN);
        assert_eq!(
            encode_field(&small),
            json!({"type": "integer", "value": "-80000000000000000000000000000000"})
        );
        assert!(equal(&decode_field(&encode_field(&small)).unwrap(), &small));
    }

    #[test]
    fn float_survives_text_round_trip() {
        let f = Field::Float(481390251256.61163);
        let text = serde_json::to_string(&encode_field(&f)).unwrap();
        let back = decode_field(&serde_json::from_str(&text).unwrap()).unwrap();
        assert!(matches!(back, Field::Float(v) if v == 481390251256.61163));
    }

    #[test]
    fn non_integral_integer_value_is_rejected() {
        assert_eq!(
            decode_field(&json!({"type": "integer", "value": 1.5})).unwrap_err(),
            DecodeError::InvalidValue {
                kind: "integer",
                key: "value"
            }
        );
    }

    #[test]
    fn struct_from_object_form() {
        let f = decode_field(&json!({"type": "struct", "fields": {"a": 1, "b": null}})).unwrap();
        match f {
            Field::Struct(members) => {
                assert_eq!(members.len(), 2);
                assert!(members["b"].is_ignore());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn struct_duplicate_name_is_rejected() {
        let err = decode_field(&json!({
            "type": "struct",
            "fields": [{"name": "a", "value": 1}, {"name": "a", "value": 2}]
        }))
        .unwrap_err();
        assert_eq!(err, DecodeError::DuplicateStructField("a".into()));
    }

    #[test]
    fn struct_object_form_keeps_last_duplicate_key() {
        let value: Value =
            serde_json::from_str(r#"{"type": "struct", "fields": {"a": 1, "a": 2}}"#).unwrap();
        let Field::Struct(members) = decode_field(&value).unwrap() else {
            panic!("expected a struct");
        };
        assert_eq!(members.len(), 1);
        assert!(matches!(members["a"], Field::Integer(2)));
    }

    #[test]
    fn classify_packet_info_and_event() {
        let Record::PacketInfo(info) = classify(&json!({"packet-context": 3})).unwrap() else {
            panic!("expected packet info");
        };
        assert!(info.header.is_none());
        assert!(matches!(info.context, Some(Field::Integer(3))));

        let Record::Event(event) = classify(&json!({"payload": null})).unwrap() else {
            panic!("expected an event");
        };
        assert!(event.header.is_none());
        assert!(matches!(event.payload, Some(Field::Ignore)));
    }

    #[test]
    fn decode_records_reports_entry_index() {
        let err = decode_records(&json!([{"header": 1}, {"header": true}])).unwrap_err();
        assert_eq!(
            err,
            DecodeError::AtEntry {
                index: 1,
                source: Box::new(DecodeError::UnsupportedValue("boolean")),
            }
        );
        assert_eq!(decode_records(&json!({})).unwrap_err(), DecodeError::NotAnArray);
    }

    #[test]
    fn encode_then_decode_matches() {
        let original = decode_field(&json!({
            "type": "struct",
            "fields": [
                {"name": "id", "value": {"type": "integer", "value": "7f"}},
                {"name": "tags", "value": ["a", 2, 3.5, null]},
                {"name": "state", "value": {"type": "enum", "label": "ON", "value": 1}}
            ]
        }))
        .unwrap();
        let back = decode_field(&encode_field(&original)).unwrap();
        assert!(equal(&original, &back));
    }

    #[test]
    fn encode_record_omits_absent_parts() {
        let record = classify(&json!({"header": 1, "payload": "x"})).unwrap();
        assert_eq!(
            encode_record(&record),
            json!({
                "header": {"type": "integer", "value": 1},
                "payload": {"type": "string", "value": "x"}
            })
        );
    }
}
