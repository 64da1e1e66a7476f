//! JSON parsing.
//!
//! Supported input: a JSON array of objects, `[{"a":"x"}, {"a":"y"}]`.
//!
//! Every value is rendered as a string so JSON and CSV produce the same [`Record`] shape:
//!
//! - strings are kept as-is
//! - numbers and booleans become their JSON text (`1.5`, `true`)
//! - `null` becomes `""`
//! - nested arrays/objects become their compact JSON text
//!
//! Key fields are stricter: they must be JSON strings (or `null`/absent). Anything else is an
//! [`IngestError::InvalidFieldType`].

use serde_json::{Map, Value};

use crate::error::{IngestError, IngestResult};
use crate::types::{KeySchema, Record};

/// Parse a JSON array of objects into records, collecting the whole sequence.
pub fn parse_json_str(input: &str, keys: &KeySchema) -> IngestResult<Vec<Record>> {
    json_records(input, keys)?.collect()
}

/// Decode the document, then stream its elements as records.
///
/// Malformed JSON and a non-array top level fail before any record is yielded; a bad element
/// fails when the iterator reaches it.
pub fn json_records<'a>(
    input: &str,
    keys: &'a KeySchema,
) -> IngestResult<impl Iterator<Item = IngestResult<Record>> + 'a> {
    let items = match serde_json::from_str::<Value>(input)? {
        Value::Array(items) => items,
        other => {
            return Err(IngestError::MalformedPayload {
                message: format!("json must be an array of objects, found {}", kind_of(&other)),
            });
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(move |(idx0, v)| {
            let row = idx0 + 1;
            match v {
                Value::Object(obj) => object_to_record(row, obj, keys),
                other => Err(IngestError::MalformedPayload {
                    message: format!("record {row} is not a json object (found {})", kind_of(&other)),
                }),
            }
        }))
}

fn object_to_record(row: usize, obj: Map<String, Value>, keys: &KeySchema) -> IngestResult<Record> {
    let mut record = Record::with_capacity(obj.len());
    for (name, value) in obj {
        if keys.is_key_field(&name) && !matches!(value, Value::String(_) | Value::Null) {
            return Err(IngestError::InvalidFieldType {
                record: row,
                field: name,
                found: kind_of(&value),
            });
        }
        let text = value_to_text(value);
        record.insert(name, text);
    }
    Ok(record)
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested @ (Value::Array(_) | Value::Object(_)) => nested.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
