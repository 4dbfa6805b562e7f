//! Result-returning accessors over a [`RawRecord`].
//!
//! Every accessor names the field it failed on, so a caller can turn the
//! message into a `MalformedRecord` for a whole record or use it to log a
//! skipped list element.

use crate::types::RawRecord;
use serde_json::{Map, Value};

pub type FieldResult<T> = std::result::Result<T, String>;

pub fn object<'a>(value: &'a RawRecord, context: &str) -> FieldResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| format!("{} is not an object", context))
}

fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> FieldResult<&'a Value> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(format!("missing field '{}'", key)),
        Some(value) => Ok(value),
    }
}

pub fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> FieldResult<&'a str> {
    present(obj, key)?
        .as_str()
        .ok_or_else(|| format!("field '{}' is not a string", key))
}

pub fn bool_field(obj: &Map<String, Value>, key: &str) -> FieldResult<bool> {
    present(obj, key)?
        .as_bool()
        .ok_or_else(|| format!("field '{}' is not a boolean", key))
}

pub fn i64_field(obj: &Map<String, Value>, key: &str) -> FieldResult<i64> {
    present(obj, key)?
        .as_i64()
        .ok_or_else(|| format!("field '{}' is not an integer", key))
}

/// Non-negative integer that fits the requested width.
pub fn unsigned_field<T: TryFrom<u64>>(obj: &Map<String, Value>, key: &str) -> FieldResult<T> {
    let raw = present(obj, key)?
        .as_u64()
        .ok_or_else(|| format!("field '{}' is not a non-negative integer", key))?;
    T::try_from(raw).map_err(|_| format!("field '{}' is out of range ({})", key, raw))
}

pub fn i32_field(obj: &Map<String, Value>, key: &str) -> FieldResult<i32> {
    let raw = i64_field(obj, key)?;
    i32::try_from(raw).map_err(|_| format!("field '{}' is out of range ({})", key, raw))
}

pub fn object_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> FieldResult<&'a Map<String, Value>> {
    present(obj, key)?
        .as_object()
        .ok_or_else(|| format!("field '{}' is not an object", key))
}

/// Absent or null lists read as empty; any other non-array value is an error.
pub fn list_field<'a>(obj: &'a Map<String, Value>, key: &str) -> FieldResult<&'a [Value]> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(format!("field '{}' is not a list", key)),
    }
}

/// Optional string: absent, null or non-string values all read as `None`.
pub fn opt_str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// The `{ "name": ..., "url": ... }` pair the upstream API uses for links.
pub fn named_resource(obj: &Map<String, Value>, key: &str) -> FieldResult<(String, String)> {
    let resource = object_field(obj, key)?;
    let name = str_field(resource, "name").map_err(|e| format!("{}: {}", key, e))?;
    let url = str_field(resource, "url").map_err(|e| format!("{}: {}", key, e))?;
    Ok((name.to_string(), url.to_string()))
}
