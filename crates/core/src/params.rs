//! Lenient typed lookups into a flat JSON parameter object.
//!
//! Every helper takes the object, a key and a default. A missing key or a
//! value of the wrong shape yields the default, so a partial override such
//! as `{"blobs": 300}` leaves every other setting untouched. Range and
//! finiteness checks happen afterwards in `SimulationConfig::validate`.

use crate::vector::Vector2;
use serde_json::Value;

/// Any JSON number, integers included.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// A non-negative JSON integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

/// A non-negative JSON integer that fits in `u32`.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// A point written as `[x, y]` or `{"x": .., "y": ..}`.
pub fn as_vec2(value: &Value) -> Option<Vector2> {
    match value {
        Value::Array(items) if items.len() == 2 => {
            Some(Vector2::new(items[0].as_f64()?, items[1].as_f64()?))
        }
        Value::Object(map) => Some(Vector2::new(
            map.get("x")?.as_f64()?,
            map.get("y")?.as_f64()?,
        )),
        _ => None,
    }
}

pub fn param_vec2(params: &Value, name: &str, default: Vector2) -> Vector2 {
    params.get(name).and_then(as_vec2).unwrap_or(default)
}

/// The elements of a JSON array, or `None` when the key is absent or not
/// an array.
pub fn param_array<'a>(params: &'a Value, name: &str) -> Option<&'a [Value]> {
    params
        .get(name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}
