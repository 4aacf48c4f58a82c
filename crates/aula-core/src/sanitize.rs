//! Canvas metadata sanitization.
//!
//! The backing document store forbids `null` field values and nested
//! array shapes. Before a content block is persisted its metadata mapping is
//! flattened: primitives pass through, nulls are dropped, and any composite
//! value is serialized to a canonical JSON string under the same key.
//!
//! The transform is total: no input shape produces an error.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::{ContentBlock, MetaValue};

/// Serialize a JSON value with object keys sorted at every nesting level,
/// so the same logical document always produces the same string.
fn canonical_json(value: &Value) -> String {
    fn sort(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<&String, Value> =
                    map.iter().map(|(k, v)| (k, sort(v))).collect();
                serde_json::to_value(sorted).unwrap_or_else(|_| value.clone())
            }
            Value::Array(items) => Value::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    serde_json::to_string(&sort(value)).unwrap_or_else(|_| "null".to_string())
}

/// Sanitize a single metadata value.
///
/// Returns `None` when the key must be dropped (nulls are never written).
fn sanitize_value(value: &MetaValue) -> Option<MetaValue> {
    match value {
        MetaValue::Null => None,
        MetaValue::Bool(b) => Some(MetaValue::Bool(*b)),
        MetaValue::Int(n) => Some(MetaValue::Int(*n)),
        // Numbers normalize to integer when they carry no fractional part.
        MetaValue::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Some(MetaValue::Int(*f as i64))
            } else {
                Some(MetaValue::Float(*f))
            }
        }
        MetaValue::Str(s) => Some(MetaValue::Str(s.clone())),
        MetaValue::Composite(json) => {
            if json.is_null() {
                None
            } else {
                Some(MetaValue::Str(canonical_json(json)))
            }
        }
    }
}

/// Flatten a metadata mapping into its store-safe representation.
pub fn sanitize_meta(meta: &BTreeMap<String, MetaValue>) -> BTreeMap<String, MetaValue> {
    meta.iter()
        .filter_map(|(key, value)| sanitize_value(value).map(|v| (key.clone(), v)))
        .collect()
}

/// Sanitize one block's metadata in place. Blocks with empty metadata are
/// left untouched.
pub fn sanitize_block(block: &mut ContentBlock) {
    if !block.meta.is_empty() {
        block.meta = sanitize_meta(&block.meta);
    }
}
