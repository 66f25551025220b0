//! Trace document ingestion and normalization.
//!
//! The wire format has grown duck-typed aliases over time: register lists appear
//! as `registers` or `regs`, slot positions as `pos` or `posi`, role hints as any
//! of `role`/`kind`/`zone`/`type`, and names as `name` or `label`. This module
//! resolves every alias once, with a fixed precedence order, into the explicit
//! structures of [`crate::trace::model`] so that no downstream code re-derives
//! fallbacks ad hoc.
//!
//! # Accepted Shapes
//!
//! Two top-level document shapes are accepted, matching what the simulator and
//! older trace files produce:
//!
//! - A bare JSON array of snapshots
//! - An object `{ "snapshots": [...], "meta": {...}, ... }` (unknown siblings
//!   such as `risks` are tolerated and dropped)
//!
//! Anything else is rejected with [`crate::Error::Malformed`]. Below the top
//! level nothing is fatal: a snapshot that is not an object is skipped, and a
//! field of the wrong type is normalized to absent.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    trace::model::{
        Annotation, DisasmLine, RawValue, RegisterValue, Snapshot, StackSlot, Trace, TraceMeta,
    },
    Result,
};

/// Parses a raw trace document into a normalized [`Trace`].
///
/// # Errors
///
/// Returns [`crate::Error::JsonError`] on JSON syntax errors,
/// [`crate::Error::Empty`] on empty input, and [`crate::Error::Malformed`]
/// when the top level is neither a snapshot array nor an object with a
/// `snapshots` array.
pub fn parse_document(data: &[u8]) -> Result<Trace> {
    if data.is_empty() {
        return Err(crate::Error::Empty);
    }

    let document: Value = serde_json::from_slice(data)?;
    let (snapshots, meta) = match document {
        Value::Array(items) => (items, None),
        Value::Object(mut fields) => match fields.remove("snapshots") {
            Some(Value::Array(items)) => (items, fields.remove("meta")),
            _ => {
                return Err(malformed_error!(
                    "trace document object carries no 'snapshots' array"
                ))
            }
        },
        other => {
            return Err(malformed_error!(
                "trace document must be a snapshot array or an object, got {}",
                type_name(&other)
            ))
        }
    };

    Ok(Trace {
        snapshots: snapshots.iter().filter_map(normalize_snapshot).collect(),
        meta: meta.as_ref().map(normalize_meta).unwrap_or_default(),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn normalize_snapshot(value: &Value) -> Option<Snapshot> {
    let fields = value.as_object()?;

    // `registers` wins over `regs` when both are present, even when empty.
    let registers = match fields.get("registers").and_then(Value::as_array) {
        Some(items) => items.as_slice(),
        None => fields
            .get("regs")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
    };

    Some(Snapshot {
        step: fields.get("step").and_then(val_i64),
        instr: fields.get("instr").and_then(val_string),
        line: fields.get("line").and_then(val_u32),
        ip: fields.get("rip").and_then(val_address_text),
        stack: fields
            .get("stack")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(normalize_slot).collect())
            .unwrap_or_default(),
        registers: registers.iter().filter_map(normalize_register).collect(),
        annotations: fields
            .get("annotations")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(normalize_annotation).collect())
            .unwrap_or_default(),
    })
}

fn normalize_slot(value: &Value) -> Option<StackSlot> {
    let fields = value.as_object()?;
    Some(StackSlot {
        id: fields.get("id").and_then(val_i64),
        name: first_non_empty(fields, &["name", "label"]),
        pos: fields
            .get("pos")
            .and_then(val_i64)
            .or_else(|| fields.get("posi").and_then(val_i64)),
        addr: fields.get("addr").and_then(val_raw),
        size: fields.get("size").and_then(val_u64),
        value: fields.get("value").and_then(val_raw),
        role_hint: first_non_empty(fields, &["role", "kind", "zone", "type"]),
        note: first_non_empty(fields, &["note", "hint", "help"]),
    })
}

fn normalize_register(value: &Value) -> Option<RegisterValue> {
    let fields = value.as_object()?;
    let name = fields.get("name").and_then(val_string)?;
    if name.is_empty() {
        return None;
    }
    Some(RegisterValue {
        name,
        value: fields.get("value").and_then(val_raw),
        pos: fields.get("pos").and_then(val_i64),
    })
}

fn normalize_annotation(value: &Value) -> Option<Annotation> {
    let fields = value.as_object()?;
    Some(Annotation {
        label: first_non_empty(fields, &["label", "title"]),
        detail: first_non_empty(fields, &["detail", "text"]),
    })
}

fn normalize_meta(value: &Value) -> TraceMeta {
    let Some(fields) = value.as_object() else {
        return TraceMeta::default();
    };
    TraceMeta {
        word_size: fields.get("word_size").and_then(val_u64),
        buffer_offset: fields.get("buffer_offset").and_then(val_i64),
        // The buffer end is only meaningful for a positive size.
        buffer_size: fields
            .get("buffer_size")
            .and_then(val_u64)
            .filter(|size| *size > 0),
        disasm: fields
            .get("disasm")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(normalize_disasm_line).collect())
            .unwrap_or_default(),
        disasm_path: fields.get("disasm_path").and_then(val_string),
    }
}

fn normalize_disasm_line(value: &Value) -> Option<DisasmLine> {
    let fields = value.as_object()?;
    Some(DisasmLine {
        addr: fields.get("addr").and_then(val_address_text),
        line: fields.get("line").and_then(val_u32),
        text: fields.get("text").and_then(val_string).unwrap_or_default(),
    })
}

/// First non-empty string among the named fields, in precedence order.
fn first_non_empty(fields: &serde_json::Map<String, Value>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| fields.get(*name).and_then(val_string))
        .find(|text| !text.is_empty())
}

fn val_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn val_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        _ => None,
    }
}

fn val_u64(value: &Value) -> Option<u64> {
    val_i64(value).and_then(|v| u64::try_from(v).ok())
}

fn val_u32(value: &Value) -> Option<u32> {
    val_i64(value).and_then(|v| u32::try_from(v).ok())
}

/// Scalars deserialize through the untagged [`RawValue`] shape; anything
/// non-scalar (bool, null, array, object) fails the match and degrades to absent.
fn val_raw(value: &Value) -> Option<RawValue> {
    RawValue::deserialize(value).ok()
}

/// Addresses travel as hex strings or numbers; both normalize to lowercase hex text.
fn val_address_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_ascii_lowercase()),
        Value::Number(_) => val_u64(value).map(|addr| format!("{addr:#x}")),
        _ => None,
    }
}
