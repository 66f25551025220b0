//! Best-effort register map construction.
//!
//! Raw register entries carry values as numbers, hex strings or decimal
//! strings. This module folds them into a lowercase name→value map, silently
//! excluding anything that does not parse to a finite integer. The map is
//! best-effort by design: a half-usable register dump should still light up
//! every computation that has the registers it needs.

use std::collections::HashMap;

use crate::trace::{RawValue, RegisterValue, TraceMeta};

/// Lowercase register name to 64-bit value.
pub type RegisterMap = HashMap<String, u64>;

/// Builds a name→value map from raw register entries.
///
/// Entries with an empty name or a value that fails to parse are excluded,
/// never reported. Pure, no side effects.
///
/// # Examples
///
/// ```rust
/// use stackscope::analysis::build_register_map;
/// use stackscope::trace::{RawValue, RegisterValue};
///
/// let entries = vec![
///     RegisterValue { name: "RBP".into(), value: Some(RawValue::Text("0x7ffd1000".into())), pos: None },
///     RegisterValue { name: "rax".into(), value: Some(RawValue::Text("garbage".into())), pos: None },
/// ];
/// let map = build_register_map(&entries);
/// assert_eq!(map.get("rbp"), Some(&0x7ffd1000));
/// assert!(!map.contains_key("rax"));
/// ```
#[must_use]
pub fn build_register_map(entries: &[RegisterValue]) -> RegisterMap {
    let mut map = RegisterMap::new();
    for entry in entries {
        if entry.name.is_empty() {
            continue;
        }
        if let Some(bits) = entry.value.as_ref().and_then(RawValue::as_bits) {
            map.insert(entry.name.to_ascii_lowercase(), bits);
        }
    }
    map
}

/// Resolves the frame pointer from a register map (`rbp`, falling back to `ebp`).
///
/// The frame pointer is the fixed reference axis for every relative offset in
/// the engine; computations that need it degrade to "not detected" when it is
/// absent.
#[must_use]
pub fn frame_pointer(map: &RegisterMap) -> Option<u64> {
    map.get("rbp").or_else(|| map.get("ebp")).copied()
}

/// Resolves the stack pointer from a register map (`rsp`, falling back to `esp`).
#[must_use]
pub fn stack_pointer(map: &RegisterMap) -> Option<u64> {
    map.get("rsp").or_else(|| map.get("esp")).copied()
}

/// Determines the machine word size in bytes.
///
/// An explicit `meta.word_size` wins; otherwise the presence of a 32-bit
/// accumulator in the register map implies 4, and 8 is assumed last.
#[must_use]
pub fn word_size_hint(meta: &TraceMeta, map: &RegisterMap) -> u64 {
    if let Some(size) = meta.word_size {
        return size;
    }
    if map.contains_key("eax") {
        4
    } else {
        8
    }
}
