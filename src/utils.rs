//! Small pure helpers for presenting resolved values.
//!
//! Everything here is formatting and byte-level bookkeeping for front ends
//! rendering a stack view; none of it affects the reasoning itself.

/// Formats a signed offset as explicit-sign hexadecimal, e.g. `+0x18` or `-0x20`.
///
/// Zero formats as `+0x0` so frame-relative labels stay uniform.
#[must_use]
pub fn signed_hex(offset: i64) -> String {
    if offset < 0 {
        format!("-{:#x}", offset.unsigned_abs())
    } else {
        format!("+{:#x}", offset)
    }
}

/// Builds a frame-relative label such as `rbp-0x20` from a base register name
/// and a signed offset.
#[must_use]
pub fn frame_label(base: &str, offset: i64) -> String {
    format!("{base}{}", signed_hex(offset))
}

/// Explodes a slot value into its little-endian bytes at the given word size.
///
/// The word size is clamped to the 1..=8 byte range; values wider than the
/// word are truncated, as they are in the analyzed program's memory.
#[must_use]
pub fn slot_bytes(value: u64, word_size: u32) -> Vec<u8> {
    let width = word_size.clamp(1, 8) as usize;
    value.to_le_bytes()[..width].to_vec()
}
