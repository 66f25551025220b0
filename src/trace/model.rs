//! Immutable data model for loaded execution traces.
//!
//! This module defines the plain data types a trace document normalizes into. All
//! duck-typed field fallbacks of the wire format (`registers`/`regs`, `pos`/`posi`,
//! `role`/`kind`/`zone`/`type`, `label`/`name`) are resolved during ingestion by
//! [`crate::trace::loader`], so every consumer works against one explicit structure
//! with a fixed precedence order.
//!
//! # Key Components
//!
//! - [`Trace`] - A full loaded trace: ordered snapshots plus optional metadata
//! - [`Snapshot`] - One execution step (instruction, stack slots, registers)
//! - [`StackSlot`] - One stack word with its position or absolute address
//! - [`RegisterValue`] - A named register entry with its raw value
//! - [`RawValue`] - A scalar as it appears on the wire, parsed lazily
//! - [`DisasmLine`] - One line of the companion disassembly listing
//! - [`TraceMeta`] - Top-level metadata (word size, buffer hints, listing)
//!
//! Everything here is read-only data with no behavior beyond lazy value parsing;
//! the reasoning logic lives in [`crate::analysis`].

use serde::Deserialize;

/// A raw scalar value as it appears in the trace document.
///
/// The simulator emits numbers, but hand-edited traces carry hex strings such as
/// `"0x7ffd1000"` or decimal strings. Parsing is deferred to [`RawValue::as_bits`]
/// so that an unparseable value degrades to `None` at the point of use instead of
/// failing ingestion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// An integral JSON number, used verbatim.
    Int(i64),
    /// A non-integral JSON number; accepted only when finite, then truncated.
    Float(f64),
    /// A string value: hex with a `0x`/`0X` prefix, otherwise decimal.
    Text(String),
}

impl RawValue {
    /// Parses this value into its 64-bit two's-complement bit pattern.
    ///
    /// Resolution follows the wire format rules: numbers are used directly
    /// (non-finite floats are rejected), strings with a hex prefix are parsed
    /// base-16 and all other strings base-10. Returns `None` when the value
    /// does not parse to a finite integer.
    #[must_use]
    pub fn as_bits(&self) -> Option<u64> {
        match self {
            RawValue::Int(v) => Some(*v as u64),
            RawValue::Float(v) => {
                if v.is_finite() {
                    Some(*v as i64 as u64)
                } else {
                    None
                }
            }
            RawValue::Text(s) => parse_int_text(s),
        }
    }

    /// Parses this value as a signed integer.
    ///
    /// Same rules as [`RawValue::as_bits`], reinterpreting the bit pattern as `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_bits().map(|bits| bits as i64)
    }
}

/// Parses integer text: `0x`-prefixed (optionally negated) as base-16, otherwise base-10.
pub(crate) fn parse_int_text(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()?
    } else if negative {
        digits.parse::<u64>().ok()?
    } else {
        // Unsigned decimal first so full-range addresses survive, then the signed range.
        match digits.parse::<u64>() {
            Ok(v) => v,
            Err(_) => return trimmed.parse::<i64>().ok().map(|v| v as u64),
        }
    };
    if negative {
        Some((magnitude as i64).wrapping_neg() as u64)
    } else {
        Some(magnitude)
    }
}

/// One named register entry from a snapshot.
///
/// Names are matched case-insensitively downstream; the value keeps its wire
/// representation until [`crate::analysis::build_register_map`] parses it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterValue {
    /// Register name as it appears in the trace (e.g. `rsp`, `RBP`, `eax`).
    pub name: String,
    /// Raw register value.
    pub value: Option<RawValue>,
    /// Display ordering hint emitted by the simulator.
    pub pos: Option<i64>,
}

/// One stack word of a snapshot.
///
/// A slot is placed either by an explicit absolute address or by a signed
/// position relative to the stack pointer; the explicit address always wins
/// (see [`crate::analysis::resolve_slot_address`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackSlot {
    /// Numeric slot identifier from the simulator, if present.
    pub id: Option<i64>,
    /// Human-readable name. Normalized from `name` with `label` as fallback.
    pub name: Option<String>,
    /// Signed position relative to the stack pointer, in bytes.
    /// Normalized from `pos` with `posi` as fallback.
    pub pos: Option<i64>,
    /// Explicit absolute address; takes precedence over `pos` when present.
    pub addr: Option<RawValue>,
    /// Size of the slot in bytes.
    pub size: Option<u64>,
    /// Raw slot value.
    pub value: Option<RawValue>,
    /// Explicit role hint. Normalized from `role`/`kind`/`zone`/`type`,
    /// first non-empty wins.
    pub role_hint: Option<String>,
    /// Free-form note attached by the trace author.
    /// Normalized from `note`/`hint`/`help`, first non-empty wins.
    pub note: Option<String>,
}

/// A free-form annotation attached to a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Short annotation title. Normalized from `label` with `title` as fallback.
    pub label: Option<String>,
    /// Longer annotation body. Normalized from `detail` with `text` as fallback.
    pub detail: Option<String>,
}

/// One execution step of the trace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// 1-based step index.
    pub step: Option<i64>,
    /// Instruction text executed at this step.
    pub instr: Option<String>,
    /// 1-based source line of the instruction in the input listing.
    pub line: Option<u32>,
    /// Instruction-pointer value, normalized to a lowercase hex string.
    pub ip: Option<String>,
    /// Ordered stack slots, bottom of the dumped region first.
    pub stack: Vec<StackSlot>,
    /// Register entries. Normalized from `registers` with `regs` as fallback.
    pub registers: Vec<RegisterValue>,
    /// Free-form annotations attached by the trace author.
    pub annotations: Vec<Annotation>,
}

impl Snapshot {
    /// Returns `true` if this snapshot carries any register data.
    #[must_use]
    pub fn has_registers(&self) -> bool {
        !self.registers.is_empty()
    }
}

/// One line of the companion disassembly listing.
///
/// Listing lines are ordered by program order, which is not necessarily the
/// execution order; loops and branches revisit addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct DisasmLine {
    /// Instruction address, normalized to a lowercase hex string.
    pub addr: Option<String>,
    /// 1-based line number in the listing file.
    pub line: Option<u32>,
    /// Raw instruction text.
    pub text: String,
}

/// Optional top-level trace metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceMeta {
    /// Machine word size in bytes (4 or 8).
    pub word_size: Option<u64>,
    /// Frame-pointer-relative offset of the write buffer, in bytes (negative
    /// for buffers below the frame pointer).
    pub buffer_offset: Option<i64>,
    /// Size of the write buffer in bytes.
    pub buffer_size: Option<u64>,
    /// Disassembly listing of the analyzed program.
    pub disasm: Vec<DisasmLine>,
    /// Path of the listing file the `disasm` line numbers refer to.
    pub disasm_path: Option<String>,
}

/// A fully loaded trace: ordered snapshots plus optional metadata.
///
/// Immutable once loaded. Constructed through [`Trace::from_file`],
/// [`Trace::from_slice`] or [`Trace::from_json`] in [`crate::trace`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trace {
    /// Ordered execution snapshots.
    pub snapshots: Vec<Snapshot>,
    /// Top-level metadata; defaults to all-absent when the document carries none.
    pub meta: TraceMeta,
}

impl Trace {
    /// Returns the baseline snapshot: the first snapshot carrying any register
    /// data, falling back to the first snapshot.
    ///
    /// The reasoning engine derives its frame and stack pointers from this
    /// snapshot, since frame geometry is invariant across one analyzed run.
    #[must_use]
    pub fn baseline(&self) -> Option<&Snapshot> {
        self.snapshots
            .iter()
            .find(|snap| snap.has_registers())
            .or_else(|| self.snapshots.first())
    }
}
