//! The trace reasoning engine.
//!
//! This module turns raw per-step snapshots into resolved addresses, classified
//! stack roles, an inferred write-buffer region, an inferred comparison target,
//! a detected test marker, and a byte-distance verdict between them. Every
//! computation is a deterministic pure function over already-loaded data:
//! nothing here performs I/O, nothing is retried, and nothing is fatal. A
//! missing or unparseable input disables exactly the computations that need it
//! and surfaces as a "not detected" field in the final [`ReasoningResult`].
//!
//! # Architecture
//!
//! Data flows one way through focused submodules:
//!
//! - [`registers`] - Raw register entries into a best-effort name→value map
//! - [`address`] - Absolute address of a stack slot
//! - [`roles`] - Semantic role of a slot (buffer/local/padding/control)
//! - [`buffer`] - The write-buffer region, supplied or inferred from the listing
//! - [`target`] - The address and value a security check compares against
//! - [`marker`] - A sentinel test value among the stack words
//! - [`verdict`] - Signed byte distances and the pass/fail narrative
//! - [`session`] - One-shot orchestration with an explicit cache lifecycle
//!
//! # Heuristics, Not Soundness
//!
//! Target and buffer inference rest on a bounded backward scan over the
//! disassembly listing ([`crate::disasm::DisasmIndex::scan_backward`]). The
//! scan follows program order only: it cannot see through branches, aliasing,
//! or memory-to-memory moves, and it misses matches beyond its window. These
//! are documented limitations, reported as absent results rather than errors.
//! The window, the read-call symbol set and the sentinel set are configuration
//! ([`AnalysisConfig`]), not constants.
//!
//! # Usage Examples
//!
//! ```rust
//! use stackscope::{analysis::Session, Trace};
//!
//! let trace = Trace::from_json(r#"{
//!     "snapshots": [{
//!         "step": 1,
//!         "instr": "cmp eax, 0x2a",
//!         "registers": [
//!             {"name": "RBP", "value": "0x7ffd1000"},
//!             {"name": "RSP", "value": "0x7ffd0fe0"}
//!         ]
//!     }],
//!     "meta": {"buffer_offset": -32, "buffer_size": 16}
//! }"#)?;
//!
//! let mut session = Session::new();
//! let result = session.build(&trace);
//! let region = &result.buffer.as_ref().unwrap().region;
//! assert_eq!(region.start, 0x7ffd0fe0);
//! # Ok::<(), stackscope::Error>(())
//! ```

pub mod address;
pub mod buffer;
pub mod marker;
pub mod registers;
pub mod roles;
pub mod session;
pub mod target;
pub mod verdict;

pub use address::resolve_slot_address;
pub use buffer::{locate_buffer, BufferInfo, BufferProvenance, BufferRegion};
pub use marker::{detect_marker, Marker};
pub use registers::{
    build_register_map, frame_pointer, stack_pointer, word_size_hint, RegisterMap,
};
pub use roles::{classify_role, Role};
pub use session::{reason, ReasoningResult, Session};
pub use target::{resolve_target, TargetInfo};
pub use verdict::{signed_distance, Verdict};

/// Tunable knobs of the inference heuristics.
///
/// The defaults mirror what the companion test harness emits; all three knobs
/// are approximations rather than principled definitions, so they stay
/// configurable instead of being baked in as constants.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// How many preceding listing lines the backward scan examines.
    pub scan_window: usize,
    /// Symbol substrings identifying a read-style call for buffer inference.
    pub read_call_symbols: Vec<String>,
    /// 32-bit sentinel fill patterns recognized as test markers.
    pub sentinels: Vec<u32>,
}

impl Default for AnalysisConfig {
    fn default() -> AnalysisConfig {
        AnalysisConfig {
            scan_window: 8,
            read_call_symbols: ["read", "gets", "fgets", "scanf", "recv", "input"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            // Repeating-byte fill patterns the trace authors use as test input.
            sentinels: vec![
                0x4141_4141, // 'AAAA'
                0x4242_4242, // 'BBBB'
                0x4343_4343, // 'CCCC'
                0x4444_4444, // 'DDDD'
                0x6161_6161, // 'aaaa'
                0x9090_9090,
                0xcccc_cccc,
            ],
        }
    }
}

/// The instruction a derived value was inferred from, kept for explainability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceLine {
    /// 1-based source line in the listing, when known.
    pub line: Option<u32>,
    /// The instruction text as it appears in the trace.
    pub text: String,
}
