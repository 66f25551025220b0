//! # stackscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the stackscope library. Import this module to get quick access to the
//! essential types for trace reasoning.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all stackscope operations
pub use crate::Error;

/// The result type used throughout stackscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Entry point for loading and normalizing trace documents
pub use crate::Trace;

/// Cached reasoning over one loaded trace
pub use crate::analysis::{reason, ReasoningResult, Session};

/// Tunable knobs of the inference heuristics
pub use crate::analysis::AnalysisConfig;

// ================================================================================================
// Trace Model
// ================================================================================================

/// Normalized per-step and per-document data
pub use crate::trace::{
    Annotation, DisasmLine, RawValue, RegisterValue, Snapshot, StackSlot, TraceMeta,
};

// ================================================================================================
// Disassembly
// ================================================================================================

/// Tokenized instructions and the indexed listing
pub use crate::disasm::{DisasmIndex, IndexedLine, Instruction, Operand, StackEffect};

// ================================================================================================
// Reasoning Components
// ================================================================================================

/// Register map construction and well-known pointer lookup
pub use crate::analysis::{
    build_register_map, frame_pointer, stack_pointer, word_size_hint, RegisterMap,
};

/// Stack slot address resolution and role classification
pub use crate::analysis::{classify_role, resolve_slot_address, Role};

/// Buffer, target and marker resolution with provenance
pub use crate::analysis::{
    detect_marker, locate_buffer, resolve_target, BufferInfo, BufferProvenance, BufferRegion,
    Marker, ProvenanceLine, TargetInfo,
};

/// Signed distances and the final verdict
pub use crate::analysis::{signed_distance, Verdict};
