//! Instruction-text tokenization and listing lookup.
//!
//! This module owns the instruction-text grammar for the whole crate. Each
//! disassembly line is tokenized once, at load time, into a structural
//! [`Instruction`] record; everything that later needs to ask "is this a load
//! from `[rbp-0x10]` into `eax`?" asks it of the record instead of rescanning
//! strings.
//!
//! # Key Components
//!
//! - [`Instruction`] / [`Operand`] - The tokenized instruction grammar
//! - [`DisasmIndex`] - Program-order listing with address lookup and the
//!   bounded backward scan used by the inference heuristics
//! - [`StackEffect`] - Per-instruction stack-effect classification for
//!   presentation layers

pub mod index;
pub mod instruction;

pub use index::{DisasmIndex, IndexedLine};
pub use instruction::{is_frame_pointer_name, is_register_name, Instruction, Operand, StackEffect};
