// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'trace/mod.rs' uses mmap to map a trace file into memory

//! # stackscope
//!
//! A deterministic reasoning engine for execution traces of stack-smashing
//! exercises. Built in pure Rust, `stackscope` ingests per-step JSON snapshots
//! of a small program's stack and registers, resolves every slot to an
//! absolute address, classifies slot roles, and infers where a user-controlled
//! write landed relative to the value a security check compares against.
//!
//! ## Features
//!
//! - **Tolerant ingestion** - Accepts both documented trace shapes, normalizes
//!   field aliases, and drops malformed entries instead of failing
//! - **Deterministic reasoning** - Every derived value is a pure function of
//!   the loaded trace; rebuilding from the same input yields identical output
//! - **Explainable inference** - Buffer and target resolution carry the exact
//!   listing lines they were derived from
//! - **Graceful degradation** - Missing inputs disable only the computations
//!   that need them and surface as "not detected", never as errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stackscope::{analysis::Session, Trace};
//!
//! let trace = Trace::from_file("output.json".as_ref())?;
//! let mut session = Session::new();
//!
//! let result = session.build(&trace);
//! println!("verdict: {}", result.verdict);
//! # Ok::<(), stackscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `stackscope` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`trace`] - Trace document ingestion and the normalized data model
//! - [`disasm`] - Instruction tokenization and the indexed disassembly listing
//! - [`analysis`] - The reasoning engine, from register maps to the verdict
//! - [`Error`] and [`Result`] - Error handling for the ingestion boundary
//!
//! Data flows one way: [`trace`] loads and normalizes, [`disasm`] tokenizes
//! the listing once, and [`analysis`] derives addresses, roles, the buffer
//! region, the comparison target, the injected marker, and the byte-distance
//! verdict between them. Only ingestion is fallible; the engine itself treats
//! every gap as a reportable absence.
//!
//! ## Error Handling
//!
//! All loading operations return [`Result<T, Error>`](Result):
//!
//! ```rust
//! use stackscope::{Error, Trace};
//!
//! match Trace::from_json("not json") {
//!     Ok(trace) => println!("Loaded {} snapshots", trace.snapshots.len()),
//!     Err(Error::JsonError(e)) => println!("Invalid JSON: {}", e),
//!     Err(Error::Malformed { message, .. }) => println!("Malformed trace: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use stackscope::prelude::*;
///
/// let trace = Trace::from_file("output.json".as_ref())?;
/// let result = Session::new().build(&trace).clone();
/// # Ok::<(), stackscope::Error>(())
/// ```
pub mod prelude;

/// Trace document ingestion and the normalized data model.
///
/// Accepts the two documented JSON shapes (a bare snapshot array, or an object
/// with `snapshots` and optional `meta`), normalizes the field aliases real
/// trace emitters use, and degrades malformed entries to absent values. The
/// main entry points are [`Trace::from_file`], [`Trace::from_slice`] and
/// [`Trace::from_json`].
pub mod trace;

/// Instruction tokenization and the indexed disassembly listing.
///
/// [`disasm::Instruction`] splits a line of x86-flavoured assembly text into a
/// mnemonic and structured operands; [`disasm::DisasmIndex`] tokenizes a whole
/// listing once and supports address lookup plus the bounded backward scan the
/// inference heuristics are built on.
pub mod disasm;

/// The reasoning engine.
///
/// Pure functions from normalized trace data to resolved addresses, slot
/// roles, the write-buffer region, the comparison target, the injected
/// marker, and the final byte-distance verdict. [`analysis::Session`] caches
/// one [`analysis::ReasoningResult`] per loaded trace.
pub mod analysis;

/// Small pure helpers for presenting resolved values.
pub mod utils;

pub use error::{Error, Result};

/// Main entry point for loading a trace document.
///
/// See [`trace::Trace`] for the normalized model and the loading constructors.
///
/// # Example
///
/// ```rust
/// use stackscope::Trace;
///
/// let trace = Trace::from_json(r#"[{"step": 1, "instr": "nop"}]"#)?;
/// assert_eq!(trace.snapshots.len(), 1);
/// # Ok::<(), stackscope::Error>(())
/// ```
pub use trace::Trace;
