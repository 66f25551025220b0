//! Trace loading and the immutable trace data model.
//!
//! A trace is the JSON document produced by the external instruction-level
//! simulator: an ordered list of per-step snapshots (instruction text, stack
//! slots, register values) plus optional metadata (machine word size, buffer
//! hints, a disassembly listing). This module owns reading that document and
//! normalizing its duck-typed fields into one explicit structure; everything
//! downstream consumes the read-only [`Trace`].
//!
//! # Architecture
//!
//! - [`model`] - The normalized, immutable data types
//! - [`loader`] - Shape validation and alias normalization
//!
//! Trace files are memory-mapped rather than read into an owned buffer, since
//! the parsed [`Trace`] is the only thing kept alive afterwards.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use stackscope::Trace;
//! use std::path::Path;
//!
//! let trace = Trace::from_file(Path::new("output.json"))?;
//! println!("{} snapshots", trace.snapshots.len());
//! # Ok::<(), stackscope::Error>(())
//! ```

pub mod loader;
pub mod model;

pub use model::{
    Annotation, DisasmLine, RawValue, RegisterValue, Snapshot, StackSlot, Trace, TraceMeta,
};

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::Result;

impl Trace {
    /// Loads and normalizes a trace document from disk.
    ///
    /// The file is memory-mapped for the duration of parsing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// mapped, and the parse errors documented on [`Trace::from_slice`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use stackscope::Trace;
    /// use std::path::Path;
    ///
    /// let trace = Trace::from_file(Path::new("output.json"))?;
    /// # Ok::<(), stackscope::Error>(())
    /// ```
    pub fn from_file(path: &Path) -> Result<Trace> {
        let file = fs::File::open(path)?;
        let mmap = unsafe { Mmap::map(&file) }?;
        Trace::from_slice(&mmap)
    }

    /// Parses a trace document from an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Empty`] for empty input,
    /// [`crate::Error::JsonError`] for JSON syntax errors and
    /// [`crate::Error::Malformed`] when the top-level shape is not a snapshot
    /// array or an object with a `snapshots` array. Malformed values below the
    /// top level are dropped during normalization, never reported.
    pub fn from_slice(data: &[u8]) -> Result<Trace> {
        loader::parse_document(data)
    }

    /// Parses a trace document from JSON text.
    ///
    /// # Errors
    ///
    /// Same as [`Trace::from_slice`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackscope::Trace;
    ///
    /// let trace = Trace::from_json(r#"[{"step":1,"instr":"push rbp"}]"#)?;
    /// assert_eq!(trace.snapshots.len(), 1);
    /// # Ok::<(), stackscope::Error>(())
    /// ```
    pub fn from_json(text: &str) -> Result<Trace> {
        loader::parse_document(text.as_bytes())
    }
}
