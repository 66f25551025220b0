use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors only arise while ingesting a trace document. The reasoning engine itself is total:
/// every missing or unparseable value inside an otherwise well-shaped trace degrades to a
/// "not detected" result instead of failing (see [`crate::analysis`]).
///
/// # Error Categories
///
/// ## Ingestion Errors
/// - [`Error::Malformed`] - Top-level trace document does not have one of the accepted shapes
/// - [`Error::Empty`] - Empty input provided where a trace document was expected
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors while reading a trace file
/// - [`Error::JsonError`] - JSON syntax errors from the serde_json parsing layer
///
/// # Examples
///
/// ```rust,no_run
/// use stackscope::{Error, Trace};
/// use std::path::Path;
///
/// match Trace::from_file(Path::new("output.json")) {
///     Ok(trace) => println!("Loaded {} snapshots", trace.snapshots.len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed trace: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The trace document is damaged and could not be parsed.
    ///
    /// This error indicates that the top level of the document is not one of the
    /// two accepted shapes (a bare snapshot array, or an object with a `snapshots`
    /// array). Malformed values *inside* a well-shaped document never produce this
    /// error; they are dropped during normalization instead.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    ///
    /// This error occurs when an empty file or buffer is provided where an
    /// actual trace document was expected.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or memory-mapping
    /// a trace file from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the serde_json crate during document parsing.
    ///
    /// This error wraps JSON syntax failures. Shape mismatches below the top
    /// level are tolerated and never surface through this variant.
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
}

/// `Result<T, Error>`
///
/// The custom `Result` type used throughout this crate, with [`Error`] as the
/// default error variant.
pub type Result<T> = std::result::Result<T, Error>;
